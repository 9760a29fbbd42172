use thiserror::Error;

/// Error type for matrix, vector and decomposition operations.
///
/// Every variant is reported synchronously by the call that detects it; no
/// operation returns a partial result alongside an error.
#[derive(Error, Debug, PartialEq)]
pub enum LinalgError {
    /// Operand shapes are incompatible for the requested operation.
    ///
    /// # Examples
    /// - Element-wise products of matrices with different shapes
    /// - Matrix product where `lhs.cols != rhs.rows`
    /// - Solving against a right-hand side with the wrong number of rows
    #[error("Dimension mismatch in {op}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the operation that failed
        op: &'static str,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// Index exceeds the bounds of the container.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },

    /// The provided data does not describe a well formed matrix.
    #[error("Invalid shape: expected {expected} elements, got {actual}")]
    InvalidShape {
        /// Expected number of elements
        expected: usize,
        /// Actual number of elements
        actual: usize,
    },

    /// The operation is only defined for square matrices.
    #[error("Matrix must be square, got {0}x{1}")]
    NotSquare(usize, usize),

    /// The LU factor has an exactly zero pivot.
    #[error("Matrix is singular")]
    Singular,

    /// The QR factor has an exactly zero diagonal entry in R.
    #[error("Matrix is rank deficient")]
    RankDeficient,

    /// Scalar division by exactly zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Normalization of a vector whose norm is exactly zero.
    #[error("Cannot normalize a vector with zero norm")]
    ZeroNorm,

    /// The input text is not a valid vector literal.
    #[error("Failed to parse vector: {0}")]
    Parse(String),
}

impl LinalgError {
    /// Creates a DimensionMismatch error from two `rows x cols` shapes.
    pub fn shape_mismatch(op: &'static str, expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            op,
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }

    /// Creates a DimensionMismatch error from two lengths.
    pub fn length_mismatch(op: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            op,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates an IndexOutOfBounds error.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }

    /// Returns true if the error comes from the numerical content of a matrix
    /// rather than from how the operation was called.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::Singular | Self::RankDeficient | Self::DivisionByZero | Self::ZeroNorm
        )
    }
}
