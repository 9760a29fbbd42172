use std::fmt;
use std::hash::{Hash, Hasher};

use rand::Rng;

use crate::error::LinalgError;
use crate::lu::LuDecomposition;
use crate::qr::QrDecomposition;
use crate::vector::{format_value, Vector};

/// A dense, owned, two-dimensional matrix of `f64` values.
///
/// The entries live in a single contiguous row-major buffer with a row stride
/// equal to the number of columns. The buffer is never shared: every
/// constructor copies its input and every operation returns a new matrix.
///
/// Equality is exact per-entry comparison; use [`Matrix::approx_eq`] when the
/// matrices come out of a floating point computation.
///
/// # Example
///
/// ```
/// use kornia_matrix::Matrix;
///
/// let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 2.0]]).unwrap();
/// let b = Matrix::from_rows(&[[4.0], [6.0]]).unwrap();
/// let x = a.solve(&b).unwrap();
/// assert_eq!(x, Matrix::from_rows(&[[2.0], [3.0]]).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Create a matrix from a row-major grid.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if the rows have different lengths.
    pub fn from_rows<R: AsRef<[f64]>>(grid: &[R]) -> Result<Self, LinalgError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows * cols);
        for row in grid {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(LinalgError::InvalidShape {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_parts(rows, cols, data))
    }

    /// Create a matrix from a column-major flat buffer, so that
    /// `m[i][j] == values[i + j * rows]`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if the length of `values` is not a
    /// multiple of `rows`.
    pub fn from_column_packed(values: &[f64], rows: usize) -> Result<Self, LinalgError> {
        if rows == 0 {
            if values.is_empty() {
                return Ok(Self::default());
            }
            return Err(LinalgError::InvalidShape {
                expected: 0,
                actual: values.len(),
            });
        }
        if values.len() % rows != 0 {
            return Err(LinalgError::InvalidShape {
                expected: (values.len() / rows + 1) * rows,
                actual: values.len(),
            });
        }
        let cols = values.len() / rows;
        let mut data = vec![0.0; rows * cols];
        for j in 0..cols {
            for i in 0..rows {
                data[i * cols + j] = values[i + j * rows];
            }
        }
        Ok(Self::from_parts(rows, cols, data))
    }

    /// Create a matrix from a row-major flat buffer.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if `values.len() != rows * cols`.
    pub fn from_row_packed(values: &[f64], rows: usize, cols: usize) -> Result<Self, LinalgError> {
        if values.len() != rows * cols {
            return Err(LinalgError::InvalidShape {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(Self::from_parts(rows, cols, values.to_vec()))
    }

    /// Create a `1 x n` matrix holding the entries of `v`.
    pub fn from_vector(v: &Vector) -> Self {
        Self::from_parts(1, v.len(), v.to_vec())
    }

    /// Create a `1 x 1` matrix.
    pub fn from_scalar(value: f64) -> Self {
        Self::from_parts(1, 1, vec![value])
    }

    /// Create a zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Create a zero-filled `n x n` matrix.
    pub fn square(n: usize) -> Self {
        Self::zeros(n, n)
    }

    /// Create a `rows x cols` matrix with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self::from_parts(rows, cols, vec![value; rows * cols])
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::square(n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Create a matrix with entries drawn uniformly from `[0, 1)` using the
    /// thread-local generator.
    pub fn random(rows: usize, cols: usize) -> Self {
        Self::random_with_rng(rows, cols, &mut rand::rng())
    }

    /// Create a matrix with entries drawn uniformly from `[0, 1)` using `rng`.
    pub fn random_with_rng<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let data = (0..rows * cols).map(|_| rng.random::<f64>()).collect();
        Self::from_parts(rows, cols, data)
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The `(rows, cols)` pair.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Borrow the row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub(crate) fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }

    pub(crate) fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    fn row_slice(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    fn check_index(&self, i: usize, j: usize) -> Result<(), LinalgError> {
        if i >= self.rows {
            return Err(LinalgError::index_out_of_bounds(i, self.rows));
        }
        if j >= self.cols {
            return Err(LinalgError::index_out_of_bounds(j, self.cols));
        }
        Ok(())
    }

    /// Get the entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Result<f64, LinalgError> {
        self.check_index(i, j)?;
        Ok(self.at(i, j))
    }

    /// Set the entry at row `i`, column `j`.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), LinalgError> {
        self.check_index(i, j)?;
        *self.at_mut(i, j) = value;
        Ok(())
    }

    /// Copy row `i` into a [`Vector`].
    pub fn row(&self, i: usize) -> Result<Vector, LinalgError> {
        if i >= self.rows {
            return Err(LinalgError::index_out_of_bounds(i, self.rows));
        }
        Ok(Vector::from_slice(self.row_slice(i)))
    }

    /// Copy column `j` into a [`Vector`].
    pub fn column(&self, j: usize) -> Result<Vector, LinalgError> {
        if j >= self.cols {
            return Err(LinalgError::index_out_of_bounds(j, self.cols));
        }
        Ok(Vector::from((0..self.rows).map(|i| self.at(i, j)).collect::<Vec<_>>()))
    }

    /// Copy the entries into a grid of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row_slice(i).to_vec()).collect()
    }

    /// Copy the entries into a row-major flat buffer.
    pub fn row_packed(&self) -> Vec<f64> {
        self.data.clone()
    }

    /// Copy the entries into a column-major flat buffer.
    pub fn column_packed(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                out.push(self.at(i, j));
            }
        }
        out
    }

    /// Apply `f` to every entry and return the result as a new matrix.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_parts(self.rows, self.cols, self.data.iter().map(|&v| f(v)).collect())
    }

    /// Copy into a larger `rows x cols` matrix, padding with zeros.
    fn padded(&self, rows: usize, cols: usize) -> Self {
        if rows == self.rows && cols == self.cols {
            return self.clone();
        }
        let mut out = Self::zeros(rows, cols);
        for i in 0..self.rows {
            out.data[i * cols..i * cols + self.cols].copy_from_slice(self.row_slice(i));
        }
        out
    }

    fn zip_broadcast_matrix(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Self {
        let rows = self.rows.max(other.rows);
        let cols = self.cols.max(other.cols);
        let a = self.padded(rows, cols);
        let b = other.padded(rows, cols);
        let data = a.data.iter().zip(b.data.iter()).map(|(&x, &y)| f(x, y)).collect();
        Self::from_parts(rows, cols, data)
    }

    fn zip_broadcast_vector(&self, v: &Vector, f: impl Fn(f64, f64) -> f64) -> Self {
        let cols = self.cols.max(v.len());
        let a = self.padded(self.rows, cols);
        let mut v = v.to_vec();
        v.resize(cols, 0.0);
        let data = a
            .data
            .chunks(cols.max(1))
            .flat_map(|row| row.iter().zip(v.iter()).map(|(&x, &y)| f(x, y)))
            .collect::<Vec<_>>();
        Self::from_parts(self.rows, cols, data)
    }

    fn zip_exact(
        &self,
        other: &Matrix,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, LinalgError> {
        if self.shape() != other.shape() {
            return Err(LinalgError::shape_mismatch(op, self.shape(), other.shape()));
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&x, &y)| f(x, y))
            .collect();
        Ok(Self::from_parts(self.rows, self.cols, data))
    }

    /// Add a scalar to every entry.
    pub fn add_scalar(&self, value: f64) -> Self {
        self.map(|v| v + value)
    }

    /// Subtract a scalar from every entry.
    pub fn subtract_scalar(&self, value: f64) -> Self {
        self.map(|v| v - value)
    }

    /// Multiply every entry by a scalar.
    pub fn multiply_scalar(&self, value: f64) -> Self {
        self.map(|v| v * value)
    }

    /// Divide every entry by a scalar.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DivisionByZero`] if `value` is exactly zero.
    pub fn divide_scalar(&self, value: f64) -> Result<Self, LinalgError> {
        if value == 0.0 {
            return Err(LinalgError::DivisionByZero);
        }
        Ok(self.map(|v| v / value))
    }

    /// Raise every entry to the power `value`.
    pub fn pow_scalar(&self, value: f64) -> Self {
        self.map(|v| v.powf(value))
    }

    /// Add `v` to every row. The matrix columns and `v` are zero-padded to the
    /// longer of the two first.
    pub fn add_vector(&self, v: &Vector) -> Self {
        self.zip_broadcast_vector(v, |a, b| a + b)
    }

    /// Subtract `v` from every row, with the same padding as [`Self::add_vector`].
    pub fn subtract_vector(&self, v: &Vector) -> Self {
        self.zip_broadcast_vector(v, |a, b| a - b)
    }

    /// Multiply every row element-wise by `v`, with the same padding as
    /// [`Self::add_vector`].
    pub fn multiply_vector(&self, v: &Vector) -> Self {
        self.zip_broadcast_vector(v, |a, b| a * b)
    }

    /// Divide every row element-wise by `v`, with IEEE-754 semantics.
    pub fn divide_vector(&self, v: &Vector) -> Self {
        self.zip_broadcast_vector(v, |a, b| a / b)
    }

    /// Raise every row element-wise to the powers in `v`.
    pub fn pow_vector(&self, v: &Vector) -> Self {
        self.zip_broadcast_vector(v, f64::powf)
    }

    /// Element-wise sum. Both matrices are zero-padded to
    /// `max(rows) x max(cols)` first.
    pub fn add_matrix(&self, other: &Matrix) -> Self {
        self.zip_broadcast_matrix(other, |a, b| a + b)
    }

    /// Element-wise difference with the same padding as [`Self::add_matrix`].
    pub fn subtract_matrix(&self, other: &Matrix) -> Self {
        self.zip_broadcast_matrix(other, |a, b| a - b)
    }

    /// Element-wise power with the same padding as [`Self::add_matrix`].
    pub fn pow_matrix(&self, other: &Matrix) -> Self {
        self.zip_broadcast_matrix(other, f64::powf)
    }

    /// Matrix product `self * other`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `self.cols() != other.rows()`.
    pub fn multiply(&self, other: &Matrix) -> Result<Self, LinalgError> {
        if self.cols != other.rows {
            return Err(LinalgError::shape_mismatch(
                "multiply",
                (self.cols, other.cols),
                other.shape(),
            ));
        }
        let mut out = Self::zeros(self.rows, other.cols);
        let mut col = vec![0.0; self.cols];
        for j in 0..other.cols {
            for (k, slot) in col.iter_mut().enumerate() {
                *slot = other.at(k, j);
            }
            for i in 0..self.rows {
                let s: f64 = self
                    .row_slice(i)
                    .iter()
                    .zip(col.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                *out.at_mut(i, j) = s;
            }
        }
        Ok(out)
    }

    /// Right division: the `X` with `X * other == self`, computed as
    /// `(other^T \ self^T)^T`.
    ///
    /// Square divisors give the exact quotient, tall transposed divisors the
    /// least-squares one.
    pub fn divide(&self, other: &Matrix) -> Result<Self, LinalgError> {
        Ok(other.transpose().solve(&self.transpose())?.transpose())
    }

    /// Element-wise product. Shapes must match exactly.
    pub fn array_multiply(&self, other: &Matrix) -> Result<Self, LinalgError> {
        self.zip_exact(other, "array_multiply", |a, b| a * b)
    }

    /// Element-wise `self ./ other`. Shapes must match exactly.
    pub fn array_right_divide(&self, other: &Matrix) -> Result<Self, LinalgError> {
        self.zip_exact(other, "array_right_divide", |a, b| a / b)
    }

    /// Element-wise `other ./ self`. Shapes must match exactly.
    pub fn array_left_divide(&self, other: &Matrix) -> Result<Self, LinalgError> {
        self.zip_exact(other, "array_left_divide", |a, b| b / a)
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                *out.at_mut(j, i) = self.at(i, j);
            }
        }
        out
    }

    /// Whether the matrix has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Whether the matrix equals its transpose exactly.
    pub fn is_symmetric(&self) -> bool {
        *self == self.transpose()
    }

    /// Whether the matrix is exactly the identity.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] for non-square matrices.
    pub fn is_identity(&self) -> Result<bool, LinalgError> {
        self.is_identity_with_tolerance(0.0)
    }

    /// Whether every entry is within `tolerance` of the identity.
    pub fn is_identity_with_tolerance(&self, tolerance: f64) -> Result<bool, LinalgError> {
        if !self.is_square() {
            return Err(LinalgError::NotSquare(self.rows, self.cols));
        }
        for i in 0..self.rows {
            for j in 0..self.cols {
                let expected = if i == j { 1.0 } else { 0.0 };
                let diff = (self.at(i, j) - expected).abs();
                if diff.is_nan() || diff > tolerance {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Sum of the `min(rows, cols)` diagonal entries.
    pub fn trace(&self) -> f64 {
        (0..self.rows.min(self.cols)).map(|i| self.at(i, i)).sum()
    }

    /// Maximum absolute column sum.
    pub fn norm1(&self) -> f64 {
        (0..self.cols)
            .map(|j| (0..self.rows).map(|i| self.at(i, j).abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Maximum absolute row sum.
    pub fn norm_inf(&self) -> f64 {
        (0..self.rows)
            .map(|i| self.row_slice(i).iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Frobenius norm, accumulated with `hypot`.
    pub fn norm_frobenius(&self) -> f64 {
        self.data.iter().fold(0.0, |acc: f64, &v| acc.hypot(v))
    }

    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Extract the block `rows i0..=i1`, `cols j0..=j1`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::IndexOutOfBounds`] if a bound is outside the
    /// matrix or a range is reversed.
    pub fn submatrix(&self, i0: usize, i1: usize, j0: usize, j1: usize) -> Result<Self, LinalgError> {
        check_range(i0, i1, self.rows)?;
        check_range(j0, j1, self.cols)?;
        let cols = j1 - j0 + 1;
        let mut data = Vec::with_capacity((i1 - i0 + 1) * cols);
        for i in i0..=i1 {
            data.extend_from_slice(&self.row_slice(i)[j0..=j1]);
        }
        Ok(Self::from_parts(i1 - i0 + 1, cols, data))
    }

    /// Extract the rows listed in `row_indices` (in that order), restricted to
    /// columns `j0..=j1`.
    pub fn select_rows(&self, row_indices: &[usize], j0: usize, j1: usize) -> Result<Self, LinalgError> {
        check_range(j0, j1, self.cols)?;
        if let Some(&bad) = row_indices.iter().find(|&&i| i >= self.rows) {
            return Err(LinalgError::index_out_of_bounds(bad, self.rows));
        }
        let cols = j1 - j0 + 1;
        let mut data = Vec::with_capacity(row_indices.len() * cols);
        for &i in row_indices {
            data.extend_from_slice(&self.row_slice(i)[j0..=j1]);
        }
        Ok(Self::from_parts(row_indices.len(), cols, data))
    }

    /// Gather full rows by index. Callers guarantee the indices are in range.
    pub(crate) fn gather_rows(&self, row_indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(row_indices.len() * self.cols);
        for &i in row_indices {
            data.extend_from_slice(self.row_slice(i));
        }
        Self::from_parts(row_indices.len(), self.cols, data)
    }

    /// Determinant through an LU decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] for non-square matrices.
    pub fn determinant(&self) -> Result<f64, LinalgError> {
        Ok(LuDecomposition::new(self)?.determinant())
    }

    /// Solve `self * X = b`.
    ///
    /// Square systems are solved exactly with LU. Other shapes are solved in
    /// the least-squares sense with QR, which requires `rows >= cols` and full
    /// column rank.
    pub fn solve(&self, b: &Matrix) -> Result<Self, LinalgError> {
        if self.is_square() {
            log::debug!("solving {}x{} system with LU", self.rows, self.cols);
            LuDecomposition::new(self)?.solve(b)
        } else {
            log::debug!("solving {}x{} system with QR", self.rows, self.cols);
            QrDecomposition::new(self)?.solve(b)
        }
    }

    /// Inverse for square matrices, least-squares pseudoinverse for tall ones.
    pub fn inverse(&self) -> Result<Self, LinalgError> {
        self.solve(&Self::identity(self.rows))
    }

    /// Compare with another matrix using an absolute tolerance per entry.
    ///
    /// Matrices of different shapes are never approximately equal.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

fn check_range(start: usize, end: usize, size: usize) -> Result<(), LinalgError> {
    if end >= size {
        return Err(LinalgError::index_out_of_bounds(end, size));
    }
    if start > end {
        return Err(LinalgError::index_out_of_bounds(start, end + 1));
    }
    Ok(())
}

// Consistent with the exact `PartialEq`: `0.0` and `-0.0` compare equal, so
// they must hash alike.
impl Hash for Matrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        for v in &self.data {
            let bits = if *v == 0.0 { 0u64 } else { v.to_bits() };
            bits.hash(state);
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in self.row_slice(i).iter().enumerate() {
                if j > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{}", format_value(*v))?;
            }
        }
        Ok(())
    }
}

impl From<&Vector> for Matrix {
    fn from(v: &Vector) -> Self {
        Self::from_vector(v)
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }
}

impl std::ops::Add<&Matrix> for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        self.add_matrix(rhs)
    }
}

impl std::ops::Sub<&Matrix> for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        self.subtract_matrix(rhs)
    }
}

impl std::ops::Add<f64> for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: f64) -> Matrix {
        self.add_scalar(rhs)
    }
}

impl std::ops::Sub<f64> for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: f64) -> Matrix {
        self.subtract_scalar(rhs)
    }
}

impl std::ops::Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f64) -> Matrix {
        self.multiply_scalar(rhs)
    }
}

// IEEE-754 semantics: the checked variant is `divide_scalar`.
impl std::ops::Div<f64> for &Matrix {
    type Output = Matrix;

    fn div(self, rhs: f64) -> Matrix {
        self.map(|v| v / rhs)
    }
}

impl std::ops::Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.map(|v| -v)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn hash_of(m: &Matrix) -> u64 {
        let mut h = DefaultHasher::new();
        m.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_from_rows() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2)?, 6.0);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);

        let ragged = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            ragged,
            Err(LinalgError::InvalidShape {
                expected: 2,
                actual: 1
            })
        );

        let empty = Matrix::from_rows::<Vec<f64>>(&[])?;
        assert_eq!(empty.shape(), (0, 0));
        Ok(())
    }

    #[test]
    fn test_from_column_packed() -> Result<(), LinalgError> {
        let m = Matrix::from_column_packed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2)?;
        assert_eq!(m, Matrix::from_rows(&[[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]])?);
        assert_eq!(m.column_packed(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row_packed(), vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);

        assert!(Matrix::from_column_packed(&[1.0, 2.0, 3.0], 2).is_err());
        assert!(Matrix::from_column_packed(&[1.0], 0).is_err());
        assert_eq!(Matrix::from_column_packed(&[], 0)?.shape(), (0, 0));
        Ok(())
    }

    #[test]
    fn test_factories() -> Result<(), LinalgError> {
        assert_eq!(Matrix::square(3).shape(), (3, 3));
        assert_eq!(Matrix::filled(2, 2, 7.0).sum(), 28.0);
        assert_eq!(Matrix::from_scalar(4.0).shape(), (1, 1));

        let v = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let row = Matrix::from_vector(&v);
        assert_eq!(row.shape(), (1, 3));
        assert_eq!(row.row(0)?, v);

        let mut rng = StdRng::seed_from_u64(42);
        let r = Matrix::random_with_rng(4, 5, &mut rng);
        assert_eq!(r.shape(), (4, 5));
        assert!(r.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
        assert_eq!(Matrix::random(2, 3).shape(), (2, 3));
        Ok(())
    }

    #[test]
    fn test_get_set_out_of_bounds() -> Result<(), LinalgError> {
        let mut m = Matrix::zeros(2, 3);
        m.set(1, 2, 5.0)?;
        assert_eq!(m[(1, 2)], 5.0);
        assert_eq!(m.get(2, 0), Err(LinalgError::index_out_of_bounds(2, 2)));
        assert_eq!(m.set(0, 3, 1.0), Err(LinalgError::index_out_of_bounds(3, 3)));
        assert!(m.row(2).is_err());
        assert!(m.column(3).is_err());
        assert_eq!(m.column(2)?.as_slice(), &[0.0, 5.0]);
        Ok(())
    }

    #[test]
    fn test_copies_do_not_alias() -> Result<(), LinalgError> {
        let grid = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let mut a = Matrix::from_rows(&grid)?;
        let b = a.clone();
        a.set(0, 0, 9.0)?;
        assert_eq!(b.get(0, 0)?, 1.0);
        assert_eq!(grid[0][0], 1.0);

        let mut rows = a.to_rows();
        rows[1][1] = -1.0;
        assert_eq!(a.get(1, 1)?, 4.0);
        Ok(())
    }

    #[test]
    fn test_scalar_arithmetic() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        assert_eq!(m.add_scalar(1.0), Matrix::from_rows(&[[2.0, 3.0], [4.0, 5.0]])?);
        assert_eq!(m.subtract_scalar(1.0), Matrix::from_rows(&[[0.0, 1.0], [2.0, 3.0]])?);
        assert_eq!(m.multiply_scalar(2.0), Matrix::from_rows(&[[2.0, 4.0], [6.0, 8.0]])?);
        assert_eq!(m.divide_scalar(2.0)?, Matrix::from_rows(&[[0.5, 1.0], [1.5, 2.0]])?);
        assert_eq!(m.pow_scalar(2.0), Matrix::from_rows(&[[1.0, 4.0], [9.0, 16.0]])?);
        assert_eq!(m.divide_scalar(0.0), Err(LinalgError::DivisionByZero));
        assert_eq!(&m * 2.0, m.multiply_scalar(2.0));
        assert_eq!(-&m, m.multiply_scalar(-1.0));
        Ok(())
    }

    #[test]
    fn test_vector_broadcast() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;

        let v = Vector::from_slice(&[10.0, 20.0]);
        assert_eq!(m.add_vector(&v), Matrix::from_rows(&[[11.0, 22.0], [13.0, 24.0]])?);
        assert_eq!(m.multiply_vector(&v), Matrix::from_rows(&[[10.0, 40.0], [30.0, 80.0]])?);

        // longer vector pads the matrix columns
        let long = Vector::from_slice(&[1.0, 1.0, 1.0]);
        assert_eq!(
            m.add_vector(&long),
            Matrix::from_rows(&[[2.0, 3.0, 1.0], [4.0, 5.0, 1.0]])?
        );

        // shorter vector is padded with zeros
        let short = Vector::from_slice(&[5.0]);
        assert_eq!(m.subtract_vector(&short), Matrix::from_rows(&[[-4.0, 2.0], [-2.0, 4.0]])?);
        assert_eq!(short.len(), 1);
        Ok(())
    }

    #[test]
    fn test_matrix_broadcast() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        let b = Matrix::from_rows(&[[1.0, 1.0, 1.0]])?;
        let c = &a + &b;
        assert_eq!(c, Matrix::from_rows(&[[2.0, 3.0, 1.0], [3.0, 4.0, 0.0]])?);
        assert_eq!(a.shape(), (2, 2));
        assert_eq!(b.shape(), (1, 3));

        let d = &a - &a;
        assert_eq!(d, Matrix::zeros(2, 2));
        Ok(())
    }

    #[test]
    fn test_multiply() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        let b = Matrix::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]])?;
        let c = a.multiply(&b)?;
        assert_eq!(c, Matrix::from_rows(&[[58.0, 64.0], [139.0, 154.0]])?);

        let res = a.multiply(&a);
        assert!(matches!(res, Err(LinalgError::DimensionMismatch { .. })));
        Ok(())
    }

    #[test]
    fn test_multiply_identity() -> Result<(), LinalgError> {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..6 {
            let a = Matrix::random_with_rng(n, n, &mut rng);
            assert_eq!(a.multiply(&Matrix::identity(n))?, a);
        }
        Ok(())
    }

    #[test]
    fn test_array_ops() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[2.0, 4.0], [6.0, 8.0]])?;
        let b = Matrix::from_rows(&[[1.0, 2.0], [3.0, 0.0]])?;

        assert_eq!(a.array_multiply(&b)?, Matrix::from_rows(&[[2.0, 8.0], [18.0, 0.0]])?);

        let r = a.array_right_divide(&b)?;
        assert_eq!(r.get(0, 1)?, 2.0);
        assert!(r.get(1, 1)?.is_infinite());

        let l = a.array_left_divide(&b)?;
        assert_eq!(l.get(0, 0)?, 0.5);
        assert_eq!(l.get(1, 1)?, 0.0);

        let c = Matrix::zeros(2, 3);
        assert!(a.array_multiply(&c).is_err());
        assert!(a.array_right_divide(&c).is_err());
        assert!(a.array_left_divide(&c).is_err());
        Ok(())
    }

    #[test]
    fn test_divide() -> Result<(), LinalgError> {
        let b = Matrix::from_rows(&[[2.0, 1.0], [1.0, 3.0]])?;
        let x = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])?;
        let a = x.multiply(&b)?;
        assert!(a.divide(&b)?.approx_eq(&x, 1e-12));
        Ok(())
    }

    #[test]
    fn test_transpose() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        let t = a.transpose();
        assert_eq!(t, Matrix::from_rows(&[[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]])?);
        assert_eq!(t.transpose(), a);
        Ok(())
    }

    #[test]
    fn test_structural_queries() -> Result<(), LinalgError> {
        let sym = Matrix::from_rows(&[[1.0, 2.0], [2.0, 5.0]])?;
        assert!(sym.is_square());
        assert!(sym.is_symmetric());
        assert!(!Matrix::from_rows(&[[1.0, 2.0], [3.0, 5.0]])?.is_symmetric());
        assert!(!Matrix::zeros(2, 3).is_symmetric());

        assert!(Matrix::identity(2).is_identity()?);
        assert!(!Matrix::from_rows(&[[1.0, 0.0], [0.0, 0.0]])?.is_identity()?);
        assert_eq!(Matrix::zeros(2, 3).is_identity(), Err(LinalgError::NotSquare(2, 3)));

        let near = Matrix::from_rows(&[[1.0 + 1e-12, 0.0], [1e-13, 1.0]])?;
        assert!(!near.is_identity()?);
        assert!(near.is_identity_with_tolerance(1e-9)?);
        Ok(())
    }

    #[test]
    fn test_norms_and_trace() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, -2.0, 3.0], [-4.0, 5.0, -6.0]])?;
        assert_eq!(m.trace(), 6.0);
        assert_eq!(m.norm1(), 9.0);
        assert_eq!(m.norm_inf(), 15.0);
        assert_eq!(m.sum(), -3.0);
        assert_relative_eq!(m.norm_frobenius(), 91f64.sqrt(), epsilon = 1e-12);
        assert_eq!(Matrix::zeros(0, 0).norm1(), 0.0);
        Ok(())
    }

    #[test]
    fn test_submatrix() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]])?;
        assert_eq!(m.submatrix(1, 2, 0, 1)?, Matrix::from_rows(&[[4.0, 5.0], [7.0, 8.0]])?);
        assert_eq!(m.submatrix(0, 0, 2, 2)?, Matrix::from_scalar(3.0));
        assert_eq!(m.submatrix(0, 3, 0, 0), Err(LinalgError::index_out_of_bounds(3, 3)));
        assert!(m.submatrix(2, 1, 0, 0).is_err());

        let picked = m.select_rows(&[2, 0], 1, 2)?;
        assert_eq!(picked, Matrix::from_rows(&[[8.0, 9.0], [2.0, 3.0]])?);
        assert_eq!(m.select_rows(&[0, 3], 0, 2), Err(LinalgError::index_out_of_bounds(3, 3)));
        assert!(m.select_rows(&[0], 0, 3).is_err());
        Ok(())
    }

    #[test]
    fn test_equality_and_hash() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 0.0], [2.0, 3.0]])?;
        let b = Matrix::from_rows(&[[1.0, -0.0], [2.0, 3.0]])?;
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        // same content, different shape
        let c = Matrix::from_row_packed(&a.row_packed(), 1, 4)?;
        assert_ne!(a, c);
        assert_ne!(hash_of(&a), hash_of(&c));
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, 2.5], [-3.0, 4.0]])?;
        assert_eq!(m.to_string(), "1.0\t2.5\n-3.0\t4.0");
        assert_eq!(Matrix::zeros(0, 0).to_string(), "");
        Ok(())
    }

    #[test]
    fn test_determinant_dispatch() -> Result<(), LinalgError> {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        assert_eq!(m.determinant()?, -2.0);
        assert_eq!(Matrix::zeros(2, 3).determinant(), Err(LinalgError::NotSquare(2, 3)));
        Ok(())
    }

    #[test]
    fn test_solve_dispatch() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 2.0]])?;
        let b = Matrix::from_rows(&[[4.0], [6.0]])?;
        assert_eq!(a.solve(&b)?, Matrix::from_rows(&[[2.0], [3.0]])?);

        // overdetermined, consistent system: exact fit through least squares
        let a = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]])?;
        let b = Matrix::from_rows(&[[1.0], [2.0], [3.0]])?;
        let x = a.solve(&b)?;
        assert!(x.approx_eq(&Matrix::from_rows(&[[1.0], [2.0]])?, 1e-12));

        let singular = Matrix::from_rows(&[[0.0, 1.0], [0.0, 0.0]])?;
        assert_eq!(singular.solve(&b.submatrix(0, 1, 0, 0)?), Err(LinalgError::Singular));

        let wide = Matrix::zeros(2, 3);
        assert!(matches!(
            wide.solve(&Matrix::zeros(2, 1)),
            Err(LinalgError::DimensionMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_pseudoinverse() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]])?;
        let pinv = a.inverse()?;
        assert_eq!(pinv.shape(), (2, 3));
        assert!(pinv.approx_eq(&Matrix::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])?, 1e-12));
        assert!(pinv.multiply(&a)?.is_identity_with_tolerance(1e-12)?);
        Ok(())
    }
}
