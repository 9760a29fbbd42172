use std::fmt;
use std::str::FromStr;

use crate::error::LinalgError;

/// A dense, owned, one-dimensional vector of `f64` values.
///
/// Arithmetic never mutates its operands. When two vectors of different sizes
/// meet in a binary operation, the shorter one is padded with trailing zeros
/// so that the result has the size of the longer one.
///
/// # Example
///
/// ```
/// use kornia_matrix::Vector;
///
/// let a = Vector::from_slice(&[1.0, 2.0]);
/// let b = Vector::from_slice(&[1.0, 2.0, 3.0]);
/// assert_eq!(a.add_vector(&b).as_slice(), &[2.0, 4.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    values: Vec<f64>,
}

/// Pads two slices with trailing zeros to the length of the longer one.
///
/// Returns owned copies; the inputs are left untouched.
pub(crate) fn pad_to_common_len(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let len = a.len().max(b.len());
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.resize(len, 0.0);
    b.resize(len, 0.0);
    (a, b)
}

/// Formats a value the way vectors and matrices print their entries.
pub(crate) fn format_value(value: f64) -> String {
    format!("{value:?}")
}

impl Vector {
    /// Create a vector from a slice. The data is copied.
    pub fn from_slice(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// Create a zero-filled vector of the given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
        }
    }

    /// Create a vector of the given size with every entry set to `value`.
    pub fn filled(size: usize, value: f64) -> Self {
        Self {
            values: vec![value; size],
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the entries.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Copy the entries into a new `Vec`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    /// Get the entry at `index`.
    pub fn get(&self, index: usize) -> Result<f64, LinalgError> {
        self.values
            .get(index)
            .copied()
            .ok_or_else(|| LinalgError::index_out_of_bounds(index, self.len()))
    }

    /// Set the entry at `index`.
    pub fn set(&mut self, index: usize, value: f64) -> Result<(), LinalgError> {
        let size = self.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or_else(|| LinalgError::index_out_of_bounds(index, size))?;
        *slot = value;
        Ok(())
    }

    /// Resize in place, zero-padding at the tail or truncating.
    pub fn resize(&mut self, size: usize) {
        self.values.resize(size, 0.0);
    }

    /// Apply `f` to every entry and return the result as a new vector.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    fn zip_broadcast(&self, other: &Vector, f: impl Fn(f64, f64) -> f64) -> Self {
        let (a, b) = pad_to_common_len(&self.values, &other.values);
        Self {
            values: a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect(),
        }
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

    /// Element-wise sum with zero-padding broadcast.
    pub fn add_vector(&self, other: &Vector) -> Self {
        self.zip_broadcast(other, |a, b| a + b)
    }

    /// Element-wise difference with zero-padding broadcast.
    pub fn subtract_vector(&self, other: &Vector) -> Self {
        self.zip_broadcast(other, |a, b| a - b)
    }

    /// Element-wise product with zero-padding broadcast.
    pub fn multiply_vector(&self, other: &Vector) -> Self {
        self.zip_broadcast(other, |a, b| a * b)
    }

    /// Element-wise quotient with zero-padding broadcast.
    ///
    /// Division by zero entries, including padded ones, follows IEEE-754.
    pub fn divide_vector(&self, other: &Vector) -> Self {
        self.zip_broadcast(other, |a, b| a / b)
    }

    /// Element-wise power with zero-padding broadcast.
    pub fn pow_vector(&self, other: &Vector) -> Self {
        self.zip_broadcast(other, f64::powf)
    }

    /// Dot product. Sizes are broadcast, so extra entries contribute zero.
    pub fn dot(&self, other: &Vector) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Cross product of two 3-vectors.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] unless both vectors have
    /// exactly three entries.
    pub fn cross(&self, other: &Vector) -> Result<Self, LinalgError> {
        if self.len() != 3 {
            return Err(LinalgError::length_mismatch("cross", 3, self.len()));
        }
        if other.len() != 3 {
            return Err(LinalgError::length_mismatch("cross", 3, other.len()));
        }
        let (a, b) = (&self.values, &other.values);
        Ok(Self {
            values: vec![
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ],
        })
    }

    /// Euclidean norm, accumulated with `hypot` to avoid overflow.
    pub fn norm(&self) -> f64 {
        self.values.iter().fold(0.0, |acc: f64, &v| acc.hypot(v))
    }

    /// Sum of squared entries.
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    /// Scale the vector in place to unit length.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::ZeroNorm`] if the norm is exactly zero; the
    /// vector is left unchanged in that case.
    pub fn normalize(&mut self) -> Result<(), LinalgError> {
        let norm = self.norm();
        if norm == 0.0 {
            return Err(LinalgError::ZeroNorm);
        }
        self.values.iter_mut().for_each(|v| *v /= norm);
        Ok(())
    }

    /// Return a unit-length copy of the vector.
    pub fn normalized(&self) -> Result<Self, LinalgError> {
        let mut out = self.clone();
        out.normalize()?;
        Ok(out)
    }

    /// Element-wise exponential.
    pub fn exp(&self) -> Self {
        self.map(f64::exp)
    }

    /// Element-wise natural logarithm. Negative entries become NaN.
    pub fn ln(&self) -> Self {
        self.map(f64::ln)
    }

    /// Element-wise square root. Negative entries become NaN.
    pub fn sqrt(&self) -> Self {
        self.map(f64::sqrt)
    }

    /// Element-wise absolute value.
    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Smallest entry, or `None` for an empty vector.
    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    /// Largest entry, or `None` for an empty vector.
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Arithmetic mean, or `None` for an empty vector.
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.sum() / self.len() as f64)
    }

    /// Compare with another vector using an absolute tolerance per entry.
    ///
    /// Unlike `==`, vectors of different sizes are never approximately equal.
    pub fn approx_eq(&self, other: &Vector, tolerance: f64) -> bool {
        self.len() == other.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl From<&[f64]> for Vector {
    fn from(values: &[f64]) -> Self {
        Self::from_slice(values)
    }
}

impl From<Vector> for Vec<f64> {
    fn from(v: Vector) -> Self {
        v.values
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", format_value(*v))?;
        }
        write!(f, "}}")
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-' || c == 'e'
}

impl FromStr for Vector {
    type Err = LinalgError;

    /// Parse a literal of the form `{v1, v2, ..., vn}`.
    ///
    /// Whitespace is ignored anywhere. Number tokens may only contain digits,
    /// `.`, `-` and `e`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let inner = compact
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| LinalgError::Parse(format!("expected '{{...}}', got '{s}'")))?;

        if inner.is_empty() {
            return Ok(Self::default());
        }

        let values = inner
            .split(',')
            .map(|token| {
                if token.is_empty() || !token.chars().all(is_number_char) {
                    return Err(LinalgError::Parse(format!("invalid number '{token}'")));
                }
                token
                    .parse::<f64>()
                    .map_err(|e| LinalgError::Parse(format!("invalid number '{token}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { values })
    }
}

impl std::ops::Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl std::ops::Add<&Vector> for &Vector {
    type Output = Vector;

    fn add(self, rhs: &Vector) -> Vector {
        self.add_vector(rhs)
    }
}

impl std::ops::Sub<&Vector> for &Vector {
    type Output = Vector;

    fn sub(self, rhs: &Vector) -> Vector {
        self.subtract_vector(rhs)
    }
}

impl std::ops::Add<f64> for &Vector {
    type Output = Vector;

    fn add(self, rhs: f64) -> Vector {
        self.add_scalar(rhs)
    }
}

impl std::ops::Sub<f64> for &Vector {
    type Output = Vector;

    fn sub(self, rhs: f64) -> Vector {
        self.subtract_scalar(rhs)
    }
}

impl std::ops::Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.multiply_scalar(rhs)
    }
}

// IEEE-754 semantics: the checked variant is `divide_scalar`.
impl std::ops::Div<f64> for &Vector {
    type Output = Vector;

    fn div(self, rhs: f64) -> Vector {
        self.map(|v| v / rhs)
    }
}

impl std::ops::Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.map(|v| -v)
    }
}
