#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `kornia-matrix` provides dense, heap allocated [`Matrix`] and [`Vector`]
//! types over `f64`, together with the two factorizations needed to solve
//! linear systems:
//!
//! - [`LuDecomposition`]: Gaussian elimination with partial pivoting, used for
//!   determinants and exact solves of square systems.
//! - [`QrDecomposition`]: Householder reflections, used for least-squares
//!   solves of tall systems and rank checks.
//!
//! [`Matrix::solve`], [`Matrix::inverse`] and [`Matrix::determinant`] pick the
//! right factorization based on the shape of the matrix.
//!
//! # Quick Start
//!
//! ```rust
//! use kornia_matrix::{LinalgError, Matrix};
//!
//! # fn main() -> Result<(), LinalgError> {
//! let a = Matrix::from_rows(&[[4.0, 3.0], [6.0, 3.0]])?;
//! let b = Matrix::from_rows(&[[10.0], [12.0]])?;
//!
//! let x = a.solve(&b)?;
//! assert!(a.multiply(&x)?.approx_eq(&b, 1e-12));
//! assert!((a.determinant()? + 6.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! Values are immutable from the point of view of arithmetic: every operation
//! returns a new matrix or vector. Operands of different sizes are zero-padded
//! to a common size for the broadcasting operations; the element-wise
//! `array_*` operations require exact shape matches instead.

/// Error types for matrix and decomposition operations.
pub mod error;

/// LU decomposition with partial pivoting.
pub mod lu;

/// Dense row-major matrix.
pub mod matrix;

/// Householder QR decomposition.
pub mod qr;

/// Serde support for matrices and vectors.
#[cfg(feature = "serde")]
pub mod serde;

/// Dense vector.
pub mod vector;

pub use crate::error::LinalgError;
pub use crate::lu::LuDecomposition;
pub use crate::matrix::Matrix;
pub use crate::qr::QrDecomposition;
pub use crate::vector::Vector;
