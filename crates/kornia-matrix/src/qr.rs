use crate::error::LinalgError;
use crate::matrix::Matrix;

/// QR decomposition of an `m x n` matrix with `m >= n`, computed with
/// Householder reflections.
///
/// The packed factor stores the Householder vectors on and below the diagonal
/// and the strictly upper part of `R` above it. The diagonal of `R` is kept
/// separately in `r_diag`.
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    qr: Matrix,
    r_diag: Vec<f64>,
    m: usize,
    n: usize,
}

impl QrDecomposition {
    /// Factor `a`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `a` has fewer rows than
    /// columns.
    pub fn new(a: &Matrix) -> Result<Self, LinalgError> {
        let (m, n) = a.shape();
        if m < n {
            return Err(LinalgError::DimensionMismatch {
                op: "qr",
                expected: format!("rows >= {n}"),
                actual: format!("{m}x{n}"),
            });
        }

        let mut qr = a.clone();
        let mut r_diag = vec![0.0; n];

        for k in 0..n {
            // 2-norm of the k-th column below the diagonal, without overflow
            let mut nrm = 0.0f64;
            for i in k..m {
                nrm = nrm.hypot(qr.at(i, k));
            }

            if nrm != 0.0 {
                // reflect away from the sign of the diagonal to avoid cancellation
                if qr.at(k, k) < 0.0 {
                    nrm = -nrm;
                }
                for i in k..m {
                    *qr.at_mut(i, k) /= nrm;
                }
                *qr.at_mut(k, k) += 1.0;

                for j in (k + 1)..n {
                    let mut s = 0.0;
                    for i in k..m {
                        s += qr.at(i, k) * qr.at(i, j);
                    }
                    s = -s / qr.at(k, k);
                    for i in k..m {
                        let v = qr.at(i, k);
                        *qr.at_mut(i, j) += s * v;
                    }
                }
            }
            r_diag[k] = -nrm;
        }

        Ok(Self { qr, r_diag, m, n })
    }

    /// Number of rows of the factored matrix.
    #[inline]
    pub fn rows(&self) -> usize {
        self.m
    }

    /// Number of columns of the factored matrix.
    #[inline]
    pub fn cols(&self) -> usize {
        self.n
    }

    /// Diagonal of `R`.
    pub fn r_diagonal(&self) -> &[f64] {
        &self.r_diag
    }

    /// Whether every diagonal entry of `R` is exactly non-zero.
    ///
    /// Rounding in the factorization can leave tiny non-zero values on the
    /// diagonal of a rank deficient matrix; see
    /// [`QrDecomposition::is_full_rank_with_tolerance`].
    pub fn is_full_rank(&self) -> bool {
        self.r_diag.iter().all(|&d| d != 0.0)
    }

    /// Whether every diagonal entry of `R` exceeds `tolerance` in magnitude.
    pub fn is_full_rank_with_tolerance(&self, tolerance: f64) -> bool {
        self.r_diag.iter().all(|&d| d.abs() > tolerance)
    }

    /// The Householder vectors as an `m x n` lower trapezoidal matrix.
    pub fn h(&self) -> Matrix {
        let mut h = Matrix::zeros(self.m, self.n);
        for i in 0..self.m {
            for j in 0..self.n.min(i + 1) {
                *h.at_mut(i, j) = self.qr.at(i, j);
            }
        }
        h
    }

    /// The `n x n` upper triangular factor `R`.
    pub fn r(&self) -> Matrix {
        let n = self.n;
        let mut r = Matrix::square(n);
        for i in 0..n {
            *r.at_mut(i, i) = self.r_diag[i];
            for j in (i + 1)..n {
                *r.at_mut(i, j) = self.qr.at(i, j);
            }
        }
        r
    }

    /// The economy-size `m x n` orthogonal factor `Q`.
    pub fn q(&self) -> Matrix {
        let (m, n) = (self.m, self.n);
        let mut q = Matrix::zeros(m, n);
        for k in (0..n).rev() {
            *q.at_mut(k, k) = 1.0;
            let vkk = self.qr.at(k, k);
            if vkk == 0.0 {
                continue;
            }
            for j in k..n {
                let mut s = 0.0;
                for i in k..m {
                    s += self.qr.at(i, k) * q.at(i, j);
                }
                s = -s / vkk;
                for i in k..m {
                    *q.at_mut(i, j) += s * self.qr.at(i, k);
                }
            }
        }
        q
    }

    /// Least-squares solution of `A * X = b`, minimising `||A * X - b||`.
    ///
    /// # Errors
    ///
    /// - [`LinalgError::DimensionMismatch`] if `b.rows()` differs from the rows of `A`.
    /// - [`LinalgError::RankDeficient`] if `A` is not of full column rank.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix, LinalgError> {
        let (m, n) = (self.m, self.n);
        if b.rows() != m {
            return Err(LinalgError::shape_mismatch(
                "qr_solve",
                (m, b.cols()),
                b.shape(),
            ));
        }
        if !self.is_full_rank() {
            log::debug!("qr solve rejected: {m}x{n} matrix is rank deficient");
            return Err(LinalgError::RankDeficient);
        }

        let nx = b.cols();
        let mut x = b.clone();

        // Y = Q^T * B
        for k in 0..n {
            let vkk = self.qr.at(k, k);
            for j in 0..nx {
                let mut s = 0.0;
                for i in k..m {
                    s += self.qr.at(i, k) * x.at(i, j);
                }
                s = -s / vkk;
                for i in k..m {
                    *x.at_mut(i, j) += s * self.qr.at(i, k);
                }
            }
        }

        // R * X = Y
        for k in (0..n).rev() {
            for j in 0..nx {
                *x.at_mut(k, j) /= self.r_diag[k];
            }
            for i in 0..k {
                let r = self.qr.at(i, k);
                for j in 0..nx {
                    let v = x.at(k, j);
                    *x.at_mut(i, j) -= v * r;
                }
            }
        }

        if n == 0 || nx == 0 {
            return Ok(Matrix::zeros(n, nx));
        }
        x.submatrix(0, n - 1, 0, nx - 1)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn scenario_matrix() -> Result<Matrix, LinalgError> {
        Matrix::from_rows(&[[12.0, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]])
    }

    #[test]
    fn test_known_factorization() -> Result<(), LinalgError> {
        let a = scenario_matrix()?;
        let qr = QrDecomposition::new(&a)?;
        assert!(qr.is_full_rank());

        // |R| diagonal of the textbook example is (14, 175, 35)
        let d = qr.r_diagonal();
        assert_relative_eq!(d[0].abs(), 14.0, epsilon = 1e-10);
        assert_relative_eq!(d[1].abs(), 175.0, epsilon = 1e-10);
        assert_relative_eq!(d[2].abs(), 35.0, epsilon = 1e-10);

        let q = qr.q();
        let r = qr.r();
        assert!(q.multiply(&r)?.approx_eq(&a, 1e-9));
        assert!(q.transpose().multiply(&q)?.is_identity_with_tolerance(1e-9)?);
        Ok(())
    }

    #[test]
    fn test_sign_convention() -> Result<(), LinalgError> {
        // positive diagonal entry: R diagonal comes out negative
        let qr = QrDecomposition::new(&Matrix::from_rows(&[[3.0], [4.0]])?)?;
        assert_eq!(qr.r_diagonal(), &[-5.0]);

        // negative diagonal entry: R diagonal comes out positive
        let qr = QrDecomposition::new(&Matrix::from_rows(&[[-3.0], [4.0]])?)?;
        assert_eq!(qr.r_diagonal(), &[5.0]);
        Ok(())
    }

    #[test]
    fn test_tall_matrix() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 9.0]])?;
        let qr = QrDecomposition::new(&a)?;
        assert_eq!((qr.rows(), qr.cols()), (4, 2));

        let q = qr.q();
        let r = qr.r();
        assert_eq!(q.shape(), (4, 2));
        assert_eq!(r.shape(), (2, 2));
        assert_eq!(r.get(1, 0)?, 0.0);
        assert!(q.multiply(&r)?.approx_eq(&a, 1e-9));
        assert!(q.transpose().multiply(&q)?.is_identity_with_tolerance(1e-9)?);
        Ok(())
    }

    #[test]
    fn test_householder_vectors() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])?;
        let h = QrDecomposition::new(&a)?.h();
        assert_eq!(h.shape(), (3, 2));
        assert_eq!(h.get(0, 1)?, 0.0);
        // each Householder vector has v_kk in [1, 2]
        assert!((1.0..=2.0).contains(&h.get(0, 0)?));
        assert!((1.0..=2.0).contains(&h.get(1, 1)?));
        Ok(())
    }

    #[test]
    fn test_least_squares() -> Result<(), LinalgError> {
        // fit y = c0 + c1 * x to four noisy points
        let a = Matrix::from_rows(&[[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]])?;
        let b = Matrix::from_rows(&[[1.5], [2.5], [5.5], [6.5]])?;
        let x = QrDecomposition::new(&a)?.solve(&b)?;
        assert_eq!(x.shape(), (2, 1));
        assert_relative_eq!(x.get(0, 0)?, 1.3, epsilon = 1e-12);
        assert_relative_eq!(x.get(1, 0)?, 1.8, epsilon = 1e-12);

        // the residual is orthogonal to the column space
        let residual = a.multiply(&x)?.subtract_matrix(&b);
        let normal = a.transpose().multiply(&residual)?;
        assert!(normal.approx_eq(&Matrix::zeros(2, 1), 1e-12));
        Ok(())
    }

    #[test]
    fn test_rank_deficient() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 0.0], [1.0, 0.0], [1.0, 0.0]])?;
        let qr = QrDecomposition::new(&a)?;
        assert!(!qr.is_full_rank());
        assert_eq!(qr.solve(&Matrix::zeros(3, 1)), Err(LinalgError::RankDeficient));
        Ok(())
    }

    #[test]
    fn test_tolerance_rank_check() -> Result<(), LinalgError> {
        let a = Matrix::from_rows(&[[1.0, 1.0], [1.0, 1.0 + 1e-15], [1.0, 1.0]])?;
        let qr = QrDecomposition::new(&a)?;
        assert!(qr.is_full_rank_with_tolerance(0.0) == qr.is_full_rank());
        assert!(!qr.is_full_rank_with_tolerance(1e-10));
        Ok(())
    }

    #[test]
    fn test_errors() -> Result<(), LinalgError> {
        assert!(matches!(
            QrDecomposition::new(&Matrix::zeros(2, 3)),
            Err(LinalgError::DimensionMismatch { .. })
        ));
        let qr = QrDecomposition::new(&Matrix::identity(3))?;
        assert!(matches!(
            qr.solve(&Matrix::zeros(4, 1)),
            Err(LinalgError::DimensionMismatch { .. })
        ));
        Ok(())
    }
}
