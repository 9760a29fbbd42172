use crate::error::LinalgError;
use crate::matrix::Matrix;

/// LU decomposition with partial pivoting of a square matrix.
///
/// Computes `P * A = L * U` where `L` is unit lower triangular, `U` is upper
/// triangular and `P` is a row permutation. The factors are computed once in
/// [`LuDecomposition::new`] from a copy of the input and never change.
///
/// Building the decomposition succeeds for any square matrix, singular or not.
/// Singularity only surfaces in [`LuDecomposition::solve`].
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Packed factors: multipliers of `L` below the diagonal, `U` on and above.
    lu: Matrix,
    /// `pivot[i]` is the row of the input that ended up in row `i`.
    pivot: Vec<usize>,
    /// `+1.0` or `-1.0` depending on the parity of the row swaps.
    pivot_sign: f64,
}

impl LuDecomposition {
    /// Factor `a` with Gaussian elimination and partial pivoting.
    ///
    /// For each column `k` the row with the largest absolute value at or below
    /// the diagonal becomes the pivot; ties keep the lowest row index.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] if `a` is not square.
    pub fn new(a: &Matrix) -> Result<Self, LinalgError> {
        if !a.is_square() {
            return Err(LinalgError::NotSquare(a.rows(), a.cols()));
        }
        let n = a.rows();
        let mut lu = a.clone();
        let mut pivot: Vec<usize> = (0..n).collect();
        let mut pivot_sign = 1.0;

        for k in 0..n {
            let mut p = k;
            let mut max = lu.at(k, k).abs();
            for i in (k + 1)..n {
                let v = lu.at(i, k).abs();
                if v > max {
                    max = v;
                    p = i;
                }
            }

            if p != k {
                lu.swap_rows(p, k);
                pivot.swap(p, k);
                pivot_sign = -pivot_sign;
            }

            let d = lu.at(k, k);
            if d == 0.0 {
                // the whole column below the diagonal is zero, nothing to eliminate
                continue;
            }
            for i in (k + 1)..n {
                let m = lu.at(i, k) / d;
                *lu.at_mut(i, k) = m;
                if m == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    let u = lu.at(k, j);
                    *lu.at_mut(i, j) -= m * u;
                }
            }
        }

        Ok(Self {
            lu,
            pivot,
            pivot_sign,
        })
    }

    /// Order of the factored matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.lu.rows()
    }

    /// Whether every diagonal entry of `U` is non-zero.
    pub fn is_nonsingular(&self) -> bool {
        (0..self.size()).all(|k| self.lu.at(k, k) != 0.0)
    }

    /// The unit lower triangular factor `L`.
    pub fn l(&self) -> Matrix {
        let n = self.size();
        let mut l = Matrix::square(n);
        for i in 0..n {
            for j in 0..i {
                *l.at_mut(i, j) = self.lu.at(i, j);
            }
            *l.at_mut(i, i) = 1.0;
        }
        l
    }

    /// The upper triangular factor `U`.
    pub fn u(&self) -> Matrix {
        let n = self.size();
        let mut u = Matrix::square(n);
        for i in 0..n {
            for j in i..n {
                *u.at_mut(i, j) = self.lu.at(i, j);
            }
        }
        u
    }

    /// Pivot indices: row `i` of `P * A` is row `pivot()[i]` of `A`.
    pub fn pivot(&self) -> &[usize] {
        &self.pivot
    }

    /// Parity of the permutation, `+1.0` or `-1.0`.
    pub fn pivot_sign(&self) -> f64 {
        self.pivot_sign
    }

    /// The permutation matrix `P` such that `P * A = L * U`.
    pub fn permutation(&self) -> Matrix {
        let n = self.size();
        let mut p = Matrix::square(n);
        for (i, &src) in self.pivot.iter().enumerate() {
            *p.at_mut(i, src) = 1.0;
        }
        p
    }

    /// Determinant of the factored matrix, `0.0` when it is singular.
    pub fn determinant(&self) -> f64 {
        (0..self.size()).fold(self.pivot_sign, |det, k| det * self.lu.at(k, k))
    }

    /// Solve `A * X = b`.
    ///
    /// # Errors
    ///
    /// - [`LinalgError::DimensionMismatch`] if `b.rows()` differs from the order of `A`.
    /// - [`LinalgError::Singular`] if a diagonal entry of `U` is exactly zero.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix, LinalgError> {
        let n = self.size();
        if b.rows() != n {
            return Err(LinalgError::shape_mismatch(
                "lu_solve",
                (n, b.cols()),
                b.shape(),
            ));
        }
        if !self.is_nonsingular() {
            log::debug!("lu solve rejected: {n}x{n} matrix is singular");
            return Err(LinalgError::Singular);
        }

        let nx = b.cols();
        let mut x = b.gather_rows(&self.pivot);

        // L * Y = P * B
        for k in 0..n {
            for i in (k + 1)..n {
                let l = self.lu.at(i, k);
                for j in 0..nx {
                    let v = x.at(k, j);
                    *x.at_mut(i, j) -= v * l;
                }
            }
        }

        // U * X = Y
        for k in (0..n).rev() {
            let d = self.lu.at(k, k);
            for j in 0..nx {
                *x.at_mut(k, j) /= d;
            }
            for i in 0..k {
                let u = self.lu.at(i, k);
                for j in 0..nx {
                    let v = x.at(k, j);
                    *x.at_mut(i, j) -= v * u;
                }
            }
        }

        Ok(x)
    }
}
