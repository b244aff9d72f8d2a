//! Small dense linear algebra helpers for the normal equations.
//!
//! The design matrices here are a few hundred rows by six columns, so a
//! Cholesky factorization of `X^T X` is all that is needed. Factorization
//! runs in nalgebra; the rest of the crate stays on ndarray.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1};

/// Column summary used for degeneracy checks and z-scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Whether every value is identical
    pub is_constant: bool,
}

/// Mean, sample standard deviation and constancy of a column.
///
/// Constancy is checked on the raw values rather than the computed variance,
/// which can come out as a tiny nonzero number for identical inputs.
pub fn column_stats(values: ArrayView1<'_, f64>) -> ColumnStats {
    let n = values.len();
    if n == 0 {
        return ColumnStats {
            mean: 0.0,
            std_dev: 0.0,
            is_constant: true,
        };
    }

    let first = values[0];
    let is_constant = values.iter().all(|&v| v == first);
    let mean = values.sum() / n as f64;
    let std_dev = if n > 1 {
        (values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    ColumnStats {
        mean,
        std_dev,
        is_constant,
    }
}

/// Convert an ndarray matrix to a nalgebra matrix.
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Convert an ndarray vector to a nalgebra vector.
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra matrix to an ndarray matrix.
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn(m.shape(), |(i, j)| m[(i, j)])
}

/// Convert a nalgebra vector to an ndarray vector.
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    v.iter().copied().collect()
}

/// Solve the symmetric positive definite system `A x = b` and return `A^-1`.
///
/// Returns `None` when `A` is not positive definite or when a squared pivot
/// of its Cholesky factor falls below `tolerance` relative to the matching
/// diagonal entry of `A`, i.e. a column is (numerically) a linear
/// combination of the preceding ones.
pub fn solve_and_invert(
    a: &Array2<f64>,
    b: &Array1<f64>,
    tolerance: f64,
) -> Option<(Array1<f64>, Array2<f64>)> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let chol = to_dmatrix(a).cholesky()?;
    let l = chol.l();
    for j in 0..n {
        let pivot = l[(j, j)].powi(2);
        if !pivot.is_finite() || pivot <= tolerance * a[[j, j]].abs() {
            return None;
        }
    }

    let solution = chol.solve(&to_dvector(b));
    let inverse = chol.solve(&DMatrix::identity(n, n));
    Some((to_array1(&solution), to_array2(&inverse)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_column_stats() {
        let stats = column_stats(array![1.0, 2.0, 3.0, 4.0, 5.0].view());
        assert_abs_diff_eq!(stats.mean, 3.0);
        assert_abs_diff_eq!(stats.std_dev, 2.5_f64.sqrt(), epsilon = 1e-12);
        assert!(!stats.is_constant);
    }

    #[test]
    fn test_constant_column_detected() {
        let stats = column_stats(array![0.1, 0.1, 0.1].view());
        assert!(stats.is_constant);
    }

    #[test]
    fn test_conversions_roundtrip() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let m = to_dmatrix(&a);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(to_array2(&m), a);

        let v = array![1.0, -2.0, 3.5];
        assert_eq!(to_array1(&to_dvector(&v)), v);
    }

    #[test]
    fn test_solve_and_invert() {
        let a = array![[4.0, 2.0, 0.6], [2.0, 5.0, 1.0], [0.6, 1.0, 3.0]];
        let b = array![1.0, -2.0, 0.5];
        let (x, inverse) = solve_and_invert(&a, &b, 1e-10).unwrap();

        let ax = a.dot(&x);
        for (got, want) in ax.iter().zip(b.iter()) {
            assert_abs_diff_eq!(got, want, epsilon = 1e-12);
        }

        let identity = a.dot(&inverse);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(identity[[i, j]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_two_by_two_solution() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let (x, _) = solve_and_invert(&a, &array![2.0, 1.0], 1e-10).unwrap();
        assert_abs_diff_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_columns_rejected() {
        // Third column is the sum of the first two
        let x = array![[1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 2.0], [2.0, 1.0, 3.0]];
        let xtx = x.t().dot(&x);
        let xty = x.t().dot(&array![1.0, 2.0, 3.0, 4.0]);
        assert!(solve_and_invert(&xtx, &xty, 1e-10).is_none());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        assert!(solve_and_invert(&a, &array![1.0, 2.0, 3.0], 1e-10).is_none());
    }
}
