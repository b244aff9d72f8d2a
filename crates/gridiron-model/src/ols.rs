//! Ordinary least squares with an intercept.
//!
//! Solves the normal equations `(X^T X) b = X^T y` where `X` is the predictor
//! matrix with a leading column of ones:
//!
//! - `b = (X^T X)^-1 X^T y`
//! - `se_j = sqrt(s^2 * [(X^T X)^-1]_jj)`, `s^2 = SSR / (n - p)`
//! - `R^2 = 1 - SSR / SST`, `adj R^2 = 1 - (1 - R^2) (n - 1) / (n - p)`
//!
//! with `p` the number of estimated parameters including the intercept.

use crate::inference::two_sided_p_value;
use crate::linalg::{column_stats, solve_and_invert};
use ndarray::{Array1, Array2, Axis, concatenate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that make a fit ill-defined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Too few observations to estimate the model and its standard errors
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// A predictor or the target takes a single value across all rows
    #[error("Column '{0}' has zero variance")]
    ZeroVariance(String),

    /// A predictor or the target contains NaN or infinity
    #[error("Column '{0}' contains non-finite values")]
    NonFinite(String),

    /// Predictors are perfectly collinear
    #[error("Design matrix is singular (perfectly collinear predictors)")]
    Singular,

    /// Shapes of the inputs disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },
}

/// Configuration for the OLS estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OlsConfig {
    /// Relative pivot below which `X^T X` is treated as singular
    pub singular_tolerance: f64,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: 1e-10,
        }
    }
}

/// Result of an OLS fit.
///
/// Parameter vectors hold the intercept at index 0 followed by one entry per
/// predictor column.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Estimated parameters
    pub params: Array1<f64>,
    /// Standard errors of the parameters
    pub std_errors: Array1<f64>,
    /// Two-sided p-values of the parameters
    pub p_values: Array1<f64>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// R² adjusted for the number of predictors
    pub adjusted_r_squared: f64,
    /// Number of observations
    pub n_observations: usize,
    /// Residual degrees of freedom (n - p)
    pub df_residual: usize,
}

impl OlsFit {
    /// Intercept estimate.
    pub fn intercept(&self) -> f64 {
        self.params[0]
    }

    /// Slope estimates, one per predictor column.
    pub fn slopes(&self) -> Array1<f64> {
        self.params.slice(ndarray::s![1..]).to_owned()
    }

    /// Slope p-values, one per predictor column.
    pub fn slope_p_values(&self) -> Array1<f64> {
        self.p_values.slice(ndarray::s![1..]).to_owned()
    }
}

/// OLS estimator
#[derive(Debug, Default)]
pub struct OlsEstimator {
    config: OlsConfig,
}

impl OlsEstimator {
    /// Create a new estimator
    pub const fn new(config: OlsConfig) -> Self {
        Self { config }
    }

    /// Fit `y` on `predictors` plus an intercept.
    ///
    /// # Arguments
    /// * `predictors` - Predictor matrix (n x k), without an intercept column
    /// * `y` - Target vector (n)
    /// * `names` - Predictor names (k) followed by the target name, for errors
    ///
    /// # Errors
    /// Returns an error when the fit is ill-defined: fewer than `k + 2` rows
    /// (no residual degrees of freedom), a constant or non-finite column, or
    /// collinear predictors.
    pub fn fit(
        &self,
        predictors: &Array2<f64>,
        y: &Array1<f64>,
        names: &[&str],
    ) -> Result<OlsFit, FitError> {
        let (n, k) = predictors.dim();
        if y.len() != n {
            return Err(FitError::DimensionMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        if names.len() != k + 1 {
            return Err(FitError::DimensionMismatch {
                expected: k + 1,
                actual: names.len(),
            });
        }

        let p = k + 1;
        if n < p + 1 {
            return Err(FitError::InsufficientData {
                required: p + 1,
                actual: n,
            });
        }

        for (j, column) in predictors.axis_iter(Axis(1)).enumerate() {
            check_column(column, names[j])?;
        }
        check_column(y.view(), names[k])?;

        let ones = Array2::<f64>::ones((n, 1));
        let x = concatenate![Axis(1), ones, predictors.view()];

        let xtx = x.t().dot(&x);
        let xty = x.t().dot(y);
        let (params, xtx_inv) =
            solve_and_invert(&xtx, &xty, self.config.singular_tolerance).ok_or(FitError::Singular)?;

        let residuals = y - &x.dot(&params);
        let ssr = residuals.dot(&residuals);
        let y_mean = y.sum() / n as f64;
        let sst = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>();

        let df_residual = n - p;
        let r_squared = 1.0 - ssr / sst;
        let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_residual as f64;

        let sigma2 = ssr / df_residual as f64;
        let std_errors = Array1::from_iter((0..p).map(|j| (sigma2 * xtx_inv[[j, j]]).max(0.0).sqrt()));
        let p_values = Array1::from_iter(params.iter().zip(std_errors.iter()).map(|(&b, &se)| {
            if se == 0.0 {
                if b == 0.0 { 1.0 } else { 0.0 }
            } else {
                two_sided_p_value(b / se, df_residual as f64).unwrap_or(1.0)
            }
        }));

        Ok(OlsFit {
            params,
            std_errors,
            p_values,
            r_squared,
            adjusted_r_squared,
            n_observations: n,
            df_residual,
        })
    }
}

fn check_column(column: ndarray::ArrayView1<'_, f64>, name: &str) -> Result<(), FitError> {
    if column.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite(name.to_string()));
    }
    if column_stats(column).is_constant {
        return Err(FitError::ZeroVariance(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    const NAMES: [&str; 3] = ["x1", "x2", "y"];

    #[test]
    fn test_exact_fit_recovers_coefficients() {
        let x = array![
            [1.0, 2.0],
            [2.0, 1.0],
            [3.0, 5.0],
            [4.0, 3.0],
            [5.0, 8.0],
            [6.0, 2.0]
        ];
        let y = x.map_axis(Axis(1), |row| 1.5 + 2.0 * row[0] - 0.5 * row[1]);

        let fit = OlsEstimator::default().fit(&x, &y, &NAMES).unwrap();
        assert_relative_eq!(fit.intercept(), 1.5, epsilon = 1e-9);
        assert_relative_eq!(fit.params[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.params[2], -0.5, epsilon = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(fit.df_residual, 3);
    }

    #[test]
    fn test_simple_regression_textbook_values() {
        // y = 0.3 + 0.9 x with residuals [0.1, -0.2, 0.0, 0.2, -0.1]
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.3, 1.9, 3.0, 4.1, 4.7];

        let fit = OlsEstimator::default()
            .fit(&x, &y, &["x", "y"])
            .unwrap();

        // Sxx = 10, Sxy = 9.0, slope = 0.9; intercept = 3.0 - 0.9 * 3 = 0.3
        assert_relative_eq!(fit.params[1], 0.9, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept(), 0.3, epsilon = 1e-12);

        // SSR = 0.10, SST = 8.2
        assert_relative_eq!(fit.r_squared, 1.0 - 0.1 / 8.2, epsilon = 1e-12);
        assert_relative_eq!(
            fit.adjusted_r_squared,
            1.0 - (0.1 / 8.2) * 4.0 / 3.0,
            epsilon = 1e-12
        );

        // se(slope) = sqrt(s^2 / Sxx) with s^2 = 0.10 / 3
        let se_slope = (0.1_f64 / 3.0 / 10.0).sqrt();
        assert_relative_eq!(fit.std_errors[1], se_slope, epsilon = 1e-12);
        assert!(fit.p_values[1] < 1e-3);
        assert!(fit.p_values.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_insufficient_rows() {
        // k = 2 predictors needs at least 4 rows
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0]];
        let y = array![1.0, 2.0, 3.0];
        let err = OlsEstimator::default().fit(&x, &y, &NAMES).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                required: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_zero_variance_predictor() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0], [4.0, 7.0], [5.0, 7.0]];
        let y = array![1.0, 2.0, 2.5, 4.0, 5.5];
        let err = OlsEstimator::default().fit(&x, &y, &NAMES).unwrap_err();
        assert_eq!(err, FitError::ZeroVariance("x2".to_string()));
    }

    #[test]
    fn test_zero_variance_target() {
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0], [4.0, 3.0], [5.0, 8.0]];
        let y = array![3.0, 3.0, 3.0, 3.0, 3.0];
        let err = OlsEstimator::default().fit(&x, &y, &NAMES).unwrap_err();
        assert_eq!(err, FitError::ZeroVariance("y".to_string()));
    }

    #[test]
    fn test_collinear_predictors() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0], [5.0, 10.0]];
        let y = array![1.0, 2.0, 2.5, 4.0, 5.5];
        let err = OlsEstimator::default().fit(&x, &y, &NAMES).unwrap_err();
        assert_eq!(err, FitError::Singular);
    }

    #[test]
    fn test_non_finite_input() {
        let x = array![[1.0, 2.0], [2.0, f64::NAN], [3.0, 5.0], [4.0, 3.0], [5.0, 8.0]];
        let y = array![1.0, 2.0, 2.5, 4.0, 5.5];
        let err = OlsEstimator::default().fit(&x, &y, &NAMES).unwrap_err();
        assert_eq!(err, FitError::NonFinite("x2".to_string()));
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = array![[1.0, 2.0], [2.0, 1.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            OlsEstimator::default().fit(&x, &y, &NAMES),
            Err(FitError::DimensionMismatch { .. })
        ));
    }
}
