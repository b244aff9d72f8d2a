//! Regression engine: one OLS model per target over merged player-seasons.
//!
//! Each target gets two fits on the same rows:
//! - a raw fit, giving the published formula, p-values and R²
//! - a fit on z-scored predictors and target, whose slopes are the
//!   standardized betas (comparable across predictors in different units)

use crate::formula::{CoefficientSet, LinearFormula, Predict};
use crate::linalg::column_stats;
use crate::ols::{FitError, OlsConfig, OlsEstimator, OlsFit};
use gridiron_data::{MergedRow, PercentScale, Predictor, Target};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// A fitted model for one target. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Target, intercept and raw coefficients
    pub formula: LinearFormula,
    /// Two-sided p-value per predictor
    pub p_values: BTreeMap<Predictor, f64>,
    /// Coefficient per predictor on z-scored data
    pub standardized_coefficients: BTreeMap<Predictor, f64>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Adjusted R²
    pub adjusted_r_squared: f64,
    /// Rows used for the fit
    pub n_observations: usize,
}

impl FittedModel {
    /// Intercept of the raw fit.
    pub const fn intercept(&self) -> f64 {
        self.formula.intercept
    }

    /// Raw coefficient of a predictor.
    pub fn coefficient(&self, predictor: Predictor) -> f64 {
        self.formula.coefficient(predictor).unwrap_or(f64::NAN)
    }

    /// P-value of a predictor.
    pub fn p_value(&self, predictor: Predictor) -> f64 {
        self.p_values.get(&predictor).copied().unwrap_or(f64::NAN)
    }

    /// Standardized beta of a predictor.
    pub fn standardized_coefficient(&self, predictor: Predictor) -> f64 {
        self.standardized_coefficients
            .get(&predictor)
            .copied()
            .unwrap_or(f64::NAN)
    }
}

impl Predict for FittedModel {
    fn formula(&self) -> &LinearFormula {
        &self.formula
    }
}

/// The QBR and RTG models of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModels {
    /// QBR model
    pub qbr: FittedModel,
    /// Passer rating model
    pub rtg: FittedModel,
}

impl FittedModels {
    /// Model for `target`.
    pub const fn get(&self, target: Target) -> &FittedModel {
        match target {
            Target::Qbr => &self.qbr,
            Target::Rtg => &self.rtg,
        }
    }

    /// Export both formulas for reuse without refitting.
    pub fn to_coefficient_set(&self, percent_scale: PercentScale) -> CoefficientSet {
        CoefficientSet::new(
            percent_scale,
            self.qbr.formula.clone(),
            self.rtg.formula.clone(),
        )
    }
}

/// Fits quarterback models from merged rows.
#[derive(Debug, Default)]
pub struct RegressionEngine {
    estimator: OlsEstimator,
}

impl RegressionEngine {
    /// Create an engine with a custom OLS configuration.
    pub const fn new(config: OlsConfig) -> Self {
        Self {
            estimator: OlsEstimator::new(config),
        }
    }

    /// Fit both targets.
    ///
    /// # Errors
    ///
    /// Returns the first degeneracy found; no partial result is produced.
    pub fn fit_all(&self, rows: &[MergedRow]) -> Result<FittedModels, FitError> {
        Ok(FittedModels {
            qbr: self.fit(rows, Target::Qbr)?,
            rtg: self.fit(rows, Target::Rtg)?,
        })
    }

    /// Fit one target, raw and standardized.
    ///
    /// # Errors
    ///
    /// Returns an error when the fit is ill-defined (too few rows, a constant
    /// predictor or target, collinear predictors).
    pub fn fit(&self, rows: &[MergedRow], target: Target) -> Result<FittedModel, FitError> {
        let x = predictor_matrix(rows);
        let y = target_vector(rows, target);
        let names = column_names(target);

        let raw = self.estimator.fit(&x, &y, &names)?;
        let standardized = self.fit_standardized(&x, &y, &names)?;

        let slopes = raw.slopes();
        let p_values = raw.slope_p_values();
        let betas = standardized.slopes();

        let by_predictor = |values: &Array1<f64>| -> BTreeMap<Predictor, f64> {
            Predictor::ALL
                .iter()
                .map(|&p| (p, values[p.index()]))
                .collect()
        };

        let mut coefficients = [0.0; Predictor::COUNT];
        for p in Predictor::ALL {
            coefficients[p.index()] = slopes[p.index()];
        }

        info!(
            %target,
            n = raw.n_observations,
            r_squared = raw.r_squared,
            adjusted_r_squared = raw.adjusted_r_squared,
            "fitted model"
        );

        Ok(FittedModel {
            formula: LinearFormula::new(target, raw.intercept(), coefficients),
            p_values: by_predictor(&p_values),
            standardized_coefficients: by_predictor(&betas),
            r_squared: raw.r_squared,
            adjusted_r_squared: raw.adjusted_r_squared,
            n_observations: raw.n_observations,
        })
    }

    /// Refit on z-scored columns (sample standard deviation).
    fn fit_standardized(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        names: &[&str],
    ) -> Result<OlsFit, FitError> {
        let mut x_std = x.clone();
        for (j, mut column) in x_std.axis_iter_mut(Axis(1)).enumerate() {
            let stats = column_stats(column.view());
            if stats.is_constant || stats.std_dev == 0.0 {
                return Err(FitError::ZeroVariance(names[j].to_string()));
            }
            column.mapv_inplace(|v| (v - stats.mean) / stats.std_dev);
        }

        let y_stats = column_stats(y.view());
        if y_stats.is_constant || y_stats.std_dev == 0.0 {
            return Err(FitError::ZeroVariance(names[names.len() - 1].to_string()));
        }
        let y_std = y.mapv(|v| (v - y_stats.mean) / y_stats.std_dev);

        self.estimator.fit(&x_std, &y_std, names)
    }
}

/// Predictor matrix (n x 5) in [`Predictor::ALL`] column order.
pub fn predictor_matrix(rows: &[MergedRow]) -> Array2<f64> {
    let mut x = Array2::<f64>::zeros((rows.len(), Predictor::COUNT));
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.predictors.as_array().iter().enumerate() {
            x[[i, j]] = *value;
        }
    }
    x
}

/// Observed values of `target`.
pub fn target_vector(rows: &[MergedRow], target: Target) -> Array1<f64> {
    rows.iter().map(|row| row.player.observed(target)).collect()
}

fn column_names(target: Target) -> Vec<&'static str> {
    Predictor::ALL
        .iter()
        .map(Predictor::column_name)
        .chain(std::iter::once(target.column_name()))
        .collect()
}
