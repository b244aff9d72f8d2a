//! Linear formulas and published coefficient sets.
//!
//! A [`LinearFormula`] is everything the scorer needs:
//! `target = intercept + sum(coefficient_i * predictor_i)`. Freshly fitted
//! models expose one, and a [`CoefficientSet`] loaded from JSON carries one per
//! target. Switching between refitting and applying a published formula is a
//! configuration choice.

use gridiron_data::{PercentScale, Predictor, PredictorValues, Target};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised by formulas and coefficient files.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// A formula lacks a coefficient for one of the five predictors
    #[error("{target} formula has no coefficient for {predictor}")]
    MissingCoefficient {
        /// Formula target
        target: Target,
        /// Missing predictor
        predictor: Predictor,
    },

    /// A formula contains NaN or infinity
    #[error("{0} formula contains a non-finite value")]
    NonFinite(Target),

    /// A formula sits in the slot of the other target
    #[error("expected a {expected} formula, found a {found} formula")]
    TargetMismatch {
        /// Target of the slot
        expected: Target,
        /// Target the formula declares
        found: Target,
    },

    /// Coefficient file unreadable or unwritable
    #[error("coefficient file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Coefficient file is not valid JSON for a coefficient set
    #[error("coefficient file {path}: {source}")]
    Json {
        /// File path
        path: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

/// `target = intercept + sum(coefficient_i * predictor_i)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFormula {
    /// Metric this formula predicts
    pub target: Target,
    /// Constant term
    pub intercept: f64,
    /// Coefficient per predictor
    pub coefficients: BTreeMap<Predictor, f64>,
}

impl LinearFormula {
    /// Build a formula from coefficients given in [`Predictor::ALL`] order.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridiron_data::{Predictor, PredictorValues, Target};
    /// use gridiron_model::LinearFormula;
    ///
    /// let formula = LinearFormula::new(Target::Qbr, 10.0, [1.0, 0.5, -2.0, 0.0, 4.0]);
    /// let values = PredictorValues::new([50.0, 60.0, 0.5, 3.0, 0.25]);
    ///
    /// // 10 + 50 + 30 - 1 + 0 + 1
    /// assert_eq!(formula.evaluate(&values).unwrap(), 90.0);
    /// assert_eq!(formula.coefficient(Predictor::DefEpaPlay), Some(-2.0));
    /// ```
    pub fn new(target: Target, intercept: f64, coefficients: [f64; Predictor::COUNT]) -> Self {
        Self {
            target,
            intercept,
            coefficients: Predictor::ALL.into_iter().zip(coefficients).collect(),
        }
    }

    /// Coefficient of one predictor.
    pub fn coefficient(&self, predictor: Predictor) -> Option<f64> {
        self.coefficients.get(&predictor).copied()
    }

    /// Check that every predictor has a finite coefficient.
    ///
    /// # Errors
    ///
    /// Returns the first missing or non-finite coefficient.
    pub fn validate(&self) -> Result<(), FormulaError> {
        if !self.intercept.is_finite() {
            return Err(FormulaError::NonFinite(self.target));
        }
        for predictor in Predictor::ALL {
            match self.coefficient(predictor) {
                None => {
                    return Err(FormulaError::MissingCoefficient {
                        target: self.target,
                        predictor,
                    });
                }
                Some(c) if !c.is_finite() => return Err(FormulaError::NonFinite(self.target)),
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Unrounded prediction for one row.
    ///
    /// # Errors
    ///
    /// Returns an error if a predictor has no coefficient.
    pub fn evaluate(&self, values: &PredictorValues) -> Result<f64, FormulaError> {
        Predictor::ALL.iter().try_fold(self.intercept, |acc, &predictor| {
            let coefficient =
                self.coefficient(predictor)
                    .ok_or(FormulaError::MissingCoefficient {
                        target: self.target,
                        predictor,
                    })?;
            Ok(acc + coefficient * values.get(predictor))
        })
    }
}

/// Anything that can predict a target from predictor values.
pub trait Predict {
    /// The formula used for prediction.
    fn formula(&self) -> &LinearFormula;

    /// Target this model predicts.
    fn target(&self) -> Target {
        self.formula().target
    }

    /// Unrounded prediction for one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the formula is incomplete.
    fn predict(&self, values: &PredictorValues) -> Result<f64, FormulaError> {
        self.formula().evaluate(values)
    }
}

impl Predict for LinearFormula {
    fn formula(&self) -> &LinearFormula {
        self
    }
}

/// Published QBR and RTG formulas, reusable across runs without refitting.
///
/// ```json
/// {
///   "percent_scale": "as-is",
///   "qbr": { "target": "QBR", "intercept": 19.9305, "coefficients": { "DLINE_WinRate": 0.1557, ... } },
///   "rtg": { "target": "RTG", "intercept": 56.1008, "coefficients": { ... } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    /// Percent scale the win-rate coefficients were fitted on
    pub percent_scale: PercentScale,
    /// QBR formula
    pub qbr: LinearFormula,
    /// Passer rating formula
    pub rtg: LinearFormula,
}

impl CoefficientSet {
    /// Create a coefficient set.
    pub const fn new(percent_scale: PercentScale, qbr: LinearFormula, rtg: LinearFormula) -> Self {
        Self {
            percent_scale,
            qbr,
            rtg,
        }
    }

    /// Formula for `target`.
    pub const fn formula(&self, target: Target) -> &LinearFormula {
        match target {
            Target::Qbr => &self.qbr,
            Target::Rtg => &self.rtg,
        }
    }

    /// Check both formulas are complete and sit in the right slots.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), FormulaError> {
        for target in Target::ALL {
            let formula = self.formula(target);
            if formula.target != target {
                return Err(FormulaError::TargetMismatch {
                    expected: target,
                    found: formula.target,
                });
            }
            formula.validate()?;
        }
        Ok(())
    }

    /// Parse and validate a coefficient set from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the set is invalid.
    pub fn from_json_str(json: &str, source: &str) -> Result<Self, FormulaError> {
        let set: Self = serde_json::from_str(json).map_err(|e| FormulaError::Json {
            path: source.to_string(),
            source: e,
        })?;
        set.validate()?;
        Ok(set)
    }

    /// Load and validate a coefficient file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, FormulaError> {
        let source = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|e| FormulaError::Io {
            path: source.clone(),
            source: e,
        })?;
        Self::from_json_str(&json, &source)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, FormulaError> {
        serde_json::to_string_pretty(self).map_err(|e| FormulaError::Json {
            path: String::new(),
            source: e,
        })
    }
}
