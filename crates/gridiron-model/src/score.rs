//! Scoring: predictions and over/under-performance residuals.
//!
//! For every merged row and target:
//! - `predicted = round(intercept + sum(coef_i * x_i), 3)`
//! - `residual = round(observed - predicted, 3)`
//!
//! Positive residuals mean the quarterback beat what their team context predicts.

use crate::formula::{FormulaError, Predict};
use gridiron_data::{MergedRow, Target};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places kept for predictions and residuals.
pub const SCORE_DECIMALS: i32 = 3;

/// Errors raised while scoring.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// A model was supplied for the wrong target
    #[error("model for {found} supplied where a {expected} model is required")]
    WrongTarget {
        /// Target of the slot
        expected: Target,
        /// Target of the supplied model
        found: Target,
    },

    /// The formula could not be evaluated
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

/// Round half away from zero to `decimals` places. Negative zero becomes zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// A merged row with predictions and residuals for both targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    /// Source row
    pub row: MergedRow,
    /// Predicted QBR (3 decimals)
    pub predicted_qbr: f64,
    /// Predicted passer rating (3 decimals)
    pub predicted_rtg: f64,
    /// Observed minus predicted QBR (3 decimals)
    pub qbr_residual: f64,
    /// Observed minus predicted passer rating (3 decimals)
    pub rtg_residual: f64,
}

impl ScoredRow {
    /// Prediction for `target`.
    pub const fn predicted(&self, target: Target) -> f64 {
        match target {
            Target::Qbr => self.predicted_qbr,
            Target::Rtg => self.predicted_rtg,
        }
    }

    /// Residual for `target`.
    pub const fn residual(&self, target: Target) -> f64 {
        match target {
            Target::Qbr => self.qbr_residual,
            Target::Rtg => self.rtg_residual,
        }
    }
}

fn check_target<M: Predict + ?Sized>(model: &M, expected: Target) -> Result<(), ScoreError> {
    let found = model.target();
    if found != expected {
        return Err(ScoreError::WrongTarget { expected, found });
    }
    Ok(())
}

fn predict_and_residual<M: Predict + ?Sized>(
    model: &M,
    row: &MergedRow,
) -> Result<(f64, f64), ScoreError> {
    let predicted = round_to(model.predict(&row.predictors)?, SCORE_DECIMALS);
    let residual = round_to(row.player.observed(model.target()) - predicted, SCORE_DECIMALS);
    Ok((predicted, residual))
}

/// Score one row.
///
/// # Errors
///
/// Returns an error if a model is for the wrong target or is incomplete.
pub fn score_row<Q, R>(row: &MergedRow, qbr: &Q, rtg: &R) -> Result<ScoredRow, ScoreError>
where
    Q: Predict + ?Sized,
    R: Predict + ?Sized,
{
    check_target(qbr, Target::Qbr)?;
    check_target(rtg, Target::Rtg)?;

    let (predicted_qbr, qbr_residual) = predict_and_residual(qbr, row)?;
    let (predicted_rtg, rtg_residual) = predict_and_residual(rtg, row)?;

    Ok(ScoredRow {
        row: row.clone(),
        predicted_qbr,
        predicted_rtg,
        qbr_residual,
        rtg_residual,
    })
}

/// Score every row, preserving order.
///
/// # Errors
///
/// Returns an error if a model is for the wrong target or is incomplete.
pub fn score_rows<Q, R>(rows: &[MergedRow], qbr: &Q, rtg: &R) -> Result<Vec<ScoredRow>, ScoreError>
where
    Q: Predict + ?Sized,
    R: Predict + ?Sized,
{
    check_target(qbr, Target::Qbr)?;
    check_target(rtg, Target::Rtg)?;
    rows.iter().map(|row| score_row(row, qbr, rtg)).collect()
}
