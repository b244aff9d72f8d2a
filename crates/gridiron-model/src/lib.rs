#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridiron-analytics/gridiron/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod engine;
pub mod formula;
pub mod inference;
pub mod linalg;
pub mod ols;
pub mod score;

// Re-export main types
pub use engine::{FittedModel, FittedModels, RegressionEngine};
pub use formula::{CoefficientSet, FormulaError, LinearFormula, Predict};
pub use ols::{FitError, OlsConfig, OlsEstimator, OlsFit};
pub use score::{SCORE_DECIMALS, ScoreError, ScoredRow, round_to, score_row, score_rows};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
