#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridiron-analytics/gridiron/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
mod coefficients;
pub mod export;
pub mod formulas;
pub mod players;
pub mod summary;

pub use analysis::{IMPACT_COLUMNS, IMPACT_DECIMALS, ImpactRow, ImpactTable};
pub use export::{ExportError, ExportFormat, Exporter};
pub use formulas::{render_formula_block, render_model_formulas};
pub use players::{AUGMENTED_COLUMNS, AugmentedPlayerTable, AugmentedRow};
pub use summary::PerformerSummary;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
