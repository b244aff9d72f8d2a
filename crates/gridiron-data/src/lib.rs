#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridiron-analytics/gridiron/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
mod header;
pub mod numeric;
pub mod paths;
pub mod players;
pub mod records;
pub mod season;
pub mod wide;

pub use error::{DataError, Result};
pub use numeric::{PercentScale, coerce_numeric, parse_year};
pub use paths::{InputPaths, MetricSource, WideTablePaths};
pub use players::{PlayerTable, load_player_table, read_player_table};
pub use records::{
    MergedRow, PlayerSeasonRecord, Predictor, PredictorValues, Target, TeamMetricRecord,
};
pub use season::{load_season_table, read_season_table};
pub use wide::{load_team_metric_table, read_team_metric_table};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
