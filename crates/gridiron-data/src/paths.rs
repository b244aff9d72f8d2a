//! Input path configuration.
//!
//! All inputs are named explicitly so a run never depends on the working
//! directory.

use crate::error::Result;
use crate::numeric::PercentScale;
use crate::players::{PlayerTable, load_player_table};
use crate::records::{Predictor, TeamMetricRecord};
use crate::season::load_season_table;
use crate::wide::load_team_metric_table;
use std::path::{Path, PathBuf};
use tracing::info;

/// Conventional file name of the defensive line win rate table.
pub const DLINE_FILE: &str = "DLINE (Overall Win Rate).csv";
/// Conventional file name of the offensive line win rate table.
pub const OLINE_FILE: &str = "OlINE (Overall Win Rate).csv";
/// Conventional file name of the defense EPA/play table.
pub const DEF_EPA_FILE: &str = "Overall Defense (EPA_Play).csv";
/// Conventional file name of the receiving value table.
pub const RECEIVING_FILE: &str = "Receiving.csv";
/// Conventional file name of the rushing value table.
pub const RUSHING_FILE: &str = "Rushing.csv";
/// Conventional file name of the quarterback table.
pub const PLAYERS_FILE: &str = "QB.csv";

/// Paths of the five wide team tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideTablePaths {
    /// Defensive line win rate by season
    pub dline_win_rate: PathBuf,
    /// Offensive line win rate by season
    pub oline_win_rate: PathBuf,
    /// Defense EPA per play by season
    pub def_epa_play: PathBuf,
    /// Receiving value by season
    pub receiving_value: PathBuf,
    /// Rushing value by season
    pub rushing_value: PathBuf,
}

impl WideTablePaths {
    /// Conventional file names inside `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            dline_win_rate: dir.join(DLINE_FILE),
            oline_win_rate: dir.join(OLINE_FILE),
            def_epa_play: dir.join(DEF_EPA_FILE),
            receiving_value: dir.join(RECEIVING_FILE),
            rushing_value: dir.join(RUSHING_FILE),
        }
    }

    /// Path of the table holding `metric`.
    pub fn path(&self, metric: Predictor) -> &Path {
        match metric {
            Predictor::DlineWinRate => &self.dline_win_rate,
            Predictor::OlineWinRate => &self.oline_win_rate,
            Predictor::DefEpaPlay => &self.def_epa_play,
            Predictor::ReceivingValue => &self.receiving_value,
            Predictor::RushingValue => &self.rushing_value,
        }
    }
}

/// Where the team metrics come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSource {
    /// Five wide multi-season tables
    Wide(WideTablePaths),
    /// One single-season snapshot table
    Season {
        /// Snapshot file
        path: PathBuf,
        /// Season the snapshot describes
        year: i32,
    },
}

impl MetricSource {
    /// Load every team metric record from this source.
    ///
    /// # Errors
    ///
    /// Returns the first load error; no partial result is produced.
    pub fn load(&self, scale: PercentScale) -> Result<Vec<TeamMetricRecord>> {
        match self {
            Self::Wide(paths) => {
                let mut records = Vec::new();
                for metric in Predictor::ALL {
                    records.extend(load_team_metric_table(paths.path(metric), metric, scale)?);
                }
                Ok(records)
            }
            Self::Season { path, year } => load_season_table(path, *year, scale),
        }
    }

    /// Season of a snapshot source; `None` for multi-season tables.
    pub const fn season(&self) -> Option<i32> {
        match self {
            Self::Wide(_) => None,
            Self::Season { year, .. } => Some(*year),
        }
    }
}

/// Full set of pipeline inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    /// Team metric tables
    pub metrics: MetricSource,
    /// Quarterback table
    pub players: PathBuf,
}

impl InputPaths {
    /// Conventional layout of a training data directory.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            metrics: MetricSource::Wide(WideTablePaths::from_dir(dir)),
            players: dir.join(PLAYERS_FILE),
        }
    }

    /// Single-season snapshot plus a quarterback table.
    pub fn season(path: PathBuf, year: i32, players: PathBuf) -> Self {
        Self {
            metrics: MetricSource::Season { path, year },
            players,
        }
    }

    /// Read every input.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is missing, unreadable or malformed.
    pub fn load(&self, scale: PercentScale) -> Result<(Vec<TeamMetricRecord>, PlayerTable)> {
        let metrics = self.metrics.load(scale)?;
        let players = load_player_table(&self.players, self.metrics.season())?;
        info!(
            metric_records = metrics.len(),
            player_seasons = players.len(),
            %scale,
            "loaded inputs"
        );
        Ok((metrics, players))
    }
}
