//! Record types flowing through the pipeline.
//!
//! Everything here is plain value data: loaders create records, the merger
//! combines them into [`MergedRow`]s, and nothing mutates them afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Team-context predictor used by both quarterback models.
///
/// Variant order is the column order of every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Predictor {
    /// Defensive line pass-rush win rate
    #[serde(rename = "DLINE_WinRate")]
    DlineWinRate,
    /// Offensive line pass-block win rate
    #[serde(rename = "OLINE_WinRate")]
    OlineWinRate,
    /// Team defense EPA per play
    #[serde(rename = "DEF_EPA_Play")]
    DefEpaPlay,
    /// Receiving corps value
    #[serde(rename = "Receiving_Value")]
    ReceivingValue,
    /// Rushing value (EPA per rush)
    #[serde(rename = "Rushing_Value")]
    RushingValue,
}

impl Predictor {
    /// Number of predictors.
    pub const COUNT: usize = 5;

    /// All predictors in report order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::DlineWinRate,
        Self::OlineWinRate,
        Self::DefEpaPlay,
        Self::ReceivingValue,
        Self::RushingValue,
    ];

    /// Canonical column name.
    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::DlineWinRate => "DLINE_WinRate",
            Self::OlineWinRate => "OLINE_WinRate",
            Self::DefEpaPlay => "DEF_EPA_Play",
            Self::ReceivingValue => "Receiving_Value",
            Self::RushingValue => "Rushing_Value",
        }
    }

    /// Header used for this metric in single-season snapshot tables.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::DlineWinRate => "Dline Win Rate",
            Self::OlineWinRate => "Oline Win Rate",
            Self::DefEpaPlay => "Overall Defense",
            Self::ReceivingValue => "Receiving",
            Self::RushingValue => "EPA/Rush",
        }
    }

    /// Position in [`Predictor::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            Self::DlineWinRate => 0,
            Self::OlineWinRate => 1,
            Self::DefEpaPlay => 2,
            Self::ReceivingValue => 3,
            Self::RushingValue => 4,
        }
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Quarterback rating metric being modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Total quarterback rating (skill index)
    #[serde(rename = "QBR")]
    Qbr,
    /// Passer rating (rating index)
    #[serde(rename = "RTG")]
    Rtg,
}

impl Target {
    /// Both targets in report order.
    pub const ALL: [Self; 2] = [Self::Qbr, Self::Rtg];

    /// Column name in the player table.
    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::Qbr => "QBR",
            Self::Rtg => "RTG",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One (team, season, metric) value from a team table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMetricRecord {
    /// Team name as written in the source table.
    pub team: String,

    /// Season.
    pub year: i32,

    /// Which metric this value belongs to.
    pub metric: Predictor,

    /// Coerced value; `None` when the cell did not parse.
    pub value: Option<f64>,
}

impl TeamMetricRecord {
    /// Create a new team metric record.
    pub const fn new(team: String, year: i32, metric: Predictor, value: Option<f64>) -> Self {
        Self {
            team,
            year,
            metric,
            value,
        }
    }
}

/// One quarterback season from the player table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRecord {
    /// Team the quarterback played for.
    pub team: String,

    /// Season.
    pub year: i32,

    /// Player name.
    pub name: String,

    /// Observed QBR.
    pub qbr: f64,

    /// Observed passer rating.
    pub rtg: f64,

    /// Pass-through identity columns, aligned with [`crate::PlayerTable::extra_columns`].
    pub extra: Vec<String>,
}

impl PlayerSeasonRecord {
    /// Create a record without pass-through columns.
    pub fn new(team: &str, year: i32, name: &str, qbr: f64, rtg: f64) -> Self {
        Self {
            team: team.to_string(),
            year,
            name: name.to_string(),
            qbr,
            rtg,
            extra: Vec::new(),
        }
    }

    /// Observed value of a target metric.
    pub const fn observed(&self, target: Target) -> f64 {
        match target {
            Target::Qbr => self.qbr,
            Target::Rtg => self.rtg,
        }
    }
}

/// The five predictor values of one player-season, in [`Predictor::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictorValues([f64; Predictor::COUNT]);

impl PredictorValues {
    /// Wrap values given in [`Predictor::ALL`] order.
    pub const fn new(values: [f64; Predictor::COUNT]) -> Self {
        Self(values)
    }

    /// Value of one predictor.
    pub const fn get(&self, predictor: Predictor) -> f64 {
        self.0[predictor.index()]
    }

    /// All values in [`Predictor::ALL`] order.
    pub const fn as_array(&self) -> &[f64; Predictor::COUNT] {
        &self.0
    }
}

/// A player-season joined with a complete set of team predictors.
///
/// Rows with any missing predictor never become a `MergedRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    /// Source player-season.
    pub player: PlayerSeasonRecord,

    /// Team context for that season.
    pub predictors: PredictorValues,
}

impl MergedRow {
    /// Create a merged row.
    pub const fn new(player: PlayerSeasonRecord, predictors: PredictorValues) -> Self {
        Self { player, predictors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_order_matches_index() {
        for (i, predictor) in Predictor::ALL.iter().enumerate() {
            assert_eq!(predictor.index(), i);
        }
        let mut sorted = Predictor::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Predictor::ALL.to_vec());
    }

    #[test]
    fn test_predictor_values_lookup() {
        let values = PredictorValues::new([55.0, 60.0, -0.05, 12.0, 0.02]);
        assert_eq!(values.get(Predictor::OlineWinRate), 60.0);
        assert_eq!(values.get(Predictor::RushingValue), 0.02);
    }

    #[test]
    fn test_observed_by_target() {
        let player = PlayerSeasonRecord::new("KC", 2023, "P. Mahomes", 66.1, 92.6);
        assert_eq!(player.observed(Target::Qbr), 66.1);
        assert_eq!(player.observed(Target::Rtg), 92.6);
    }
}
