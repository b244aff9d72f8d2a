//! Augmented player table: observed, predicted and residual values per player-season.

use crate::export::{ExportError, ExportFormat, Exporter, finish_csv, format_float, to_json};
use gridiron_model::ScoredRow;
use serde::{Deserialize, Serialize};

/// Fixed leading columns of the augmented table.
pub const AUGMENTED_COLUMNS: [&str; 9] = [
    "Team",
    "Year",
    "Name",
    "QBR",
    "Predicted_QBR",
    "QBR_over_Pred",
    "RTG",
    "Predicted_RTG",
    "RTG_over_Pred",
];

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedRow {
    /// Team name
    #[serde(rename = "Team")]
    pub team: String,

    /// Season
    #[serde(rename = "Year")]
    pub year: i32,

    /// Quarterback name
    #[serde(rename = "Name")]
    pub name: String,

    /// Observed QBR
    #[serde(rename = "QBR")]
    pub qbr: f64,

    /// Predicted QBR
    #[serde(rename = "Predicted_QBR")]
    pub predicted_qbr: f64,

    /// QBR residual
    #[serde(rename = "QBR_over_Pred")]
    pub qbr_over_pred: f64,

    /// Observed passer rating
    #[serde(rename = "RTG")]
    pub rtg: f64,

    /// Predicted passer rating
    #[serde(rename = "Predicted_RTG")]
    pub predicted_rtg: f64,

    /// Passer rating residual
    #[serde(rename = "RTG_over_Pred")]
    pub rtg_over_pred: f64,

    /// Pass-through identity values, in the order of the table's extra columns
    pub extra: Vec<String>,
}

impl From<&ScoredRow> for AugmentedRow {
    fn from(scored: &ScoredRow) -> Self {
        let player = &scored.row.player;
        Self {
            team: player.team.clone(),
            year: player.year,
            name: player.name.clone(),
            qbr: player.qbr,
            predicted_qbr: scored.predicted_qbr,
            qbr_over_pred: scored.qbr_residual,
            rtg: player.rtg,
            predicted_rtg: scored.predicted_rtg,
            rtg_over_pred: scored.rtg_residual,
            extra: player.extra.clone(),
        }
    }
}

impl AugmentedRow {
    fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.team.clone(),
            self.year.to_string(),
            self.name.clone(),
            format_float(self.qbr),
            format_float(self.predicted_qbr),
            format_float(self.qbr_over_pred),
            format_float(self.rtg),
            format_float(self.predicted_rtg),
            format_float(self.rtg_over_pred),
        ];
        record.extend(self.extra.iter().cloned());
        record
    }
}

/// The player table with predictions and residuals appended.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AugmentedPlayerTable {
    /// Names of the pass-through columns, after the fixed ones
    pub extra_columns: Vec<String>,
    /// Rows in player table order
    pub rows: Vec<AugmentedRow>,
}

impl AugmentedPlayerTable {
    /// Build from scored rows.
    pub fn from_scored(extra_columns: &[String], scored: &[ScoredRow]) -> Self {
        Self {
            extra_columns: extra_columns.to_vec(),
            rows: scored.iter().map(AugmentedRow::from).collect(),
        }
    }

    /// Header row: fixed columns then extras.
    pub fn header(&self) -> Vec<&str> {
        AUGMENTED_COLUMNS
            .iter()
            .copied()
            .chain(self.extra_columns.iter().map(String::as_str))
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Exporter for AugmentedPlayerTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        if let Some(json) = to_json(self, format) {
            return json;
        }

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(self.header())?;
        for row in &self.rows {
            wtr.write_record(row.to_record())?;
        }
        finish_csv(wtr)
    }
}
