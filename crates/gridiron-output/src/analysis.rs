//! Variable impact table: raw coefficient, p-value and standardized beta per predictor.

use crate::export::{ExportError, ExportFormat, Exporter, finish_csv, format_float, to_json};
use gridiron_data::{Predictor, Target};
use gridiron_model::{FittedModel, FittedModels, round_to};
use serde::{Deserialize, Serialize};

/// Decimal places kept in the impact table.
pub const IMPACT_DECIMALS: i32 = 4;

/// Columns of the impact table.
pub const IMPACT_COLUMNS: [&str; 7] = [
    "Variable",
    "Impact_on_QBR",
    "P_value_QBR",
    "Std_Beta_QBR",
    "Impact_on_RTG",
    "P_value_RTG",
    "Std_Beta_RTG",
];

/// One predictor's effect on both targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRow {
    /// Predictor column name
    #[serde(rename = "Variable")]
    pub variable: String,

    /// Raw QBR coefficient
    #[serde(rename = "Impact_on_QBR")]
    pub impact_on_qbr: f64,

    /// QBR coefficient p-value
    #[serde(rename = "P_value_QBR")]
    pub p_value_qbr: f64,

    /// QBR standardized beta
    #[serde(rename = "Std_Beta_QBR")]
    pub std_beta_qbr: f64,

    /// Raw RTG coefficient
    #[serde(rename = "Impact_on_RTG")]
    pub impact_on_rtg: f64,

    /// RTG coefficient p-value
    #[serde(rename = "P_value_RTG")]
    pub p_value_rtg: f64,

    /// RTG standardized beta
    #[serde(rename = "Std_Beta_RTG")]
    pub std_beta_rtg: f64,
}

impl ImpactRow {
    fn new(predictor: Predictor, qbr: &FittedModel, rtg: &FittedModel) -> Self {
        let r = |v: f64| round_to(v, IMPACT_DECIMALS);
        Self {
            variable: predictor.column_name().to_string(),
            impact_on_qbr: r(qbr.coefficient(predictor)),
            p_value_qbr: r(qbr.p_value(predictor)),
            std_beta_qbr: r(qbr.standardized_coefficient(predictor)),
            impact_on_rtg: r(rtg.coefficient(predictor)),
            p_value_rtg: r(rtg.p_value(predictor)),
            std_beta_rtg: r(rtg.standardized_coefficient(predictor)),
        }
    }

    fn to_record(&self) -> [String; 7] {
        [
            self.variable.clone(),
            format_float(self.impact_on_qbr),
            format_float(self.p_value_qbr),
            format_float(self.std_beta_qbr),
            format_float(self.impact_on_rtg),
            format_float(self.p_value_rtg),
            format_float(self.std_beta_rtg),
        ]
    }
}

/// One row per predictor, in the fixed predictor order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactTable {
    /// Table rows
    pub rows: Vec<ImpactRow>,
}

impl ImpactTable {
    /// Build the table from both fitted models.
    pub fn from_models(models: &FittedModels) -> Self {
        let qbr = models.get(Target::Qbr);
        let rtg = models.get(Target::Rtg);
        Self {
            rows: Predictor::ALL
                .iter()
                .map(|&p| ImpactRow::new(p, qbr, rtg))
                .collect(),
        }
    }
}

impl Exporter for ImpactTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        if let Some(json) = to_json(&self.rows, format) {
            return json;
        }

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(IMPACT_COLUMNS)?;
        for row in &self.rows {
            wtr.write_record(row.to_record())?;
        }
        finish_csv(wtr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_model::LinearFormula;
    use std::collections::BTreeMap;

    fn model(target: Target, offset: f64) -> FittedModel {
        let per_predictor = |base: f64| -> BTreeMap<Predictor, f64> {
            Predictor::ALL
                .iter()
                .map(|&p| (p, base + p.index() as f64 / 10.0))
                .collect()
        };
        FittedModel {
            formula: LinearFormula::new(target, 20.0, [0.15571, 0.30969, -2.48751, 0.29186, 61.32954]),
            p_values: per_predictor(0.012_34 + offset),
            standardized_coefficients: per_predictor(0.5 + offset),
            r_squared: 0.5,
            adjusted_r_squared: 0.45,
            n_observations: 100,
        }
    }

    #[test]
    fn test_one_row_per_predictor_rounded() {
        let models = FittedModels {
            qbr: model(Target::Qbr, 0.0),
            rtg: model(Target::Rtg, 0.001),
        };
        let table = ImpactTable::from_models(&models);

        assert_eq!(table.rows.len(), Predictor::COUNT);
        assert_eq!(table.rows[0].variable, "DLINE_WinRate");
        assert_eq!(table.rows[0].impact_on_qbr, 0.1557);
        assert_eq!(table.rows[2].impact_on_qbr, -2.4875);
        assert_eq!(table.rows[0].p_value_qbr, 0.0123);
        assert_eq!(table.rows[0].p_value_rtg, 0.0133);
    }

    #[test]
    fn test_csv_header() {
        let models = FittedModels {
            qbr: model(Target::Qbr, 0.0),
            rtg: model(Target::Rtg, 0.0),
        };
        let csv = ImpactTable::from_models(&models)
            .export_to_string(ExportFormat::Csv)
            .unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Variable,Impact_on_QBR,P_value_QBR,Std_Beta_QBR,Impact_on_RTG,P_value_RTG,Std_Beta_RTG"
        );
        assert!(lines.next().unwrap().starts_with("DLINE_WinRate,0.1557,0.0123,0.5,"));
        assert_eq!(csv.lines().count(), 1 + Predictor::COUNT);
    }

    #[test]
    fn test_whole_numbers_render_like_player_table() {
        let models = FittedModels {
            qbr: model(Target::Qbr, 0.5),
            rtg: model(Target::Rtg, 0.0),
        };
        let csv = ImpactTable::from_models(&models)
            .export_to_string(ExportFormat::Csv)
            .unwrap();

        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("DLINE_WinRate,0.1557,0.5123,1,0.1557,"), "{row}");
        assert!(!row.contains("1.0,"));
    }
}
