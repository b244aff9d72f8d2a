//! Export of coefficient sets.
//!
//! JSON output is the format `CoefficientSet::load` reads back. CSV output is a
//! long table for inspection only.

use crate::export::{ExportError, ExportFormat, Exporter, finish_csv, format_float, to_json};
use gridiron_data::{Predictor, Target};
use gridiron_model::CoefficientSet;

impl Exporter for CoefficientSet {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        if let Some(json) = to_json(self, format) {
            return json;
        }

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(["Target", "Term", "Coefficient"])?;
        for target in Target::ALL {
            let formula = self.formula(target);
            wtr.write_record([
                target.column_name(),
                "const",
                &format_float(formula.intercept),
            ])?;
            for predictor in Predictor::ALL {
                let value = formula.coefficient(predictor).unwrap_or(f64::NAN);
                wtr.write_record([
                    target.column_name(),
                    predictor.column_name(),
                    &format_float(value),
                ])?;
            }
        }
        finish_csv(wtr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_data::PercentScale;
    use gridiron_model::LinearFormula;

    fn set() -> CoefficientSet {
        CoefficientSet::new(
            PercentScale::AsIs,
            LinearFormula::new(Target::Qbr, 19.9305, [0.1557, 0.3097, -2.4875, 0.2919, 61.3295]),
            LinearFormula::new(Target::Rtg, 56.1008, [0.065, 0.2777, -10.2452, 0.3663, 33.3639]),
        )
    }

    #[test]
    fn test_json_reloads() {
        let json = set().export_to_string(ExportFormat::PrettyJson).unwrap();
        let reloaded = CoefficientSet::from_json_str(&json, "coefficients.json").unwrap();
        assert_eq!(reloaded, set());
    }

    #[test]
    fn test_csv_long_form() {
        let csv = set().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * (1 + Predictor::COUNT));
        assert_eq!(lines[1], "QBR,const,19.9305");
        assert_eq!(lines[7], "RTG,const,56.1008");
        assert_eq!(lines[8], "RTG,DLINE_WinRate,0.065");
    }
}
