//! Plain-text model formula report.

use gridiron_data::{Predictor, Target};
use gridiron_model::{FittedModel, FittedModels};
use std::fmt::Write;

/// One model's block: header, formula, R² and adjusted R², each on its own line.
///
/// ```text
/// --- QBR Model Formula ---
/// QBR = 19.9305 + (0.1557 * DLINE_WinRate) + ... + (61.3295 * Rushing_Value)
/// R-squared: 0.4127
/// Adj. R-squared: 0.4023
/// ```
pub fn render_formula_block(model: &FittedModel) -> String {
    let target = model.formula.target;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "--- {target} Model Formula ---");
    let _ = write!(out, "{target} = {:.4}", model.intercept());
    for predictor in Predictor::ALL {
        let _ = write!(
            out,
            " + ({:.4} * {})",
            model.coefficient(predictor),
            predictor.column_name()
        );
    }
    out.push('\n');
    let _ = writeln!(out, "R-squared: {:.4}", model.r_squared);
    let _ = writeln!(out, "Adj. R-squared: {:.4}", model.adjusted_r_squared);
    out
}

/// QBR block, a blank line, then the RTG block.
pub fn render_model_formulas(models: &FittedModels) -> String {
    Target::ALL
        .iter()
        .map(|&t| render_formula_block(models.get(t)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_model::LinearFormula;
    use std::collections::BTreeMap;

    fn model(target: Target, intercept: f64, coefficients: [f64; 5]) -> FittedModel {
        FittedModel {
            formula: LinearFormula::new(target, intercept, coefficients),
            p_values: BTreeMap::new(),
            standardized_coefficients: BTreeMap::new(),
            r_squared: 0.41268,
            adjusted_r_squared: 0.40231,
            n_observations: 150,
        }
    }

    #[test]
    fn test_formula_block_layout() {
        let qbr = model(Target::Qbr, 19.93051, [0.1557, 0.3097, -2.4875, 0.2919, 61.3295]);
        let text = render_formula_block(&qbr);

        assert_eq!(
            text,
            "--- QBR Model Formula ---\n\
             QBR = 19.9305 + (0.1557 * DLINE_WinRate) + (0.3097 * OLINE_WinRate) + \
             (-2.4875 * DEF_EPA_Play) + (0.2919 * Receiving_Value) + (61.3295 * Rushing_Value)\n\
             R-squared: 0.4127\n\
             Adj. R-squared: 0.4023\n"
        );
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let models = FittedModels {
            qbr: model(Target::Qbr, 1.0, [1.0; 5]),
            rtg: model(Target::Rtg, 2.0, [2.0; 5]),
        };
        let text = render_model_formulas(&models);

        assert!(text.starts_with("--- QBR Model Formula ---\n"));
        assert!(text.contains("Adj. R-squared: 0.4023\n\n--- RTG Model Formula ---\nRTG = 2.0000"));
        assert!(text.ends_with("Adj. R-squared: 0.4023\n"));
    }
}
