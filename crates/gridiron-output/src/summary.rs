//! Terminal listing of the biggest QBR over- and under-performers.

use gridiron_model::ScoredRow;
use std::fmt::Write;

/// The `n` largest and `n` smallest QBR residuals of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformerSummary {
    /// Largest residuals first
    pub top: Vec<ScoredRow>,
    /// Smallest residuals first
    pub bottom: Vec<ScoredRow>,
}

impl PerformerSummary {
    /// Select performers from scored rows. Ties keep player table order.
    pub fn from_scored(rows: &[ScoredRow], n: usize) -> Self {
        let mut ranked: Vec<&ScoredRow> = rows.iter().collect();
        ranked.sort_by(|a, b| b.qbr_residual.total_cmp(&a.qbr_residual));
        let top = ranked.iter().take(n).map(|r| (*r).clone()).collect();

        ranked.sort_by(|a, b| a.qbr_residual.total_cmp(&b.qbr_residual));
        let bottom = ranked.iter().take(n).map(|r| (*r).clone()).collect();

        Self { top, bottom }
    }

    /// Format as an ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        write_section(&mut output, "Top Overperformers (QBR)", &self.top);
        write_section(&mut output, "Biggest Underperformers (QBR)", &self.bottom);
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }
}

fn write_section(output: &mut String, title: &str, rows: &[ScoredRow]) {
    output.push_str(&format!("\n{title}:\n"));
    output.push_str(&"-".repeat(80));
    output.push('\n');
    output.push_str(&format!(
        "{:<6} {:>6} {:<24} {:>10} {:>14} {:>14}\n",
        "Team", "Year", "Name", "QBR", "Predicted_QBR", "QBR_over_Pred"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for row in rows {
        let player = &row.row.player;
        // Writing to a String cannot fail
        let _ = writeln!(
            output,
            "{:<6} {:>6} {:<24} {:>10.2} {:>14.2} {:>14.2}",
            player.team, player.year, player.name, player.qbr, row.predicted_qbr, row.qbr_residual
        );
    }
}
