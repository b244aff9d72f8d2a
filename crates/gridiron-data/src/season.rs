//! Single-season snapshot tables: one row per team, one column per metric.
//!
//! Snapshot tables are what gets published mid-season, before the wide
//! historical tables are updated. Columns may use either the canonical metric
//! names (`OLINE_WinRate`) or the published headers (`Oline Win Rate`).

use crate::error::{DataError, Result};
use crate::header::find_column;
use crate::numeric::{PercentScale, coerce_numeric};
use crate::records::{Predictor, TeamMetricRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Load a snapshot table for `year` from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read, lacks the team column or any
/// metric column, or lists a team twice.
pub fn load_season_table(
    path: &Path,
    year: i32,
    scale: PercentScale,
) -> Result<Vec<TeamMetricRecord>> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| DataError::Io {
        path: source.clone(),
        source: e,
    })?;
    read_season_table(file, &source, year, scale)
}

/// Read a snapshot table for `year` from any reader.
pub fn read_season_table<R: Read>(
    reader: R,
    source: &str,
    year: i32,
    scale: PercentScale,
) -> Result<Vec<TeamMetricRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DataError::csv(source, e))?
        .clone();
    let team_idx =
        find_column(&headers, &["team"]).ok_or_else(|| DataError::missing_column(source, "Team"))?;

    let mut metric_columns = Vec::with_capacity(Predictor::COUNT);
    for metric in Predictor::ALL {
        let idx = find_column(&headers, &[metric.column_name(), metric.display_name()])
            .ok_or_else(|| DataError::missing_column(source, metric.display_name()))?;
        metric_columns.push((metric, idx));
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in rdr.records() {
        let row = row.map_err(|e| DataError::csv(source, e))?;
        let team = row.get(team_idx).unwrap_or_default();
        if team.is_empty() {
            continue;
        }
        if !seen.insert(team.to_string()) {
            return Err(DataError::DuplicateTeam {
                path: source.to_string(),
                team: team.to_string(),
            });
        }

        for &(metric, idx) in &metric_columns {
            let raw = row.get(idx).unwrap_or_default();
            let value = coerce_numeric(raw, scale);
            if value.is_none() {
                debug!(source, team, raw, "unparseable {} cell", metric);
            }
            records.push(TeamMetricRecord::new(team.to_string(), year, metric, value));
        }
    }

    debug!(source, teams = seen.len(), year, "loaded season snapshot");
    Ok(records)
}
