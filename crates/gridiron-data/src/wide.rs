//! Wide team tables: one row per team, one column per season.
//!
//! ```text
//! Team,2022,2023,2024
//! NE,52%,55%,49%
//! ```
//!
//! is reshaped to one [`TeamMetricRecord`] per (team, season).

use crate::error::{DataError, Result};
use crate::header::find_column;
use crate::numeric::{PercentScale, coerce_numeric, parse_year};
use crate::records::{Predictor, TeamMetricRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Load a wide team table from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed, has no `team`
/// column, or lists a team twice.
pub fn load_team_metric_table(
    path: &Path,
    metric: Predictor,
    scale: PercentScale,
) -> Result<Vec<TeamMetricRecord>> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| DataError::Io {
        path: source.clone(),
        source: e,
    })?;
    read_team_metric_table(file, &source, metric, scale)
}

/// Reshape a wide team table read from any reader.
///
/// `source` names the input in error messages. Headers that are not a season
/// label are skipped, as are rows with an empty team cell.
pub fn read_team_metric_table<R: Read>(
    reader: R,
    source: &str,
    metric: Predictor,
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

    let year_columns: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != team_idx)
        .filter_map(|(i, label)| match parse_year(label) {
            Some(year) => Some((i, year)),
            None => {
                debug!(source, label, "skipping non-season column");
                None
            }
        })
        .collect();

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in rdr.records() {
        let row = row.map_err(|e| DataError::csv(source, e))?;
        let team = row.get(team_idx).unwrap_or_default();
        if team.is_empty() {
            debug!(source, "skipping row without a team");
            continue;
        }
        if !seen.insert(team.to_string()) {
            return Err(DataError::DuplicateTeam {
                path: source.to_string(),
                team: team.to_string(),
            });
        }

        for &(idx, year) in &year_columns {
            let raw = row.get(idx).unwrap_or_default();
            let value = coerce_numeric(raw, scale);
            if value.is_none() {
                debug!(source, team, year, raw, "unparseable {} cell", metric);
            }
            records.push(TeamMetricRecord::new(team.to_string(), year, metric, value));
        }
    }

    debug!(
        source,
        teams = seen.len(),
        seasons = year_columns.len(),
        "loaded {} table",
        metric
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(csv: &str, scale: PercentScale) -> Result<Vec<TeamMetricRecord>> {
        read_team_metric_table(csv.as_bytes(), "test.csv", Predictor::OlineWinRate, scale)
    }

    #[test]
    fn test_reshape_wide_to_long() {
        let records = read("Team,2023,2024\nNE,52%,55%\nKC,60%,58%\n", PercentScale::AsIs).unwrap();

        assert_eq!(records.len(), 4);
        assert!(records.contains(&TeamMetricRecord::new(
            "NE".to_string(),
            2024,
            Predictor::OlineWinRate,
            Some(55.0)
        )));
        assert!(records.contains(&TeamMetricRecord::new(
            "KC".to_string(),
            2023,
            Predictor::OlineWinRate,
            Some(60.0)
        )));
    }

    #[test]
    fn test_team_header_is_case_and_space_insensitive() {
        let records = read(" tEaM ,2024\nNE,1\n", PercentScale::AsIs).unwrap();
        assert_eq!(records[0].team, "NE");
    }

    #[test]
    fn test_team_column_need_not_be_first() {
        let records = read("2024,Team\n3.5,NE\n", PercentScale::AsIs).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2024);
        assert_eq!(records[0].value, Some(3.5));
    }

    #[test]
    fn test_missing_team_column() {
        let err = read("Club,2024\nNE,1\n", PercentScale::AsIs).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "Team"));
    }

    #[test]
    fn test_non_season_columns_dropped() {
        let records = read("Team,Rank,2024\nNE,3,1\n", PercentScale::AsIs).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2024);
    }

    #[test]
    fn test_unparseable_cells_are_missing() {
        let records = read("Team,2023,2024\nNE,--,\"1,204\"\n", PercentScale::AsIs).unwrap();
        let by_year = |y: i32| records.iter().find(|r| r.year == y).unwrap().value;
        assert_eq!(by_year(2023), None);
        assert_eq!(by_year(2024), Some(1204.0));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let err = read("Team,2024\nNE,1\nNE,2\n", PercentScale::AsIs).unwrap_err();
        assert!(matches!(err, DataError::DuplicateTeam { ref team, .. } if team == "NE"));
    }

    #[test]
    fn test_short_row_cells_are_missing() {
        let records = read("Team,2023,2024\nNE,55%\nKC,60%,58%\n", PercentScale::AsIs).unwrap();
        let value = |team: &str, year: i32| {
            records
                .iter()
                .find(|r| r.team == team && r.year == year)
                .unwrap()
                .value
        };
        assert_eq!(records.len(), 4);
        assert_eq!(value("NE", 2023), Some(55.0));
        assert_eq!(value("NE", 2024), None);
        assert_eq!(value("KC", 2024), Some(58.0));
    }
}
