//! Quarterback season table.

use crate::error::{DataError, Result};
use crate::header::find_column;
use crate::numeric::{parse_number, parse_year};
use crate::records::PlayerSeasonRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Loaded player table: records plus the names of pass-through columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTable {
    /// Headers of columns other than Team, Year, Name, QBR and RTG, in file order.
    pub extra_columns: Vec<String>,

    /// One record per parseable player-season, in file order.
    pub records: Vec<PlayerSeasonRecord>,
}

impl PlayerTable {
    /// Build a table without pass-through columns.
    pub const fn new(records: Vec<PlayerSeasonRecord>) -> Self {
        Self {
            extra_columns: Vec::new(),
            records,
        }
    }

    /// Number of player-seasons.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no player-seasons.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load the player table from disk.
///
/// With `season` set, the Year column is optional and blank years take that
/// season.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks a required column.
pub fn load_player_table(path: &Path, season: Option<i32>) -> Result<PlayerTable> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| DataError::Io {
        path: source.clone(),
        source: e,
    })?;
    read_player_table(file, &source, season)
}

/// Read the player table from any reader.
///
/// Rows whose Year, QBR or RTG does not parse, or whose Team is empty, are
/// dropped with a warning. A single-season table passes its `season`, which
/// fills the Year of every row that has none.
pub fn read_player_table<R: Read>(
    reader: R,
    source: &str,
    season: Option<i32>,
) -> Result<PlayerTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DataError::csv(source, e))?
        .clone();

    let column = |name: &str| {
        find_column(&headers, &[name]).ok_or_else(|| DataError::missing_column(source, name))
    };
    let team_idx = column("Team")?;
    let year_idx = match season {
        Some(_) => find_column(&headers, &["Year"]),
        None => Some(column("Year")?),
    };
    let name_idx = column("Name")?;
    let qbr_idx = column("QBR")?;
    let rtg_idx = column("RTG")?;
    let known = [Some(team_idx), year_idx, Some(name_idx), Some(qbr_idx), Some(rtg_idx)];

    let extra_idx: Vec<usize> = (0..headers.len())
        .filter(|i| !known.contains(&Some(*i)))
        .collect();
    let extra_columns = extra_idx
        .iter()
        .map(|&i| headers.get(i).unwrap_or_default().to_string())
        .collect();

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (line, row) in rdr.records().enumerate() {
        let row = row.map_err(|e| DataError::csv(source, e))?;
        let cell = |idx: usize| row.get(idx).unwrap_or_default();

        let team = cell(team_idx);
        let parsed = (
            year_idx.and_then(|i| parse_year(cell(i))).or(season),
            parse_number(cell(qbr_idx)),
            parse_number(cell(rtg_idx)),
        );
        let (Some(year), Some(qbr), Some(rtg)) = parsed else {
            debug!(source, row = line + 1, team, "dropping player row with unparseable Year/QBR/RTG");
            dropped += 1;
            continue;
        };
        if team.is_empty() {
            debug!(source, row = line + 1, "dropping player row without a team");
            dropped += 1;
            continue;
        }

        records.push(PlayerSeasonRecord {
            team: team.to_string(),
            year,
            name: cell(name_idx).to_string(),
            qbr,
            rtg,
            extra: extra_idx.iter().map(|&i| cell(i).to_string()).collect(),
        });
    }

    if dropped > 0 {
        warn!(source, dropped, kept = records.len(), "dropped unparseable player rows");
    }

    Ok(PlayerTable {
        extra_columns,
        records,
    })
}
