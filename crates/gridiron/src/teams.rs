//! Team name aliases.
//!
//! Join keys are matched exactly. A franchise that moved or rebranded
//! (`OAK` → `LV`, `Washington` → `Commanders`) therefore matches nothing across
//! tables unless an alias maps both spellings to one canonical name.

use gridiron_data::DataError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Alias to canonical team name. Empty by default, meaning exact matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamAliases {
    map: BTreeMap<String, String>,
}

impl TeamAliases {
    /// Exact matching, no aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(alias, canonical)` pairs.
    pub fn from_pairs<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        let mut aliases = Self::new();
        for (alias, canonical) in pairs {
            aliases.insert(alias, canonical);
        }
        aliases
    }

    /// Add or replace one alias.
    pub fn insert(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        let alias = alias.into().trim().to_string();
        let canonical = canonical.into().trim().to_string();
        if let Some(previous) = self.map.insert(alias.clone(), canonical.clone()) {
            if previous != canonical {
                warn!(%alias, %previous, %canonical, "team alias redefined");
            }
        }
    }

    /// Canonical name of `team`; unknown names map to themselves.
    pub fn canonical<'a>(&'a self, team: &'a str) -> &'a str {
        self.map.get(team).map_or(team, String::as_str)
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no alias is configured.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Load an `alias,canonical` CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or lacks either column.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| DataError::Io {
            path: source.clone(),
            source: e,
        })?;
        Self::read(file, &source)
    }

    /// Read an `alias,canonical` table from any reader. Header match is
    /// case-insensitive; rows with an empty cell are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is malformed or lacks either column.
    pub fn read<R: Read>(reader: R, source: &str) -> Result<Self, DataError> {
        let csv_error = |e: csv::Error| DataError::Csv {
            path: source.to_string(),
            source: e,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers().map_err(csv_error)?.clone();

        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| DataError::MissingColumn {
                    path: source.to_string(),
                    column: name.to_string(),
                })
        };
        let alias_idx = position("alias")?;
        let canonical_idx = position("canonical")?;

        let mut aliases = Self::new();
        for record in rdr.records() {
            let record = record.map_err(csv_error)?;
            match (record.get(alias_idx), record.get(canonical_idx)) {
                (Some(alias), Some(canonical)) if !alias.is_empty() && !canonical.is_empty() => {
                    aliases.insert(alias, canonical);
                }
                _ => debug!(source, row = ?record, "skipping incomplete alias row"),
            }
        }
        Ok(aliases)
    }
}
