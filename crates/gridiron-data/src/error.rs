//! Error types for data loading.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading input tables.
///
/// Every variant is fatal for a run. Unparseable cells are not errors; they
/// load as missing values.
#[derive(Debug, Error)]
pub enum DataError {
    /// File missing or unreadable
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Malformed CSV (ragged rows, invalid UTF-8)
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// File that was being parsed
        path: String,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// A required header is absent
    #[error("{path}: missing required column '{column}'")]
    MissingColumn {
        /// File that was being parsed
        path: String,
        /// Name of the missing column
        column: String,
    },

    /// A team appears twice in a table keyed by team
    #[error("{path}: team '{team}' appears more than once")]
    DuplicateTeam {
        /// File that was being parsed
        path: String,
        /// Repeated team name
        team: String,
    },
}

impl DataError {
    pub(crate) fn csv(path: &str, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn missing_column(path: &str, column: &str) -> Self {
        Self::MissingColumn {
            path: path.to_string(),
            column: column.to_string(),
        }
    }
}
