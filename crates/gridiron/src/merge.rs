//! Dataset merger: player-seasons joined with the five team metrics.
//!
//! The player table drives a left join against each metric on `(team, year)`,
//! so every player-season survives the joins. Rows still missing any predictor
//! afterwards are dropped. Output keeps player table order.

use crate::teams::TeamAliases;
use gridiron_data::{MergedRow, PlayerTable, Predictor, PredictorValues, TeamMetricRecord};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use tracing::{info, warn};

const ROW: &str = "row";
const TEAM: &str = "team";
const YEAR: &str = "year";

/// Errors raised while merging.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Two valued metric records share a key, usually after alias resolution
    #[error("{metric} has more than one value for team '{team}' in {year}")]
    DuplicateKey {
        /// Metric with the repeated key
        metric: Predictor,
        /// Canonical team name
        team: String,
        /// Season
        year: i32,
    },

    /// Data frame operation failed
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Joined frame references a player row that does not exist
    #[error("joined frame references unknown player row {0}")]
    UnknownRow(u32),
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Complete rows, in player table order
    pub rows: Vec<MergedRow>,
    /// Player-seasons entering the join
    pub joined: usize,
    /// Rows dropped for a missing predictor
    pub dropped: usize,
    /// `(team, year)` keys that matched no metric row at all
    pub unmatched: Vec<(String, i32)>,
}

/// Joins players with team metrics.
#[derive(Debug, Clone, Default)]
pub struct DatasetMerger {
    aliases: TeamAliases,
}

impl DatasetMerger {
    /// Create a merger that resolves team names through `aliases`.
    pub const fn new(aliases: TeamAliases) -> Self {
        Self { aliases }
    }

    /// Configured aliases.
    pub const fn aliases(&self) -> &TeamAliases {
        &self.aliases
    }

    /// Left-join players with every metric and keep complete rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric has two values for one key or a frame
    /// operation fails.
    pub fn merge(
        &self,
        players: &PlayerTable,
        metrics: &[TeamMetricRecord],
    ) -> Result<MergeOutcome, MergeError> {
        let mut lf = self.player_frame(players)?.lazy();
        for metric in Predictor::ALL {
            lf = lf.join(
                self.metric_frame(metrics, metric)?.lazy(),
                [col(TEAM), col(YEAR)],
                [col(TEAM), col(YEAR)],
                JoinArgs::new(JoinType::Left),
            );
        }
        let joined = lf.sort([ROW], Default::default()).collect()?;

        let unmatched = unmatched_keys(&joined)?;
        for (team, year) in &unmatched {
            warn!(%team, year, "player-season matched no team metric row");
        }

        let all_present = Predictor::ALL
            .iter()
            .fold(lit(true), |acc, p| acc.and(col(p.column_name()).is_not_null()));
        let complete = joined.clone().lazy().filter(all_present).collect()?;

        let rows = to_merged_rows(&complete, players)?;
        let dropped = joined.height() - rows.len();
        if dropped > 0 {
            warn!(dropped, "dropped player-seasons with a missing predictor");
        }
        info!(
            joined = joined.height(),
            retained = rows.len(),
            dropped,
            "merged player-seasons with team metrics"
        );

        Ok(MergeOutcome {
            rows,
            joined: joined.height(),
            dropped,
            unmatched,
        })
    }

    fn player_frame(&self, players: &PlayerTable) -> Result<DataFrame, MergeError> {
        let n = players.records.len() as u32;
        let rows: Vec<u32> = (0..n).collect();
        let teams: Vec<String> = players
            .records
            .iter()
            .map(|p| self.aliases.canonical(&p.team).to_string())
            .collect();
        let years: Vec<i32> = players.records.iter().map(|p| p.year).collect();

        Ok(DataFrame::new(vec![
            Column::new(ROW.into(), rows),
            Column::new(TEAM.into(), teams),
            Column::new(YEAR.into(), years),
        ])?)
    }

    fn metric_frame(
        &self,
        metrics: &[TeamMetricRecord],
        metric: Predictor,
    ) -> Result<DataFrame, MergeError> {
        let mut seen = HashSet::new();
        let mut teams = Vec::new();
        let mut years = Vec::new();
        let mut values = Vec::new();

        // Blank cells join as null anyway; only valued records can collide
        for record in metrics
            .iter()
            .filter(|r| r.metric == metric && r.value.is_some())
        {
            let team = self.aliases.canonical(&record.team).to_string();
            if !seen.insert((team.clone(), record.year)) {
                return Err(MergeError::DuplicateKey {
                    metric,
                    team,
                    year: record.year,
                });
            }
            teams.push(team);
            years.push(record.year);
            values.push(record.value);
        }

        Ok(DataFrame::new(vec![
            Column::new(TEAM.into(), teams),
            Column::new(YEAR.into(), years),
            Column::new(metric.column_name().into(), values),
        ])?)
    }
}

/// Keys of rows where every predictor is null, sorted and deduplicated.
fn unmatched_keys(joined: &DataFrame) -> Result<Vec<(String, i32)>, MergeError> {
    let teams = joined.column(TEAM)?.str()?;
    let years = joined.column(YEAR)?.i32()?;
    let values = Predictor::ALL
        .iter()
        .map(|p| Ok(joined.column(p.column_name())?.f64()?.clone()))
        .collect::<Result<Vec<_>, MergeError>>()?;

    let mut keys = BTreeSet::new();
    for i in 0..joined.height() {
        if values.iter().all(|v| v.get(i).is_none()) {
            if let (Some(team), Some(year)) = (teams.get(i), years.get(i)) {
                keys.insert((team.to_string(), year));
            }
        }
    }
    Ok(keys.into_iter().collect())
}

fn to_merged_rows(
    complete: &DataFrame,
    players: &PlayerTable,
) -> Result<Vec<MergedRow>, MergeError> {
    let rows = complete.column(ROW)?.u32()?;
    let values = Predictor::ALL
        .iter()
        .map(|p| Ok(complete.column(p.column_name())?.f64()?.clone()))
        .collect::<Result<Vec<_>, MergeError>>()?;

    let mut merged = Vec::with_capacity(complete.height());
    for (i, row) in rows.into_iter().enumerate() {
        let Some(row) = row else { continue };
        let player = players
            .records
            .get(row as usize)
            .ok_or(MergeError::UnknownRow(row))?;

        let mut predictors = [0.0; Predictor::COUNT];
        for (slot, column) in predictors.iter_mut().zip(&values) {
            // Null-free after the filter
            *slot = column.get(i).unwrap_or(f64::NAN);
        }
        merged.push(MergedRow::new(player.clone(), PredictorValues::new(predictors)));
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_data::{PercentScale, PlayerSeasonRecord, read_team_metric_table};

    fn metrics_for(team: &str, year: i32, base: f64) -> Vec<TeamMetricRecord> {
        Predictor::ALL
            .iter()
            .map(|&p| TeamMetricRecord::new(team.to_string(), year, p, Some(base + p.index() as f64)))
            .collect()
    }

    fn players(rows: &[(&str, i32, &str)]) -> PlayerTable {
        PlayerTable::new(
            rows.iter()
                .map(|(team, year, name)| PlayerSeasonRecord::new(team, *year, name, 60.0, 90.0))
                .collect(),
        )
    }

    #[test]
    fn test_complete_rows_keep_player_order() {
        let mut metrics = metrics_for("KC", 2023, 10.0);
        metrics.extend(metrics_for("BUF", 2023, 20.0));
        metrics.extend(metrics_for("KC", 2022, 30.0));
        let players = players(&[("KC", 2022, "A"), ("BUF", 2023, "B"), ("KC", 2023, "C")]);

        let outcome = DatasetMerger::default().merge(&players, &metrics).unwrap();

        let names: Vec<&str> = outcome.rows.iter().map(|r| r.player.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(outcome.rows[0].predictors.get(Predictor::DlineWinRate), 30.0);
        assert_eq!(outcome.rows[1].predictors.get(Predictor::RushingValue), 24.0);
        assert_eq!(outcome.dropped, 0);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_row_missing_one_predictor_is_dropped() {
        let mut metrics = metrics_for("KC", 2023, 10.0);
        metrics.extend(metrics_for("NYJ", 2023, 10.0));
        metrics.retain(|r| !(r.team == "NYJ" && r.metric == Predictor::ReceivingValue));
        let players = players(&[("KC", 2023, "A"), ("NYJ", 2023, "B")]);

        let outcome = DatasetMerger::default().merge(&players, &metrics).unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.joined, 2);
        assert_eq!(outcome.dropped, 1);
        // NYJ matched four tables, so it is not reported as unmatched
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_missing_value_cell_is_dropped() {
        let mut metrics = metrics_for("KC", 2023, 10.0);
        metrics[2].value = None;
        let outcome = DatasetMerger::default()
            .merge(&players(&[("KC", 2023, "A")]), &metrics)
            .unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_unmatched_team_year_reported() {
        let metrics = metrics_for("KC", 2023, 10.0);
        let players = players(&[("KC", 2023, "A"), ("KC", 2019, "B"), ("KC", 2019, "C")]);

        let outcome = DatasetMerger::default().merge(&players, &metrics).unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.unmatched, vec![("KC".to_string(), 2019)]);
    }

    #[test]
    fn test_aliases_resolve_both_sides() {
        let metrics = metrics_for("LV", 2019, 10.0);
        let players = players(&[("OAK", 2019, "D. Carr")]);

        let exact = DatasetMerger::default().merge(&players, &metrics).unwrap();
        assert!(exact.rows.is_empty());
        assert_eq!(exact.unmatched, vec![("OAK".to_string(), 2019)]);

        let aliased = DatasetMerger::new(TeamAliases::from_pairs([("OAK", "LV")]))
            .merge(&players, &metrics)
            .unwrap();
        assert_eq!(aliased.rows.len(), 1);
        // Output keeps the team as written in the player table
        assert_eq!(aliased.rows[0].player.team, "OAK");
    }

    #[test]
    fn test_relocated_franchise_rows_merge_under_alias() {
        let mut metrics = Vec::new();
        for metric in Predictor::ALL {
            metrics.extend(
                read_team_metric_table(
                    "Team,2019,2020\nOAK,50,\nLV,,52\n".as_bytes(),
                    "wide.csv",
                    metric,
                    PercentScale::AsIs,
                )
                .unwrap(),
            );
        }
        let players = players(&[("OAK", 2019, "D. Carr"), ("LV", 2020, "D. Carr")]);
        let merger = DatasetMerger::new(TeamAliases::from_pairs([("OAK", "LV")]));

        let outcome = merger.merge(&players, &metrics).unwrap();

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.rows[0].player.team, "OAK");
        assert_eq!(outcome.rows[0].predictors.get(Predictor::OlineWinRate), 50.0);
        assert_eq!(outcome.rows[1].predictors.get(Predictor::OlineWinRate), 52.0);
    }

    #[test]
    fn test_alias_collision_is_duplicate_key() {
        let mut metrics = metrics_for("OAK", 2019, 10.0);
        metrics.extend(metrics_for("LV", 2019, 20.0));
        let merger = DatasetMerger::new(TeamAliases::from_pairs([("OAK", "LV")]));

        let err = merger
            .merge(&players(&[("LV", 2019, "A")]), &metrics)
            .unwrap_err();
        assert!(matches!(
            err,
            MergeError::DuplicateKey { ref team, year: 2019, .. } if team == "LV"
        ));
    }
}
