//! End-to-end pipeline: load, compute, write.
//!
//! All reads happen in [`load`], all writes in [`write`]. [`compute`] is a pure
//! function of the configuration and the loaded tables.

use crate::merge::{DatasetMerger, MergeError};
use crate::teams::TeamAliases;
use gridiron_data::{DataError, InputPaths, PercentScale, PlayerTable, TeamMetricRecord};
use gridiron_model::{
    CoefficientSet, FitError, FittedModels, FormulaError, RegressionEngine, ScoreError, ScoredRow,
    score_rows,
};
use gridiron_output::{
    AugmentedPlayerTable, ExportError, ExportFormat, Exporter, ImpactTable, render_model_formulas,
};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Default file name of the augmented player table.
pub const PLAYERS_OUTPUT: &str = "QB Data.csv";

/// Default file name of the variable impact table.
pub const ANALYSIS_OUTPUT: &str = "Analysis.csv";

/// Default file name of the formula report.
pub const FORMULAS_OUTPUT: &str = "Model_Formulas.txt";

/// Pipeline stage, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading inputs
    Load,
    /// Joining players with team metrics
    Merge,
    /// Fitting the regression models
    Fit,
    /// Computing predictions and residuals
    Score,
    /// Writing reports
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Merge => "merge",
            Self::Fit => "fit",
            Self::Score => "score",
            Self::Write => "write",
        })
    }
}

/// Errors raised by the pipeline. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input table could not be loaded
    #[error("load stage: {0}")]
    Load(#[source] DataError),

    /// A coefficient file could not be loaded
    #[error("load stage: {0}")]
    Coefficients(#[source] FormulaError),

    /// Players could not be joined with team metrics
    #[error("merge stage: {0}")]
    Merge(#[from] MergeError),

    /// The regression is ill-defined
    #[error("fit stage: {0}")]
    Fit(#[from] FitError),

    /// Published coefficients were fitted on another percent scale
    #[error(
        "score stage: coefficients assume the '{coefficients}' percent scale but inputs are loaded as '{configured}'"
    )]
    ScaleMismatch {
        /// Scale declared by the coefficient set
        coefficients: PercentScale,
        /// Scale the loader was configured with
        configured: PercentScale,
    },

    /// Published coefficients are incomplete or misplaced
    #[error("score stage: {0}")]
    InvalidCoefficients(#[source] FormulaError),

    /// Scoring failed
    #[error("score stage: {0}")]
    Score(#[from] ScoreError),

    /// A report could not be written
    #[error("write stage: {path}: {source}")]
    Write {
        /// Report path
        path: String,
        /// Underlying export error
        source: ExportError,
    },
}

impl PipelineError {
    /// Stage at which the run failed.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Load(_) | Self::Coefficients(_) => Stage::Load,
            Self::Merge(_) => Stage::Merge,
            Self::Fit(_) => Stage::Fit,
            Self::ScaleMismatch { .. } | Self::InvalidCoefficients(_) | Self::Score(_) => {
                Stage::Score
            }
            Self::Write { .. } => Stage::Write,
        }
    }

    fn write(path: &Path, source: ExportError) -> Self {
        Self::Write {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Where the models come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModelSource {
    /// Fit both models on the merged data
    #[default]
    Refit,
    /// Apply previously published formulas without fitting
    Published(CoefficientSet),
}

impl ModelSource {
    /// Published formulas read from a coefficient file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid set.
    pub fn published_from_file(path: &Path) -> Result<Self, PipelineError> {
        CoefficientSet::load(path)
            .map(Self::Published)
            .map_err(PipelineError::Coefficients)
    }
}

/// Report destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Augmented player table
    pub players: PathBuf,
    /// Variable impact table (refit only)
    pub analysis: PathBuf,
    /// Formula report (refit only)
    pub formulas: PathBuf,
    /// Coefficient file to save (refit only)
    pub coefficients: Option<PathBuf>,
}

impl OutputPaths {
    /// Conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            players: dir.join(PLAYERS_OUTPUT),
            analysis: dir.join(ANALYSIS_OUTPUT),
            formulas: dir.join(FORMULAS_OUTPUT),
            coefficients: None,
        }
    }

    /// Also save the fitted coefficients to `path`.
    pub fn with_coefficients(mut self, path: PathBuf) -> Self {
        self.coefficients = Some(path);
        self
    }
}

/// Configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Input tables
    pub inputs: InputPaths,
    /// Report destinations
    pub outputs: OutputPaths,
    /// How percentage cells are read
    pub percent_scale: PercentScale,
    /// Team name aliases applied before joining
    pub aliases: TeamAliases,
    /// Refit or apply published formulas
    pub source: ModelSource,
}

impl PipelineConfig {
    /// Refit run with default percent scale and no aliases.
    pub fn new(inputs: InputPaths, outputs: OutputPaths) -> Self {
        Self {
            inputs,
            outputs,
            percent_scale: PercentScale::default(),
            aliases: TeamAliases::default(),
            source: ModelSource::Refit,
        }
    }
}

/// Everything read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedInputs {
    /// Long-form team metrics
    pub metrics: Vec<TeamMetricRecord>,
    /// Quarterback table
    pub players: PlayerTable,
}

/// Results of [`compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Player-seasons entering the merge
    pub joined: usize,
    /// Player-seasons dropped for a missing predictor
    pub dropped: usize,
    /// `(team, year)` keys without any team metric
    pub unmatched: Vec<(String, i32)>,
    /// Scored rows in player table order
    pub scored: Vec<ScoredRow>,
    /// Augmented player table
    pub players: AugmentedPlayerTable,
    /// Fitted models (refit only)
    pub models: Option<FittedModels>,
    /// Impact table (refit only)
    pub analysis: Option<ImpactTable>,
    /// Formula report (refit only)
    pub formulas: Option<String>,
    /// Fitted formulas as a reusable set (refit only)
    pub coefficients: Option<CoefficientSet>,
}

/// Read every input.
///
/// # Errors
///
/// Returns an error if any input is missing, unreadable or malformed.
pub fn load(config: &PipelineConfig) -> Result<LoadedInputs, PipelineError> {
    let (metrics, players) = config
        .inputs
        .load(config.percent_scale)
        .map_err(PipelineError::Load)?;
    Ok(LoadedInputs { metrics, players })
}

/// Merge, fit or inject models, score and build reports.
///
/// # Errors
///
/// Returns an error on a merge failure, a degenerate fit, or published
/// coefficients that do not match the configuration.
pub fn compute(
    config: &PipelineConfig,
    inputs: &LoadedInputs,
) -> Result<PipelineOutput, PipelineError> {
    if let ModelSource::Published(set) = &config.source {
        if set.percent_scale != config.percent_scale {
            return Err(PipelineError::ScaleMismatch {
                coefficients: set.percent_scale,
                configured: config.percent_scale,
            });
        }
        set.validate().map_err(PipelineError::InvalidCoefficients)?;
    }

    let merger = DatasetMerger::new(config.aliases.clone());
    let merged = merger.merge(&inputs.players, &inputs.metrics)?;

    let (scored, models) = match &config.source {
        ModelSource::Refit => {
            let models = RegressionEngine::default().fit_all(&merged.rows)?;
            let scored = score_rows(&merged.rows, &models.qbr, &models.rtg)?;
            (scored, Some(models))
        }
        ModelSource::Published(set) => {
            info!(rows = merged.rows.len(), "applying published coefficients");
            (score_rows(&merged.rows, &set.qbr, &set.rtg)?, None)
        }
    };

    let players = AugmentedPlayerTable::from_scored(&inputs.players.extra_columns, &scored);
    let analysis = models.as_ref().map(ImpactTable::from_models);
    let formulas = models.as_ref().map(render_model_formulas);
    let coefficients = models
        .as_ref()
        .map(|m| m.to_coefficient_set(config.percent_scale));

    Ok(PipelineOutput {
        joined: merged.joined,
        dropped: merged.dropped,
        unmatched: merged.unmatched,
        scored,
        players,
        models,
        analysis,
        formulas,
        coefficients,
    })
}

/// Write every report, replacing existing files. Returns the paths written.
///
/// An apply run writes only the player table. An `Analysis.csv` or
/// `Model_Formulas.txt` left in the same place by an earlier refit is not
/// touched; each such file is logged as stale.
///
/// # Errors
///
/// Returns an error naming the first file that could not be written.
pub fn write(output: &PipelineOutput, paths: &OutputPaths) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::new();

    export(&output.players, &paths.players, &mut written)?;
    if let Some(analysis) = &output.analysis {
        export(analysis, &paths.analysis, &mut written)?;
    }
    if let Some(formulas) = &output.formulas {
        write_text(formulas, &paths.formulas)
            .map_err(|e| PipelineError::write(&paths.formulas, e.into()))?;
        written.push(paths.formulas.clone());
    }
    if let (Some(set), Some(path)) = (&output.coefficients, &paths.coefficients) {
        set.export_to_file(path, ExportFormat::PrettyJson)
            .map_err(|e| PipelineError::write(path, e))?;
        written.push(path.clone());
    }

    for path in stale_reports(output, paths) {
        warn!(path = %path.display(), "report from an earlier refit left unchanged");
    }

    info!(files = written.len(), "wrote reports");
    Ok(written)
}

/// Refit-only reports that exist on disk but are not produced by `output`.
fn stale_reports(output: &PipelineOutput, paths: &OutputPaths) -> Vec<PathBuf> {
    let mut stale = Vec::new();
    if output.analysis.is_none() && paths.analysis.exists() {
        stale.push(paths.analysis.clone());
    }
    if output.formulas.is_none() && paths.formulas.exists() {
        stale.push(paths.formulas.clone());
    }
    stale
}

/// Load, compute and write.
///
/// # Errors
///
/// Returns the first failure; nothing is written unless every earlier stage
/// succeeded.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let inputs = load(config)?;
    let output = compute(config, &inputs)?;
    write(&output, &config.outputs)?;
    Ok(output)
}

fn export<E: Exporter>(
    report: &E,
    path: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<(), PipelineError> {
    report
        .export_to_file(path, ExportFormat::Csv)
        .map_err(|e| PipelineError::write(path, e))?;
    written.push(path.to_path_buf());
    Ok(())
}

fn write_text(text: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_data::{PlayerSeasonRecord, Predictor, Target};
    use gridiron_model::LinearFormula;

    fn published(scale: PercentScale) -> CoefficientSet {
        CoefficientSet::new(
            scale,
            LinearFormula::new(Target::Qbr, 19.9305, [0.1557, 0.3097, -2.4875, 0.2919, 61.3295]),
            LinearFormula::new(Target::Rtg, 56.1008, [0.065, 0.2777, -10.2452, 0.3663, 33.3639]),
        )
    }

    fn inputs() -> LoadedInputs {
        let metrics = Predictor::ALL
            .iter()
            .map(|&p| TeamMetricRecord::new("DET".to_string(), 2025, p, Some(1.0)))
            .collect();
        LoadedInputs {
            metrics,
            players: PlayerTable::new(vec![PlayerSeasonRecord::new(
                "DET", 2025, "J. Goff", 70.0, 110.0,
            )]),
        }
    }

    fn config(source: ModelSource) -> PipelineConfig {
        let mut config = PipelineConfig::new(
            InputPaths::from_dir(Path::new("unused")),
            OutputPaths::in_dir(Path::new("unused")),
        );
        config.source = source;
        config
    }

    #[test]
    fn test_apply_published_scores_without_fit() {
        let config = config(ModelSource::Published(published(PercentScale::AsIs)));
        let output = compute(&config, &inputs()).unwrap();

        assert!(output.models.is_none());
        assert!(output.analysis.is_none());
        assert!(output.formulas.is_none());
        assert_eq!(output.scored.len(), 1);
        let expected = 19.9305 + 0.1557 + 0.3097 - 2.4875 + 0.2919 + 61.3295;
        assert_eq!(
            output.scored[0].predicted_qbr,
            gridiron_model::round_to(expected, 3)
        );
    }

    #[test]
    fn test_scale_mismatch_is_fatal() {
        let config = config(ModelSource::Published(published(PercentScale::Fraction)));
        let err = compute(&config, &inputs()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ScaleMismatch {
                coefficients: PercentScale::Fraction,
                configured: PercentScale::AsIs
            }
        ));
        assert_eq!(err.stage(), Stage::Score);
    }

    #[test]
    fn test_refit_on_one_row_is_fatal() {
        let err = compute(&config(ModelSource::Refit), &inputs()).unwrap_err();
        assert!(matches!(err, PipelineError::Fit(FitError::InsufficientData { .. })));
        assert_eq!(err.stage(), Stage::Fit);
        assert!(err.to_string().starts_with("fit stage:"));
    }

    #[test]
    fn test_apply_reports_stale_refit_files() {
        let dir = std::env::temp_dir().join(format!("gridiron-stale-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let paths = OutputPaths::in_dir(&dir);
        std::fs::write(&paths.analysis, "old").unwrap();

        let config = config(ModelSource::Published(published(PercentScale::AsIs)));
        let output = compute(&config, &inputs()).unwrap();

        assert_eq!(stale_reports(&output, &paths), vec![paths.analysis.clone()]);
        let written = write(&output, &paths).unwrap();
        assert_eq!(written, vec![paths.players.clone()]);
        assert_eq!(std::fs::read_to_string(&paths.analysis).unwrap(), "old");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::in_dir(Path::new("out")).with_coefficients(PathBuf::from("c.json"));
        assert_eq!(paths.players, Path::new("out").join("QB Data.csv"));
        assert_eq!(paths.analysis, Path::new("out").join("Analysis.csv"));
        assert_eq!(paths.formulas, Path::new("out").join("Model_Formulas.txt"));
        assert_eq!(paths.coefficients, Some(PathBuf::from("c.json")));
    }
}
