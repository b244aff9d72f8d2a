//! Gridiron CLI binary.
//!
//! Fits quarterback models on a training directory, or applies published
//! coefficients to new seasons.

use clap::{Parser, Subcommand};
use gridiron::data::{InputPaths, PercentScale};
use gridiron::output::PerformerSummary;
use gridiron::pipeline::{self, ModelSource, OutputPaths, PipelineConfig, PipelineOutput};
use gridiron::TeamAliases;
use std::path::{Path, PathBuf};
use std::io::{self, Write};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Gridiron: quarterback performance against team context", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit QBR and RTG models and write all reports
    Fit {
        /// Directory holding the five team tables and QB.csv
        #[arg(long)]
        data_dir: PathBuf,

        /// Directory for the reports
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// How percentage cells are read
        #[arg(long, default_value_t = PercentScale::AsIs)]
        percent_scale: PercentScale,

        /// CSV of `alias,canonical` team names
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Save the fitted coefficients as JSON for later `apply` runs
        #[arg(long)]
        save_coefficients: Option<PathBuf>,

        /// Number of over- and under-performers to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Score players with published coefficients, without fitting
    Apply {
        /// Coefficient set (JSON)
        #[arg(long)]
        coefficients: PathBuf,

        /// Directory for the augmented player table
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Directory holding the five team tables and QB.csv
        #[arg(long, conflicts_with = "season_table", required_unless_present = "season_table")]
        data_dir: Option<PathBuf>,

        /// Single-season table with one column per metric
        #[arg(long, requires_all = ["year", "players"])]
        season_table: Option<PathBuf>,

        /// Season of the snapshot table
        #[arg(long)]
        year: Option<i32>,

        /// Quarterback table for the snapshot season
        #[arg(long)]
        players: Option<PathBuf>,

        /// How percentage cells are read
        #[arg(long, default_value_t = PercentScale::AsIs)]
        percent_scale: PercentScale,

        /// CSV of `alias,canonical` team names
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Number of over- and under-performers to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fit {
            data_dir,
            out_dir,
            percent_scale,
            aliases,
            save_coefficients,
            top,
        } => {
            let mut outputs = OutputPaths::in_dir(&out_dir);
            if let Some(path) = save_coefficients {
                outputs = outputs.with_coefficients(path);
            }
            let mut config = PipelineConfig::new(InputPaths::from_dir(&data_dir), outputs);
            config.percent_scale = percent_scale;
            config.aliases = load_aliases(aliases.as_deref())?;

            let output = execute(&config, "Fitting QBR and RTG models")?;
            print_model_summary(&output);
            println!("{}", PerformerSummary::from_scored(&output.scored, top).to_ascii_table());
        }
        Commands::Apply {
            coefficients,
            out_dir,
            data_dir,
            season_table,
            year,
            players,
            percent_scale,
            aliases,
            top,
        } => {
            let inputs = match (data_dir, season_table, year, players) {
                (Some(dir), _, _, _) => InputPaths::from_dir(&dir),
                (None, Some(table), Some(year), Some(players)) => {
                    InputPaths::season(table, year, players)
                }
                _ => return Err("apply needs --data-dir or --season-table with --year and --players".into()),
            };

            begin_stage(&format!("Loading coefficients from {}", coefficients.display()))?;
            let source = ModelSource::published_from_file(&coefficients)?;
            println!(" ✓");

            let mut config = PipelineConfig::new(inputs, OutputPaths::in_dir(&out_dir));
            config.percent_scale = percent_scale;
            config.aliases = load_aliases(aliases.as_deref())?;
            config.source = source;

            let output = execute(&config, "Applying published coefficients")?;
            println!("{}", PerformerSummary::from_scored(&output.scored, top).to_ascii_table());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print a stage label and flush, so it shows before the stage's work starts.
fn begin_stage(label: &str) -> io::Result<()> {
    write_stage(&mut io::stdout(), label)
}

fn write_stage<W: Write>(out: &mut W, label: &str) -> io::Result<()> {
    write!(out, "{}...", label)?;
    out.flush()
}

fn load_aliases(path: Option<&Path>) -> Result<TeamAliases, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            begin_stage("Loading team aliases")?;
            let aliases = TeamAliases::load(path)?;
            println!(" ✓ ({} aliases)", aliases.len());
            Ok(aliases)
        }
        None => Ok(TeamAliases::default()),
    }
}

fn execute(
    config: &PipelineConfig,
    model_stage: &str,
) -> Result<PipelineOutput, Box<dyn std::error::Error>> {
    begin_stage(&format!("Loading input tables (percent scale: {})", config.percent_scale))?;
    let inputs = pipeline::load(config)?;
    println!(
        " ✓ ({} player-seasons, {} team metric values)",
        inputs.players.len(),
        inputs.metrics.len()
    );

    begin_stage(model_stage)?;
    let output = pipeline::compute(config, &inputs)?;
    println!(
        " ✓ ({} of {} player-seasons scored)",
        output.scored.len(),
        output.joined
    );
    if !output.unmatched.is_empty() {
        println!(
            "  {} team-seasons matched no team table (see warnings)",
            output.unmatched.len()
        );
    }

    begin_stage("Writing reports")?;
    let written = pipeline::write(&output, &config.outputs)?;
    println!(" ✓");
    for path in written {
        println!("  {}", path.display());
    }

    Ok(output)
}

fn print_model_summary(output: &PipelineOutput) {
    let Some(models) = &output.models else {
        return;
    };

    println!("\nModel Fit:");
    println!("{}", "-".repeat(80));
    println!(
        "{:<8} {:>12} {:>12} {:>14}",
        "Target", "R-squared", "Adj. R²", "Observations"
    );
    for model in [&models.qbr, &models.rtg] {
        println!(
            "{:<8} {:>12.4} {:>12.4} {:>14}",
            model.formula.target, model.r_squared, model.adjusted_r_squared, model.n_observations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[derive(Default)]
    struct Recorder {
        text: Vec<u8>,
        flushed: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.text.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed = self.text.len();
            Ok(())
        }
    }

    #[test]
    fn test_stage_label_is_flushed() {
        let mut out = Recorder::default();
        write_stage(&mut out, "Writing reports").unwrap();
        assert_eq!(out.text, b"Writing reports...");
        assert_eq!(out.flushed, out.text.len());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fit_defaults() {
        let cli = Cli::try_parse_from(["gridiron", "fit", "--data-dir", "Training Data"]).unwrap();
        let Commands::Fit {
            percent_scale, top, out_dir, ..
        } = cli.command
        else {
            panic!("expected fit");
        };
        assert_eq!(percent_scale, PercentScale::AsIs);
        assert_eq!(top, 10);
        assert_eq!(out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_apply_requires_an_input() {
        assert!(Cli::try_parse_from(["gridiron", "apply", "--coefficients", "c.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "gridiron",
                "apply",
                "--coefficients",
                "c.json",
                "--season-table",
                "2025.csv"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "gridiron",
                "apply",
                "--coefficients",
                "c.json",
                "--season-table",
                "2025.csv",
                "--year",
                "2025",
                "--players",
                "QB 2025.csv",
                "--percent-scale",
                "fraction"
            ])
            .is_ok()
        );
    }
}
