use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use afl_tipster::config::Settings;
use afl_tipster::history::{NewPrediction, RoundId};
use afl_tipster::logging;
use afl_tipster::persist::JsonFileStore;
use afl_tipster::results_feed::SquiggleFeed;
use afl_tipster::tracker::{ReconcileOutcome, Tracker};

#[derive(Debug, Parser)]
#[command(name = "afl_tipster", about = "Weekly AFL tips: history and accuracy tracking")]
struct Cli {
    /// History file (overrides TIPSTER_HISTORY_PATH).
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Competition year (overrides TIPSTER_YEAR).
    #[arg(long, global = true)]
    year: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save a round of generated predictions (JSON array) to the history.
    Record {
        file: PathBuf,
        #[arg(long)]
        round: String,
    },
    /// Fetch completed games and resolve pending predictions.
    CheckResults,
    /// Print the history digest used in the prompt for a fixture.
    History { home: String, away: String },
    /// Print accuracy summary with completed and pending predictions as JSON.
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    logging::init(&settings.log_level, &settings.log_format);

    if let Some(path) = cli.history {
        settings.history_path = path;
    }
    if let Some(year) = cli.year {
        settings.year = year;
    }

    let store = JsonFileStore::open(&settings.history_path)
        .context("no writable location for prediction history")?;
    let tracker = Tracker::new(store);

    match cli.command {
        Command::Record { file, round } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("read predictions from {}", file.display()))?;
            let predictions: Vec<NewPrediction> =
                serde_json::from_str(&raw).context("invalid predictions json")?;
            let round = RoundId::from(round.as_str());
            let (_, report) = tracker.save_predictions(&predictions, &round, settings.year)?;
            println!(
                "saved {} new prediction(s), skipped {} duplicate(s)",
                report.saved, report.skipped
            );
        }
        Command::CheckResults => {
            let feed = SquiggleFeed::new(
                &settings.squiggle_base_url,
                settings.timeout_secs,
                &settings.contact,
            )?;
            match tracker.check_and_update_results(&feed, settings.year)? {
                ReconcileOutcome::NothingPending => println!("no pending predictions to check"),
                ReconcileOutcome::FeedUnavailable => {
                    warn!("results feed unavailable, history left unchanged");
                }
                ReconcileOutcome::Reconciled { updated, summary } => {
                    println!("updated {updated} result(s)");
                    match summary {
                        Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                        None => println!("{{}}"),
                    }
                }
            }
        }
        Command::History { home, away } => {
            println!("{}", tracker.format_history_for_prompt(&home, &away));
        }
        Command::Status => {
            let data = tracker.display_data();
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}
