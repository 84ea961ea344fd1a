use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

use mymoment::chapters::parse_chapters;
use mymoment::config::Config;
use mymoment::model::Moment;
use mymoment::service::clustering::cluster;
use mymoment::service::guard::{replay, GuardOptions, PlaybackGuard, Reading};
use mymoment::timeline;

mod error;
mod logger;

use error::*;

#[derive(Debug, Parser)]
#[command(name = "mymoment", version, about = "Moment clustering and playback guard tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cluster moments from a JSON array and print the resulting timeline
    Cluster {
        moments: PathBuf,
        /// Video description to take chapter markers from
        #[arg(long)]
        description: Option<PathBuf>,
    },

    /// Run recorded player readings through the playback guard
    Replay {
        readings: PathBuf,
        /// Known duration of the content, in seconds
        #[arg(long)]
        expected: f64,
        /// Start parameter as it would appear in the url, e.g. `45` or `1m30s`
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        disabled: bool,
    },
}

fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env().context(ConfigLoadSnafu)?;

    let _guard = logger::init(&config)?;

    match cli.command {
        Command::Cluster {
            moments,
            description,
        } => {
            let moments: Vec<Moment> = read_json(&moments)?;
            let chapters = match description {
                Some(path) => parse_chapters(&read_text(&path)?),
                None => Vec::new(),
            };

            let clusters = cluster(&moments);
            tracing::info!(
                moments = moments.len(),
                clusters = clusters.len(),
                chapters = chapters.len(),
                "clustered moments"
            );

            write_json(&timeline::merge(clusters, chapters))
        }

        Command::Replay {
            readings,
            expected,
            start,
            disabled,
        } => {
            let readings: Vec<Reading> = read_json(&readings)?;

            let mut options = GuardOptions::new(expected).with_enabled(!disabled);
            if let Some(start) = start {
                options = options.with_start_param(start);
            }

            let mut guard = PlaybackGuard::new(options, config.guard());
            let steps = replay(&mut guard, &readings);
            tracing::info!(readings = readings.len(), state = ?guard.state(), "replayed readings");

            write_json(&steps)
        }
    }
}

fn read_text(path: &Path) -> Result<String, ApplicationError> {
    std::fs::read_to_string(path).context(ReadInputSnafu { path })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApplicationError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).context(ParseInputSnafu { path })
}

fn write_json(value: &impl Serialize) -> Result<(), ApplicationError> {
    let stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(stdout, value).context(WriteOutputSnafu)?;
    println!();
    Ok(())
}
