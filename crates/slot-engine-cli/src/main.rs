//! `slots` CLI: rank meeting times for a JSON scheduling request.
//!
//! ## Usage
//!
//! ```sh
//! # Suggest slots (stdin → stdout)
//! cat request.json | slots suggest
//!
//! # With stored preferences and a tuned engine config
//! slots suggest -i request.json --preferences prefs.json --config engine.json
//!
//! # Show which days a request would search
//! slots window -i request.json
//!
//! # Pipeline logging on stderr (or set RUST_LOG)
//! slots --verbose suggest -i request.json
//! ```

mod request;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slot_engine::{EngineConfig, InMemoryPreferenceStore, SchedulingEngine};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::request::{parse_preferences, RequestFile};

#[derive(Parser)]
#[command(name = "slots", version, about = "Meeting-time suggestion engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration JSON (default preference, weights, limits)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute ranked meeting-time suggestions
    Suggest {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Stored preferences: a JSON object keyed by participant id
        #[arg(long)]
        preferences: Option<String>,
    },
    /// Print the search window a request would use
    Window {
        /// Request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let engine = SchedulingEngine::new(load_config(cli.config.as_deref())?)
        .context("Invalid engine configuration")?;

    match cli.command {
        Commands::Suggest {
            input,
            output,
            preferences,
        } => {
            let request = RequestFile::parse(&read_input(input.as_deref())?)?.into_request()?;
            let store = match preferences.as_deref() {
                Some(path) => parse_preferences(&read_file(path)?)?,
                None => InMemoryPreferenceStore::new(),
            };
            debug!(strategy = request.strategy.name(), "running suggestion pipeline");

            let slots = engine
                .suggest(&store, &request)
                .await
                .context("Failed to compute suggestions")?;
            write_output(output.as_deref(), &serde_json::to_string_pretty(&slots)?)?;
        }
        Commands::Window { input, output } => {
            let request = RequestFile::parse(&read_input(input.as_deref())?)?.into_request()?;
            request.validate().context("Invalid scheduling request")?;
            let window = engine.search_window(&request);
            write_output(output.as_deref(), &serde_json::to_string_pretty(&window)?)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_str(&read_file(path)?)
            .with_context(|| format!("Failed to load config: {}", path)),
        None => Ok(EngineConfig::default()),
    }
}

fn read_file(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => read_file(path),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", content))
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
