//! Carveboard CLI - run board scenarios headless and manage board configs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use carveboard::board::Telemetry;
use carveboard::config::BoardConfig;
use carveboard::scenario::{Scenario, ScenarioRunner};

#[derive(Parser)]
#[command(name = "carveboard")]
#[command(about = "Hover-board locomotion simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One human readable line per report
    Text,
    /// One JSON object per board per report
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print board telemetry
    Simulate {
        /// Scenario TOML (default: built-in demo run)
        scenario: Option<PathBuf>,
        /// Board config TOML (default: built-in tuning)
        #[arg(short, long, env = "CARVEBOARD_CONFIG")]
        config: Option<PathBuf>,
        /// Report every N ticks
        #[arg(long, default_value = "10")]
        every: u64,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Load and validate a board config
    Validate {
        /// Path to board.toml
        #[arg(default_value = "board.toml")]
        path: PathBuf,
    },
    /// Print the default board config as TOML
    Defaults,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            scenario,
            config,
            every,
            format,
        } => simulate(scenario.as_deref(), config.as_deref(), every, format),
        Commands::Validate { path } => validate(&path),
        Commands::Defaults => defaults(),
    }
}

// =============================================================================
// Simulate Command
// =============================================================================

fn load_config(path: Option<&Path>) -> Result<BoardConfig> {
    match path {
        Some(path) => BoardConfig::from_file(path)
            .with_context(|| format!("Failed to load board config {}", path.display())),
        None => Ok(BoardConfig::default()),
    }
}

fn simulate(scenario: Option<&Path>, config: Option<&Path>, every: u64, format: OutputFormat) -> Result<()> {
    let config = load_config(config)?;
    let scenario = match scenario {
        Some(path) => Scenario::from_file(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::demo(),
    };

    let mut runner = ScenarioRunner::new(scenario, &config).context("Failed to build simulation")?;
    let every = every.max(1);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut result = Ok(());

    runner.run(|telemetry| {
        if result.is_err() {
            return;
        }
        if let Some(first) = telemetry.first() {
            if first.tick % every == 0 {
                result = report(&mut out, telemetry, format);
            }
        }
    });
    result?;

    if let Some(last) = runner.simulation().telemetry(0) {
        tracing::info!(
            ticks = last.tick,
            speed = last.speed,
            mode = %last.mode,
            "Simulation finished"
        );
    }
    Ok(())
}

fn report(out: &mut impl Write, telemetry: &[Telemetry], format: OutputFormat) -> Result<()> {
    for t in telemetry {
        match format {
            OutputFormat::Text => writeln!(out, "{}", t.summary())?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(t)?)?,
        }
    }
    Ok(())
}

// =============================================================================
// Validate / Defaults Commands
// =============================================================================

fn validate(path: &Path) -> Result<()> {
    let config = BoardConfig::from_file(path)
        .with_context(|| format!("{} is not a valid board config", path.display()))?;
    println!(
        "{} is valid: {} probe(s), rider {}",
        path.display(),
        config.hover.probes.len(),
        if config.balance.is_some() { "on" } else { "off" }
    );
    Ok(())
}

fn defaults() -> Result<()> {
    let text = BoardConfig::default()
        .to_toml_string()
        .context("Failed to render default config")?;
    print!("{}", text);
    Ok(())
}
