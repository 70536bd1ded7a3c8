use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use gearroom_core::Form;
use std::path::PathBuf;

mod commands;
mod config;
mod input;

use config::{Config, LoggingConfig};

#[derive(Debug, Parser)]
#[command(name = "gearroom", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Show the derived state of each booking
    ///
    /// Reads a booking file (a JSON array of spreadsheet rows or stored
    /// records) and prints, for each booking:
    ///
    /// - no-show: the 30 minute grace period passed with nobody checked in
    /// - active: two or more students are still on site
    /// - gear-out: an item left and has not come back or been marked missing
    /// - ready-to-close: somebody showed up, everyone is settled, and all
    ///   gear is accounted for
    Status {
        /// Path to the booking file
        file: PathBuf,

        /// Evaluate as of this instant instead of now (e.g. 2026-03-16T09:45:00Z)
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
    },
    /// Validate bookings and stamp pending server check-out/in times
    Validate {
        /// Path to the booking file
        file: PathBuf,

        /// Write stamped, hashed bookings back to the file
        #[arg(long)]
        write: bool,
    },
    /// Print each booking's content hash
    Hash {
        /// Path to the booking file
        file: PathBuf,
    },
    /// Print bookings as spreadsheet rows
    Export {
        /// Path to the booking file
        file: PathBuf,
    },
    /// Print a fresh booking id
    NewId,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn parse_instant(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    gearroom_core::dates::parse_date_time(text).ok_or_else(|| format!("unrecognized date-time: {}", text))
}

fn setup_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { twyg::LogLevel::Debug } else { logging.level() };
    let opts = twyg::OptsBuilder::new()
        .coloured(logging.coloured)
        .level(level)
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid logging options: {:?}", e))?;
    twyg::setup(opts).map_err(|e| anyhow::anyhow!("Failed to set up logging: {:?}", e))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    setup_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Status { file, at } => {
            commands::show_status(&file, at, &config)?;
        }
        Commands::Validate { file, write } => {
            commands::run_validate(&file, write, &config)?;
        }
        Commands::Hash { file } => {
            commands::show_hashes(&file, &config)?;
        }
        Commands::Export { file } => {
            commands::run_export(&file, &config)?;
        }
        Commands::NewId => {
            println!("{}", Form::create_id());
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
