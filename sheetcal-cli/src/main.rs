mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use sheetcal_core::SheetCalConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetcal")]
#[command(about = "Lay out calendar events on week and month sheets")]
struct Cli {
    /// Read config from this file instead of ~/.config/sheetcal/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Timezone override (IANA name, e.g. "Europe/Budapest")
    #[arg(long, global = true)]
    tz: Option<String>,

    /// Log layout decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the events for a sheet come from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// JSON file with an array of events
    #[arg(long, conflicts_with_all = ["random", "groups"])]
    pub events: Option<PathBuf>,

    /// Generate this many random events
    #[arg(long, conflicts_with = "groups")]
    pub random: Option<usize>,

    /// Seed for --random
    #[arg(long, default_value_t = 42, requires = "random")]
    pub seed: u64,

    /// JSON file with group templates and persisted occurrences
    #[arg(long)]
    pub groups: Option<PathBuf>,

    /// Only show this group (by id), with --groups
    #[arg(long, requires = "groups")]
    pub group: Option<String>,
}

/// Shared options of the sheet commands
#[derive(Args, Debug, Clone)]
pub struct SheetArgs {
    /// Any date inside the period to show (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the placed sheet as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Place events on a week sheet
    Week {
        #[command(flatten)]
        args: SheetArgs,
    },
    /// Place events on a month sheet
    Month {
        #[command(flatten)]
        args: SheetArgs,

        /// List every event of this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,
    },
    /// Expand a weekly rule into occurrences
    Expand {
        /// Cron-style rule, e.g. "0 18 * * 1,3"
        #[arg(long, conflicts_with_all = ["days", "time"])]
        rule: Option<String>,

        /// Weekday names, e.g. "Mon,Wed"
        #[arg(long, value_delimiter = ',', requires = "time")]
        days: Vec<String>,

        /// Start time (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Length of each occurrence (e.g. "1h", "45m")
        #[arg(long, default_value = "1h")]
        duration: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Print occurrences as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show config paths and effective settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file using the system timezone
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Week { args } => {
            let (config, tz) = load_config(cli.config.as_deref(), cli.tz.as_deref())?;
            commands::week::run(&config, tz, args).await
        }
        Commands::Month { args, day } => {
            let (config, tz) = load_config(cli.config.as_deref(), cli.tz.as_deref())?;
            commands::month::run(&config, tz, args, day.as_deref()).await
        }
        Commands::Expand {
            rule,
            days,
            time,
            duration,
            from,
            to,
            json,
        } => {
            let (config, tz) = load_config(cli.config.as_deref(), cli.tz.as_deref())?;
            let rule = commands::expand::parse_rule(rule.as_deref(), &days, time.as_deref())?;
            let range = commands::expand::ExpandRange { from, to, duration };
            commands::expand::run(&config, tz, rule, range, json)
        }
        Commands::Config { action } => match action {
            None => commands::config::run(cli.config.as_deref()),
            Some(ConfigAction::Init { force }) => {
                commands::config::init(cli.config.as_deref(), cli.tz.as_deref(), force)
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config and resolve the timezone, `--tz` winning over the file.
fn load_config(path: Option<&std::path::Path>, tz: Option<&str>) -> Result<(SheetCalConfig, Tz)> {
    let mut config = match path {
        Some(path) => SheetCalConfig::load_from(path)?,
        None => SheetCalConfig::load()?,
    };

    if let Some(tz) = tz {
        config.timezone = tz.to_string();
    }

    let tz = config.tz()?;
    Ok((config, tz))
}
