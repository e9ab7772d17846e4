//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `smartbin init` - Create directories, settings and the ledger
//! - `smartbin scan --image <PATH>` - Classify a photo and record it
//! - `smartbin record <CATEGORY>` - Record a category picked by hand
//! - `smartbin history` - View the scan ledger
//! - `smartbin weather` - Show current weather

mod history;
mod init;
mod record;
mod scan;
mod weather;

pub use history::HistoryCommand;
pub use init::InitCommand;
pub use record::RecordCommand;
pub use scan::ScanCommand;
pub use weather::WeatherCommand;

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::storage::{ResultStore, SqliteStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// SmartBin - classify waste photos and keep a ledger of scans.
///
/// Photos are sent to a classification service; when it is unreachable a
/// local fallback answers instead, so every scan ends with a category.
#[derive(Parser, Debug)]
#[command(name = "smartbin")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Waste photo classification and scan history", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the scan ledger database
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create directories, default settings and the ledger schema
    Init(InitCommand),

    /// Classify a photo and record the result
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Record a category without classifying a photo
    #[command(alias = "r")]
    Record(RecordCommand),

    /// View scan history
    #[command(alias = "h")]
    History(HistoryCommand),

    /// Show current weather
    #[command(alias = "w")]
    Weather(WeatherCommand),
}

impl Cli {
    /// Resolve settings and run the selected subcommand.
    pub async fn run(self) -> CliResult<()> {
        let ctx = Context::resolve(&self)?;
        debug!(
            settings = %ctx.settings_file.display(),
            database = %ctx.database.display(),
            "context resolved"
        );

        match &self.command {
            Commands::Init(cmd) => cmd.execute(&ctx).await,
            Commands::Scan(cmd) => cmd.execute(&ctx).await,
            Commands::Record(cmd) => cmd.execute(&ctx).await,
            Commands::History(cmd) => cmd.execute(&ctx).await,
            Commands::Weather(cmd) => cmd.execute(&ctx).await,
        }
    }
}

/// Settings and locations shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: Paths,
    pub settings: AppSettings,
    pub settings_file: PathBuf,
    pub database: PathBuf,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    fn resolve(cli: &Cli) -> CliResult<Self> {
        let paths = Paths::resolve()?;
        Self::with_paths(cli, paths)
    }

    fn with_paths(cli: &Cli, paths: Paths) -> CliResult<Self> {
        let settings_file = cli.config.clone().unwrap_or_else(|| paths.settings_file());
        let settings = if settings_file.exists() {
            AppSettings::load_from(&settings_file)?
        } else {
            AppSettings::default()
        };
        let database = cli
            .database
            .clone()
            .unwrap_or_else(|| settings.database_file(&paths));

        Ok(Self {
            paths,
            settings,
            settings_file,
            database,
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// Open the ledger and make sure its schema exists.
    pub async fn open_ledger(&self) -> CliResult<Arc<SqliteStore>> {
        let store = SqliteStore::open(&self.database)?;
        store.initialize().await?;
        Ok(Arc::new(store))
    }
}
