//! History subcommand implementation.
//!
//! Handles `smartbin history`: lists the ledger newest first, optionally
//! filtered by category name, or summarises it per category.

use super::Context;
use crate::error::CliResult;
use crate::output::{self, OutputFormat, TimeDisplay};
use crate::storage::{CategoryStats, ResultStore, ScanRecord};
use clap::Parser;
use std::io::Write;

/// View scan history.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Only show categories whose name contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Number of recent scans to show
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Show times in the local time zone instead of UTC
    #[arg(long)]
    pub local_time: bool,

    /// Show per-category counts instead of individual scans
    #[arg(long)]
    pub stats: bool,
}

impl HistoryCommand {
    /// Execute the history command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx.open_ledger().await?;
        let records = self.fetch(&*store).await?;
        self.write(&records, &mut std::io::stdout().lock())
    }

    async fn fetch(&self, store: &dyn ResultStore) -> CliResult<Vec<ScanRecord>> {
        Ok(store.list(self.filter.as_deref()).await?)
    }

    fn write<W: Write>(&self, records: &[ScanRecord], out: &mut W) -> CliResult<()> {
        if self.stats {
            output::write_stats(out, &CategoryStats::from_records(records), self.format)?;
            return Ok(());
        }

        output::write_history(
            out,
            self.limit(records),
            self.format,
            TimeDisplay::from_local_flag(self.local_time),
        )?;
        Ok(())
    }

    fn limit<'a>(&self, records: &'a [ScanRecord]) -> &'a [ScanRecord] {
        match self.count {
            Some(n) => &records[..n.min(records.len())],
            None => records,
        }
    }
}
