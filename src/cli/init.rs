//! Init subcommand implementation.
//!
//! Handles the `smartbin init` command: creates the data and configuration
//! directories, writes default settings and prepares the ledger schema.

use super::Context;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use clap::Parser;

/// Create directories, default settings and the ledger schema.
#[derive(Parser, Debug)]
pub struct InitCommand {
    /// Overwrite an existing settings file with defaults
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        ctx.paths.ensure()?;

        if self.force || !ctx.settings_file.exists() {
            let settings = if self.force {
                AppSettings::default()
            } else {
                ctx.settings.clone()
            };
            settings.save_to(&ctx.settings_file)?;
            if !ctx.quiet {
                output::print_success(&format!(
                    "Wrote settings to {}",
                    ctx.settings_file.display()
                ));
            }
        } else if !ctx.quiet {
            output::print_info(&format!(
                "Keeping existing settings at {}",
                ctx.settings_file.display()
            ));
        }

        ctx.open_ledger().await?;
        if !ctx.quiet {
            output::print_success(&format!("Scan ledger ready at {}", ctx.database.display()));
        }

        Ok(())
    }
}
