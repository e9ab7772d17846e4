//! Record subcommand implementation.
//!
//! Handles `smartbin record <CATEGORY>`: appends a hand-picked category to
//! the ledger without classifying a photo.

use super::Context;
use crate::classifier::{ClassificationService, MockClassifier};
use crate::error::CliResult;
use crate::output;
use crate::workflow::ScanWorkflow;
use clap::Parser;
use std::sync::Arc;

/// Record a category without classifying a photo.
#[derive(Parser, Debug)]
pub struct RecordCommand {
    /// Waste category: Paper, Plastic or Organic (any case)
    #[arg(value_name = "CATEGORY")]
    pub category: String,
}

impl RecordCommand {
    /// Execute the record command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx.open_ledger().await?;
        let classifier = Arc::new(ClassificationService::offline(MockClassifier::new()));
        let workflow = ScanWorkflow::new(store, classifier);

        let record = workflow.record_manual(&self.category).await?;

        if !ctx.quiet {
            output::print_success(&format!(
                "Recorded {} as scan #{}",
                record.category, record.id
            ));
        }
        Ok(())
    }
}
