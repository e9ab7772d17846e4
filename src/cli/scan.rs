//! Scan subcommand implementation.
//!
//! Handles the `smartbin scan --image <PATH>` command: acquires the photo,
//! classifies it (remote first, fallback always) and appends the result to
//! the ledger.

use super::Context;
use crate::capture::{CaptureKind, FileImageSource};
use crate::classifier::{ClassificationService, MockClassifier, RemoteClassifier};
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::{self, OutputFormat, TimeDisplay};
use crate::types::Source;
use crate::workflow::ScanWorkflow;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Classify a photo and record the result.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Photo to classify (omit to cancel at the picker)
    #[arg(short, long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Treat the photo as freshly taken with the camera
    #[arg(long)]
    pub camera: bool,

    /// Skip the classification service and use the local fallback
    #[arg(long)]
    pub offline: bool,

    /// Upper bound on the classification request in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Base URL of the classification service
    #[arg(long, env = "SMARTBIN_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Output format for the result
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Show times in the local time zone instead of UTC
    #[arg(long)]
    pub local_time: bool,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx.open_ledger().await?;
        let service = Arc::new(self.build_service(&ctx.settings));
        let workflow = ScanWorkflow::new(store, service);

        let source = match &self.image {
            Some(path) => FileImageSource::new(path.clone()),
            None => FileImageSource::dismissed(),
        };
        let kind = if self.camera {
            CaptureKind::Camera
        } else {
            CaptureKind::Library
        };

        let spinner = (!ctx.quiet && self.format == OutputFormat::Plain).then(analysis_spinner);
        let watcher = spinner.clone().map(|pb| {
            let mut states = workflow.subscribe();
            tokio::spawn(async move {
                while states.changed().await.is_ok() {
                    let state = states.borrow_and_update().to_string();
                    pb.set_message(format!("{}...", state));
                }
            })
        });

        let result = workflow.start(&source, kind).await;

        if let Some(watcher) = watcher {
            watcher.abort();
        }
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let outcome = result?;

        if outcome.classification.source == Source::Fallback
            && !ctx.quiet
            && self.format == OutputFormat::Plain
        {
            output::print_warning("classification service unavailable, showing a local estimate");
        }

        output::print_outcome(
            &outcome,
            self.format,
            TimeDisplay::from_local_flag(self.local_time),
        )?;

        Ok(())
    }

    fn build_service(&self, settings: &AppSettings) -> ClassificationService {
        let timeout = self
            .timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.classify_timeout());
        let fallback = MockClassifier::new().with_delay(settings.fallback_delay());

        let base_url = self
            .api_url
            .as_deref()
            .or(settings.api_base_url.as_deref())
            .filter(|url| !url.trim().is_empty());

        let service = match base_url {
            Some(url) if !self.offline => match RemoteClassifier::new(url, timeout) {
                Ok(remote) => ClassificationService::new(Arc::new(remote), fallback),
                Err(e) => {
                    warn!(error = %e, "could not build classifier client, working offline");
                    ClassificationService::offline(fallback)
                }
            },
            _ => ClassificationService::offline(fallback),
        };

        service.with_timeout(timeout)
    }
}

fn analysis_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("starting...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
