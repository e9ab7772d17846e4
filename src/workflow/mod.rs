//! Scan workflow - acquisition, classification and recording of one scan.
//!
//! ```text
//! Idle -> Capturing -> Analyzing -> Settled(Classified | Failed) -> Idle
//!   ^         |
//!   +---------+  (denied or cancelled)
//! ```
//!
//! At most one scan is in flight per workflow: a start request while
//! `Capturing` or `Analyzing` is rejected with [`WorkflowError::Busy`]
//! rather than queued. Each completed scan appends exactly one ledger
//! entry; a storage failure after classification settles as `Failed` and
//! writes nothing.

mod state;

pub use state::{FailureSignal, ScanOutcome, Settlement, WorkflowState};

use crate::capture::{CaptureKind, ImageSource};
use crate::classifier::ClassificationService;
use crate::error::WorkflowError;
use crate::storage::{ResultStore, ScanRecord};
use crate::types::{AttemptId, ImageHandle, Source};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, info_span, warn, Instrument};

/// Drives one scan at a time from image acquisition to the ledger.
pub struct ScanWorkflow {
    store: Arc<dyn ResultStore>,
    classifier: Arc<ClassificationService>,
    state: watch::Sender<WorkflowState>,
    /// Manual appends still running; scans are not admitted while non-zero.
    manual_pending: AtomicUsize,
}

impl ScanWorkflow {
    /// Create an idle workflow.
    pub fn new(store: Arc<dyn ResultStore>, classifier: Arc<ClassificationService>) -> Self {
        let (state, _) = watch::channel(WorkflowState::Idle);
        Self {
            store,
            classifier,
            state,
            manual_pending: AtomicUsize::new(0),
        }
    }

    /// Current state.
    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Acquire an image from `source` and run a full scan on it.
    pub async fn start(
        &self,
        source: &dyn ImageSource,
        kind: CaptureKind,
    ) -> Result<ScanOutcome, WorkflowError> {
        let mut guard = self.begin(WorkflowState::Capturing)?;
        let attempt = AttemptId::new();

        async {
            let image = match source.acquire(kind).await {
                Ok(image) => image,
                Err(e) => {
                    info!(%kind, reason = %e, "image acquisition ended without an image");
                    self.state.send_replace(WorkflowState::Idle);
                    guard.disarm();
                    return Err(e.into());
                }
            };

            self.state.send_replace(WorkflowState::Analyzing);
            let result = self.analyze(&image).await;
            guard.disarm();
            result
        }
        .instrument(info_span!("scan", attempt = %attempt.short()))
        .await
    }

    /// Run a scan on an image the caller already holds.
    pub async fn start_with_image(&self, image: ImageHandle) -> Result<ScanOutcome, WorkflowError> {
        let mut guard = self.begin(WorkflowState::Analyzing)?;
        let attempt = AttemptId::new();

        let result = self
            .analyze(&image)
            .instrument(info_span!("scan", attempt = %attempt.short()))
            .await;
        guard.disarm();
        result
    }

    /// Record a category the user picked by hand, without classifying.
    ///
    /// Allowed when idle or right after a successful scan; the state is
    /// left unchanged. Scans requested while the append runs are rejected
    /// with [`WorkflowError::Busy`].
    pub async fn record_manual(&self, category: &str) -> Result<ScanRecord, WorkflowError> {
        let mut admitted = Err(WorkflowError::Busy);
        self.state.send_if_modified(|state| {
            admitted = match state {
                s if s.is_busy() => Err(WorkflowError::Busy),
                WorkflowState::Settled(Settlement::Failed(_)) => {
                    Err(WorkflowError::Unacknowledged)
                }
                _ => {
                    self.manual_pending.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            };
            false
        });
        admitted?;
        let _pending = ManualPending(&self.manual_pending);

        let record = self.store.append(category, Source::Manual).await?;
        info!(id = %record.id, category = %record.category, "category recorded manually");
        Ok(record)
    }

    /// Return a settled workflow to `Idle`, handing back how it settled.
    pub fn acknowledge(&self) -> Option<Settlement> {
        let mut previous = None;
        self.state.send_if_modified(|state| {
            if let WorkflowState::Settled(settlement) = state {
                previous = Some(settlement.clone());
                *state = WorkflowState::Idle;
                true
            } else {
                false
            }
        });
        previous
    }

    /// Atomically move from a start-accepting state to `next`.
    fn begin(&self, next: WorkflowState) -> Result<InFlight<'_>, WorkflowError> {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            if state.accepts_start() && self.manual_pending.load(Ordering::SeqCst) == 0 {
                *state = next;
                accepted = true;
                true
            } else {
                false
            }
        });

        if accepted {
            Ok(InFlight {
                state: &self.state,
                armed: true,
            })
        } else {
            warn!("scan rejected, the workflow is busy");
            Err(WorkflowError::Busy)
        }
    }

    async fn analyze(&self, image: &ImageHandle) -> Result<ScanOutcome, WorkflowError> {
        let classification = match self.classifier.classify(image).await {
            Ok(classification) => classification,
            Err(e) => return Err(self.fail(e.into())),
        };

        let record = match self
            .store
            .append(classification.category.as_str(), classification.source)
            .await
        {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e.into())),
        };

        info!(
            id = %record.id,
            category = %record.category,
            source = %classification.source,
            "scan recorded"
        );

        let outcome = ScanOutcome {
            classification,
            record,
        };
        self.state
            .send_replace(WorkflowState::Settled(Settlement::Classified(outcome.clone())));
        Ok(outcome)
    }

    fn fail(&self, err: WorkflowError) -> WorkflowError {
        warn!(step = ?err.step(), error = %err, "scan failed");
        self.state
            .send_replace(WorkflowState::Settled(Settlement::Failed(FailureSignal::from(&err))));
        err
    }
}

/// Releases a manual append's hold on scan admission.
struct ManualPending<'a>(&'a AtomicUsize);

impl Drop for ManualPending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Resets the workflow to `Idle` if a scan future is dropped mid-flight.
struct InFlight<'a> {
    state: &'a watch::Sender<WorkflowState>,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("scan abandoned before it settled");
            self.state.send_replace(WorkflowState::Idle);
        }
    }
}
