//! Workflow states.

use crate::classifier::ClassificationResult;
use crate::error::{FailedStep, WorkflowError};
use crate::storage::ScanRecord;
use serde::Serialize;
use std::fmt;

/// A completed, persisted scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    /// What the classifier said.
    pub classification: ClassificationResult,
    /// The ledger entry written for it.
    pub record: ScanRecord,
}

/// Summary of a surfaced error, kept in the observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSignal {
    pub step: FailedStep,
    pub message: String,
}

impl From<&WorkflowError> for FailureSignal {
    fn from(err: &WorkflowError) -> Self {
        Self {
            step: err.step().unwrap_or(FailedStep::Recording),
            message: err.to_string(),
        }
    }
}

/// How a scan attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Classified(ScanOutcome),
    Failed(FailureSignal),
}

/// Observable state of a [`ScanWorkflow`](super::ScanWorkflow).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    /// No image held.
    #[default]
    Idle,
    /// Waiting for the user to grant access and pick or take a photo.
    Capturing,
    /// One classification is outstanding.
    Analyzing,
    /// The last attempt finished; waiting for acknowledgment or a new start.
    Settled(Settlement),
}

impl WorkflowState {
    /// Whether a new scan may begin from this state.
    pub fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Settled(_))
    }

    /// Whether a scan is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Capturing | Self::Analyzing)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Capturing => write!(f, "capturing"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Settled(Settlement::Classified(_)) => write!(f, "classified"),
            Self::Settled(Settlement::Failed(signal)) => write!(f, "failed ({})", signal.step),
        }
    }
}
