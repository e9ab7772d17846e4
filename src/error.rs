//! Error types for smartbin.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer owns an
//! error enum; the workflow folds them into [`WorkflowError`], which names
//! the step that failed.

use crate::types::CategoryError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the scan ledger.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write scan record: {0}")]
    WriteFailed(String),

    #[error("failed to read scan history: {0}")]
    ReadFailed(String),

    #[error(transparent)]
    InvalidCategory(#[from] CategoryError),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while classifying an image.
///
/// Everything except [`ClassifyError::Unavailable`] describes a failed
/// remote attempt and is recovered by the fallback generator.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("classifier returned HTTP {0}")]
    Status(u16),

    #[error("malformed classifier response: {0}")]
    Malformed(String),

    #[error("classifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("classification unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Errors raised while acquiring an image.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("image acquisition cancelled")]
    Cancelled,

    #[error("image could not be read: {0}")]
    Unreadable(String),
}

/// The step of a scan that produced a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
    Acquisition,
    Classification,
    Recording,
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition => write!(f, "acquisition"),
            Self::Classification => write!(f, "classification"),
            Self::Recording => write!(f, "recording"),
        }
    }
}

/// Errors surfaced by the scan workflow to the presentation layer.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("a scan is already in progress")]
    Busy,

    #[error("the previous scan failed and has not been acknowledged")]
    Unacknowledged,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("image acquisition cancelled")]
    Cancelled,

    #[error("image could not be read: {0}")]
    AcquisitionFailed(String),

    #[error(transparent)]
    Classification(ClassifyError),

    #[error(transparent)]
    InvalidCategory(CategoryError),

    #[error(transparent)]
    Storage(StorageError),
}

impl WorkflowError {
    /// The failed step, or `None` when the request was rejected outright.
    pub fn step(&self) -> Option<FailedStep> {
        match self {
            Self::Busy | Self::Unacknowledged => None,
            Self::PermissionDenied(_) | Self::Cancelled | Self::AcquisitionFailed(_) => {
                Some(FailedStep::Acquisition)
            }
            Self::Classification(_) => Some(FailedStep::Classification),
            Self::InvalidCategory(_) | Self::Storage(_) => Some(FailedStep::Recording),
        }
    }

    /// Whether the user can simply try again (re-prompt or re-pick).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Busy | Self::Unacknowledged | Self::PermissionDenied(_) | Self::Cancelled
        )
    }
}

impl From<CaptureError> for WorkflowError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied(reason) => Self::PermissionDenied(reason),
            CaptureError::Cancelled => Self::Cancelled,
            CaptureError::Unreadable(reason) => Self::AcquisitionFailed(reason),
        }
    }
}

impl From<StorageError> for WorkflowError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidCategory(e) => Self::InvalidCategory(e),
            other => Self::Storage(other),
        }
    }
}

impl From<ClassifyError> for WorkflowError {
    fn from(err: ClassifyError) -> Self {
        Self::Classification(err)
    }
}

impl From<CategoryError> for WorkflowError {
    fn from(err: CategoryError) -> Self {
        Self::InvalidCategory(err)
    }
}

/// Errors from configuration loading and saving.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for CLI command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{step} failed: {source}")]
    Scan {
        step: FailedStep,
        #[source]
        source: WorkflowError,
    },

    #[error(transparent)]
    Workflow(WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<WorkflowError> for CliError {
    fn from(err: WorkflowError) -> Self {
        match err.step() {
            Some(step) => Self::Scan { step, source: err },
            None => Self::Workflow(err),
        }
    }
}

/// Result type alias for CLI handlers.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_steps() {
        assert_eq!(WorkflowError::Busy.step(), None);
        assert_eq!(
            WorkflowError::Cancelled.step(),
            Some(FailedStep::Acquisition)
        );
        assert_eq!(
            WorkflowError::Classification(ClassifyError::Unavailable("x".into())).step(),
            Some(FailedStep::Classification)
        );
        assert_eq!(
            WorkflowError::Storage(StorageError::WriteFailed("disk full".into())).step(),
            Some(FailedStep::Recording)
        );
    }

    #[test]
    fn test_invalid_category_is_lifted_out_of_storage() {
        let err: WorkflowError =
            StorageError::InvalidCategory(CategoryError::Unknown("Glass".into())).into();
        assert!(matches!(err, WorkflowError::InvalidCategory(_)));
        assert_eq!(err.step(), Some(FailedStep::Recording));
    }

    #[test]
    fn test_cli_error_names_failed_step() {
        let err: CliError = WorkflowError::Storage(StorageError::WriteFailed("locked".into())).into();
        assert_eq!(
            err.to_string(),
            "recording failed: failed to write scan record: locked"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(WorkflowError::PermissionDenied("camera".into()).is_recoverable());
        assert!(WorkflowError::Cancelled.is_recoverable());
        assert!(!WorkflowError::Storage(StorageError::ReadFailed("x".into())).is_recoverable());
    }
}
