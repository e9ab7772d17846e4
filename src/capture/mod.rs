//! Image acquisition.
//!
//! An [`ImageSource`] turns a user request (camera or library) into an
//! [`ImageHandle`], or reports that the user denied the capability or
//! walked away. Both variants share the same downstream contract.

use crate::error::CaptureError;
use crate::types::ImageHandle;
use async_trait::async_trait;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// How the image is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CaptureKind {
    /// Take a new photo.
    Camera,
    /// Pick an existing photo.
    #[default]
    Library,
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::Library => write!(f, "library"),
        }
    }
}

/// Trait for capability-gated image providers.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Acquire an image, asking for permission first if needed.
    async fn acquire(&self, kind: CaptureKind) -> Result<ImageHandle, CaptureError>;
}

/// Image source backed by a file the user already chose.
///
/// No path means the user dismissed the picker. Permission errors from the
/// OS map to a denied capability.
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    path: Option<PathBuf>,
}

impl FileImageSource {
    /// Create a source that yields `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Create a source for a dismissed picker.
    pub fn dismissed() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn acquire(&self, kind: CaptureKind) -> Result<ImageHandle, CaptureError> {
        let path = self.path.as_ref().ok_or(CaptureError::Cancelled)?;

        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {
                debug!(%kind, path = %path.display(), "image acquired");
                Ok(ImageHandle::new(path.clone()))
            }
            Ok(_) => Err(CaptureError::Unreadable(format!(
                "{} is not a file",
                path.display()
            ))),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(
                CaptureError::PermissionDenied(format!("{} access to {}", kind, path.display())),
            ),
            Err(e) => Err(CaptureError::Unreadable(format!("{}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_file_is_acquired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("can.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let image = FileImageSource::new(&path)
            .acquire(CaptureKind::Library)
            .await
            .unwrap();
        assert_eq!(image.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_dismissed_picker_is_cancelled() {
        let err = FileImageSource::dismissed()
            .acquire(CaptureKind::Camera)
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::Cancelled));
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let err = FileImageSource::new("/no/such/photo.jpg")
            .acquire(CaptureKind::Library)
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::Unreadable(_)));
    }

    #[tokio::test]
    async fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileImageSource::new(dir.path())
            .acquire(CaptureKind::Library)
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::Unreadable(_)));
    }
}
