//! Opaque image handles.

use std::fmt;
use std::path::{Path, PathBuf};

/// A handle to image bytes produced by an image source.
///
/// The workflow and classifier never inspect the image itself; the handle
/// only knows where the bytes live and what to call them on upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    path: PathBuf,
}

impl ImageHandle {
    /// Create a handle for a local file or URI-like path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the image bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used for multipart uploads, `image.jpg` when the path has none.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("image.jpg")
            .to_string()
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
