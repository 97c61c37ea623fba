//! Image analyzer port - camera frames in, cat verdicts out
//!
//! The classification algorithm is not part of the security system. The
//! service hands each frame to an [`ImageAnalyzer`] together with the
//! confidence threshold and only looks at the boolean verdict.

pub mod fake;

pub use fake::FakeImageAnalyzer;

use std::fmt;
use std::path::Path;

use crate::{CatpointError, Result};

/// Minimum confidence (percent) for a frame to count as containing a cat
pub const CAT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// A camera frame, kept as the encoded bytes the camera produced
#[derive(Clone, PartialEq, Eq)]
pub struct CameraImage {
    bytes: Vec<u8>,
    source: Option<String>,
}

impl CameraImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            source: None,
        }
    }

    /// Label the frame with where it came from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Read a frame from disk. Empty files are rejected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| CatpointError::UnreadableImage(format!("{}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(CatpointError::UnreadableImage(format!(
                "{}: file is empty",
                path.display()
            )));
        }
        Ok(Self::new(bytes).with_source(path.display().to_string()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for CameraImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraImage")
            .field("len", &self.bytes.len())
            .field("source", &self.source)
            .finish()
    }
}

/// Port for deciding whether a frame shows a cat
pub trait ImageAnalyzer {
    /// Returns `true` when a cat is present with at least
    /// `confidence_threshold` percent confidence.
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool>;
}
