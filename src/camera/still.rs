//! File-backed frame source
//!
//! Serves a single still image from disk. Used by the `analyze` subcommand
//! and as a hardware-free stand-in during development.

use std::path::PathBuf;

use super::{Frame, FrameSource};
use crate::Result;

/// Frame source that re-reads one image file on every capture
pub struct StillImage {
    path: PathBuf,
}

impl StillImage {
    /// Create a still-image source for the given path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl FrameSource for StillImage {
    async fn capture(&self) -> Result<Frame> {
        let data = tokio::fs::read(&self.path).await?;
        Frame::from_encoded(data)
    }
}
