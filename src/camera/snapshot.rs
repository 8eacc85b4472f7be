//! HTTP snapshot camera
//!
//! Fetches a still image from a snapshot URL (IP-webcam style endpoints
//! like `/shot.jpg`). Each `capture` is one GET; no stream is held open.

use super::{Frame, FrameSource};
use crate::{Error, Result};

/// Camera backed by an HTTP still-image endpoint
pub struct SnapshotCamera {
    client: reqwest::Client,
    url: String,
}

impl SnapshotCamera {
    /// Create a snapshot camera for the given URL
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::Config(
                "camera.snapshot_url required for snapshot camera".to_string(),
            ));
        }

        tracing::debug!(url = %url, "snapshot camera initialized");

        Ok(Self {
            client: reqwest::Client::new(),
            url,
        })
    }
}

#[async_trait::async_trait]
impl FrameSource for SnapshotCamera {
    async fn capture(&self) -> Result<Frame> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Camera(format!("snapshot request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Camera(format!("snapshot endpoint returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Camera(format!("snapshot body read failed: {e}")))?;

        let frame = Frame::from_encoded(bytes.to_vec())?;
        tracing::trace!(
            width = frame.width,
            height = frame.height,
            bytes = frame.data.len(),
            "frame captured"
        );
        Ok(frame)
    }
}
