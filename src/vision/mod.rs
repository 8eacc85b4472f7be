//! Vision query client
//!
//! One outbound call per tick to the vision proxy. No retry, no timeout
//! beyond the transport default — retry happens implicitly on the next
//! scheduled tick.

mod client;

pub use client::VisionClient;

use crate::camera::Frame;
use crate::Result;

/// Unstructured response from the vision model
#[derive(Debug, Clone)]
pub struct VisionReply {
    /// Main response text (free-form; schema is suggested, not enforced)
    pub text: String,
    /// Auxiliary scene description from the debug pass, when available
    pub debug_description: Option<String>,
}

/// Client for the remote vision model
#[async_trait::async_trait]
pub trait VisionApi: Send + Sync {
    /// Send a frame and prompt, returning the model's response text
    async fn analyze(&self, frame: &Frame, prompt: &str) -> Result<VisionReply>;
}
