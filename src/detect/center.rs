//! Auto-center control loop
//!
//! Fixed-interval polling: capture → query → parse → act. A failed capture
//! or query is just a skipped tick; there is no tick limit — the stall
//! override in the parser is the only guaranteed bailout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::camera::{Frame, FrameSource};
use crate::detect::{DetectionResult, Parser};
use crate::prompt::centering_prompt;
use crate::speech::Speaker;
use crate::vision::VisionApi;
use crate::Result;

/// Feedback shown when the model claims non-visibility but its own scene
/// description mentions the target
const OFF_CENTER_FEEDBACK: &str =
    "Object detected, but not centered. Move it to the center of the frame.";

/// Feedback spoken when the photo is taken
pub const PHOTO_TAKEN_FEEDBACK: &str = "Photo taken! The object is well framed.";

/// Outcome of a single tick
#[derive(Debug)]
pub enum TickOutcome {
    /// Capture unavailable or query failed; nothing surfaced, retry next tick
    Skipped,
    /// Feedback emitted, loop keeps ticking
    Continue(String),
    /// Object centered; final photo captured
    Captured(Frame),
}

/// The auto-center control loop for one target description
pub struct CenterLoop {
    camera: Arc<dyn FrameSource>,
    vision: Arc<dyn VisionApi>,
    interval: Duration,
    target: String,
    parser: Parser,
}

impl CenterLoop {
    /// Create a loop for a target; the response history starts empty
    #[must_use]
    pub fn new(
        camera: Arc<dyn FrameSource>,
        vision: Arc<dyn VisionApi>,
        interval: Duration,
        target: impl Into<String>,
    ) -> Self {
        Self {
            camera,
            vision,
            interval,
            target: target.into(),
            parser: Parser::new(),
        }
    }

    /// The target description being centered
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Run until the object is centered or shutdown is requested
    ///
    /// Returns the captured photo, or `None` on shutdown. Shutdown during a
    /// tick cancels the in-flight query at the select point; a late result
    /// is dropped, never applied.
    ///
    /// # Errors
    ///
    /// This loop absorbs per-tick failures; only a closed speaker/channel
    /// fault could surface, and feedback errors are logged instead.
    pub async fn run(
        &mut self,
        speaker: &mut dyn Speaker,
        shutdown: &mut mpsc::Receiver<()>,
    ) -> Result<Option<Frame>> {
        tracing::info!(target = %self.target, interval = ?self.interval, "auto-center loop started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("auto-center loop stopped");
                    return Ok(None);
                }
                () = tokio::time::sleep(self.interval) => {}
            }

            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::debug!("dropping in-flight query");
                    return Ok(None);
                }
                outcome = self.tick(speaker) => {
                    if let TickOutcome::Captured(photo) = outcome {
                        return Ok(Some(photo));
                    }
                }
            }
        }
    }

    /// One iteration: capture → query → parse → act
    pub async fn tick(&mut self, speaker: &mut dyn Speaker) -> TickOutcome {
        let frame = match self.camera.capture().await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "capture unavailable, skipping tick");
                return TickOutcome::Skipped;
            }
        };

        let prompt = centering_prompt(&self.target);
        let reply = match self.vision.analyze(&frame, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "vision query failed, skipping tick");
                return TickOutcome::Skipped;
            }
        };

        let detection = self.parser.classify(&reply.text);
        tracing::debug!(detection = %detection, "tick classified");

        match detection {
            DetectionResult::Ready { forced, .. } => {
                if forced {
                    tracing::info!("capture forced after repeated responses");
                }
                // Final photo: a fresh frame, falling back to the one just analyzed
                let photo = self.camera.capture().await.unwrap_or(frame);
                self.speak(speaker, PHOTO_TAKEN_FEEDBACK).await;
                TickOutcome::Captured(photo)
            }
            DetectionResult::NotVisible => {
                let feedback = if self.target_in_description(reply.debug_description.as_deref()) {
                    OFF_CENTER_FEEDBACK.to_string()
                } else {
                    "not visible".to_string()
                };
                self.speak(speaker, &feedback).await;
                TickOutcome::Continue(feedback)
            }
            DetectionResult::Directional { command, .. } => {
                self.speak(speaker, &command).await;
                TickOutcome::Continue(command)
            }
            DetectionResult::Unparsed(raw) => {
                let feedback = raw.trim().to_string();
                self.speak(speaker, &feedback).await;
                TickOutcome::Continue(feedback)
            }
        }
    }

    /// Cross-check: the model said "not visible" but its own description
    /// mentions the target phrase
    fn target_in_description(&self, description: Option<&str>) -> bool {
        description.is_some_and(|d| {
            !self.target.is_empty() && d.to_lowercase().contains(&self.target.to_lowercase())
        })
    }

    /// Speak feedback; a speech failure never fails the tick
    async fn speak(&self, speaker: &mut dyn Speaker, text: &str) {
        if let Err(e) = speaker.speak(text).await {
            tracing::warn!(error = %e, "feedback speech failed");
        }
    }
}
