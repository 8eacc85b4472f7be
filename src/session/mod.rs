//! Voice-driven session state machine
//!
//! Wraps the auto-center loop in the wake-word → description → detection →
//! photo → reset cycle. The session owns the speech input, the voice, and
//! the loop, so at most one listener or timer is active at any instant —
//! activating a state's resource is what deactivates the previous one.
//!
//! Every failure path recovers to `AwaitingWakeWord`; the session is
//! designed to run indefinitely with no explicit stop.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::camera::{Frame, FrameSource};
use crate::config::AssistantConfig;
use crate::detect::CenterLoop;
use crate::speech::{Speaker, SpeechInput};
use crate::vision::VisionApi;
use crate::Result;

/// Session states; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet started
    Idle,
    /// Continuous wake-word listening
    AwaitingWakeWord,
    /// One-shot dictation for the target description
    AwaitingDescription,
    /// Auto-center loop running
    AutoDetecting,
    /// Photo taken; about to reset
    Captured,
}

/// Events surfaced to the UI/front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved to a new state
    StateChanged(SessionState),
    /// User-facing feedback text (also spoken)
    Feedback(String),
    /// A photo was captured; held in memory only
    PhotoTaken { width: u32, height: u32 },
}

/// The voice-driven assistant session
pub struct Session {
    config: AssistantConfig,
    input: Box<dyn SpeechInput>,
    speaker: Box<dyn Speaker>,
    camera: Arc<dyn FrameSource>,
    vision: Arc<dyn VisionApi>,
    state: SessionState,
    target: Option<String>,
    last_photo: Option<Frame>,
    events: Option<mpsc::Sender<SessionEvent>>,
}

impl Session {
    /// Create a session; starts in `Idle`
    #[must_use]
    pub fn new(
        config: AssistantConfig,
        input: Box<dyn SpeechInput>,
        speaker: Box<dyn Speaker>,
        camera: Arc<dyn FrameSource>,
        vision: Arc<dyn VisionApi>,
    ) -> Self {
        Self {
            config,
            input,
            speaker,
            camera,
            vision,
            state: SessionState::Idle,
            target: None,
            last_photo: None,
            events: None,
        }
    }

    /// Attach an event channel for UI updates
    #[must_use]
    pub fn with_events(mut self, events: mpsc::Sender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The most recent captured photo, if any
    #[must_use]
    pub fn last_photo(&self) -> Option<&Frame> {
        self.last_photo.as_ref()
    }

    /// Run the session until shutdown is requested
    ///
    /// # Errors
    ///
    /// Input/speech failures are absorbed and recovered; only a failure to
    /// start the very first wake listening attempt repeatedly is surfaced
    /// in logs, never as a fatal error.
    pub async fn run(&mut self, shutdown: &mut mpsc::Receiver<()>) -> Result<()> {
        let wake_word = self.config.wake_word.clone();

        loop {
            match self.state {
                SessionState::Idle => {
                    let _ = self
                        .speaker
                        .speak(&format!("Say '{wake_word}' to begin."))
                        .await;
                    self.set_state(SessionState::AwaitingWakeWord);
                }

                SessionState::AwaitingWakeWord => {
                    let transcript = tokio::select! {
                        _ = shutdown.recv() => return Ok(()),
                        result = self.input.wait_for_wake(&wake_word) => result,
                    };

                    match transcript {
                        Ok(transcript) => {
                            if !self.on_wake_transcript(&transcript) {
                                tracing::debug!(transcript = %transcript, "wake check did not match");
                            }
                        }
                        Err(e) => {
                            // Mic unavailable or permission denied; keep the
                            // session alive and retry after a pause
                            tracing::warn!(error = %e, "wake listening failed");
                            tokio::select! {
                                _ = shutdown.recv() => return Ok(()),
                                () = tokio::time::sleep(self.config.restart_delay) => {}
                            }
                        }
                    }
                }

                SessionState::AwaitingDescription => {
                    let _ = self
                        .speaker
                        .speak_and_wait("How can I help? Please describe what you want to find.")
                        .await;

                    let dictation = tokio::select! {
                        _ = shutdown.recv() => return Ok(()),
                        result = self.input.listen_once() => result,
                    };

                    let description = match dictation {
                        Ok(d) => d.trim().to_string(),
                        Err(e) => {
                            tracing::warn!(error = %e, "dictation failed");
                            String::new()
                        }
                    };

                    if description.is_empty() {
                        let _ = self
                            .speaker
                            .speak_and_wait(&format!(
                                "Sorry, I didn't catch that. Please say '{wake_word}' to try again."
                            ))
                            .await;
                        self.set_state(SessionState::AwaitingWakeWord);
                    } else {
                        tracing::info!(target = %description, "target description captured");
                        self.emit(SessionEvent::Feedback(format!(
                            "Starting detection for: {description}"
                        )));
                        let _ = self
                            .speaker
                            .speak_and_wait(&format!("Starting detection for: {description}"))
                            .await;
                        self.target = Some(description);

                        tokio::select! {
                            _ = shutdown.recv() => return Ok(()),
                            () = tokio::time::sleep(self.config.detect_start_delay) => {}
                        }
                        self.set_state(SessionState::AutoDetecting);
                    }
                }

                SessionState::AutoDetecting => {
                    // Invariant: never auto-detect without a target
                    let Some(target) = self.target.clone().filter(|t| !t.is_empty()) else {
                        tracing::warn!("entered auto-detect without a target, recovering");
                        self.set_state(SessionState::AwaitingWakeWord);
                        continue;
                    };

                    self.emit(SessionEvent::Feedback(
                        "Auto-detecting... Move to the center.".to_string(),
                    ));
                    let _ = self
                        .speaker
                        .speak("Move the object to the center of the frame.")
                        .await;

                    let mut center = CenterLoop::new(
                        Arc::clone(&self.camera),
                        Arc::clone(&self.vision),
                        self.config.tick_interval,
                        target,
                    );

                    match center.run(self.speaker.as_mut(), shutdown).await {
                        Ok(Some(photo)) => {
                            self.emit(SessionEvent::PhotoTaken {
                                width: photo.width,
                                height: photo.height,
                            });
                            tracing::info!(
                                width = photo.width,
                                height = photo.height,
                                "photo captured"
                            );
                            self.last_photo = Some(photo);
                            self.set_state(SessionState::Captured);
                        }
                        Ok(None) => return Ok(()),
                        Err(e) => {
                            tracing::warn!(error = %e, "auto-center loop failed");
                            self.target = None;
                            self.set_state(SessionState::AwaitingWakeWord);
                        }
                    }
                }

                SessionState::Captured => {
                    tokio::select! {
                        _ = shutdown.recv() => return Ok(()),
                        () = tokio::time::sleep(self.config.restart_delay) => {}
                    }

                    self.target = None;
                    let _ = self
                        .speaker
                        .speak(&format!("Say '{wake_word}' to start again."))
                        .await;
                    self.set_state(SessionState::AwaitingWakeWord);
                }
            }
        }
    }

    /// Handle a transcript heard while awaiting the wake word
    ///
    /// Transitions to `AwaitingDescription` (and only there) when the wake
    /// phrase is present.
    pub fn on_wake_transcript(&mut self, transcript: &str) -> bool {
        if self.state != SessionState::AwaitingWakeWord {
            return false;
        }
        if wake_matched(transcript, &self.config.wake_word) {
            self.set_state(SessionState::AwaitingDescription);
            true
        } else {
            false
        }
    }

    /// Move to a new state, emitting the change
    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "session transition");
            self.state = state;
            self.emit(SessionEvent::StateChanged(state));
        }
    }

    /// Best-effort event emission; a full or closed channel is not an error
    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            let _ = events.try_send(event);
        }
    }
}

/// Case-insensitive substring match for the wake phrase
#[must_use]
pub fn wake_matched(transcript: &str, wake_word: &str) -> bool {
    transcript
        .to_lowercase()
        .contains(&wake_word.to_lowercase())
}
