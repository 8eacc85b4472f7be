//! Speech input modes
//!
//! Two listening modes share the microphone: continuous wake-word
//! listening and one-shot dictation. The session state machine owns the
//! input exclusively, so only one mode runs at a time; each mode stops the
//! capture stream before returning.

use std::time::{Duration, Instant};

use super::capture::{samples_to_wav, AudioCapture, SAMPLE_RATE};
use super::segmenter::UtteranceDetector;
use super::stt::SpeechToText;
use crate::{Error, Result};

/// How often the listen loops drain the capture buffer
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Deadline for one-shot dictation before giving up
const DICTATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Speech input seam for the session state machine
#[async_trait::async_trait]
pub trait SpeechInput: Send {
    /// Listen continuously until a transcript contains the wake phrase
    /// (case-insensitive substring); returns that transcript
    async fn wait_for_wake(&mut self, wake_word: &str) -> Result<String>;

    /// One-shot dictation: listen for a single utterance and transcribe it
    async fn listen_once(&mut self) -> Result<String>;
}

/// Microphone-backed speech input
pub struct MicInput {
    capture: AudioCapture,
    detector: UtteranceDetector,
    stt: SpeechToText,
}

impl MicInput {
    /// Create a microphone input around an STT backend
    ///
    /// # Errors
    ///
    /// Returns `Error::Audio` if the microphone cannot be opened
    pub fn new(stt: SpeechToText) -> Result<Self> {
        Ok(Self {
            capture: AudioCapture::new()?,
            detector: UtteranceDetector::new(),
            stt,
        })
    }

    /// Wait for the next complete utterance, up to an optional deadline
    async fn next_utterance(&mut self, deadline: Option<Instant>) -> Result<Vec<f32>> {
        loop {
            if let Some(deadline) = deadline {
                if Instant::now() > deadline {
                    return Err(Error::Stt("no speech detected".to_string()));
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
            let samples = self.capture.take_buffer();
            if let Some(utterance) = self.detector.feed(&samples) {
                return Ok(utterance);
            }
        }
    }
}

#[async_trait::async_trait]
impl SpeechInput for MicInput {
    async fn wait_for_wake(&mut self, wake_word: &str) -> Result<String> {
        let wake_lower = wake_word.to_lowercase();
        self.detector.reset();
        self.capture.start()?;
        tracing::info!(wake_word, "listening for wake phrase");

        loop {
            let utterance = match self.next_utterance(None).await {
                Ok(u) => u,
                Err(e) => {
                    self.capture.stop();
                    return Err(e);
                }
            };

            let wav = samples_to_wav(&utterance, SAMPLE_RATE)?;
            match self.stt.transcribe(&wav).await {
                Ok(transcript) if transcript.to_lowercase().contains(&wake_lower) => {
                    tracing::info!(transcript = %transcript, "wake phrase detected");
                    self.capture.stop();
                    return Ok(transcript);
                }
                Ok(transcript) => {
                    tracing::debug!(transcript = %transcript, "no wake phrase, still listening");
                }
                Err(e) => {
                    // Transient STT failures must not end wake listening
                    tracing::warn!(error = %e, "wake transcription failed, still listening");
                }
            }
        }
    }

    async fn listen_once(&mut self) -> Result<String> {
        self.detector.reset();
        self.capture.start()?;
        tracing::info!("listening for dictation");

        let deadline = Instant::now() + DICTATION_TIMEOUT;
        let result = async {
            let utterance = self.next_utterance(Some(deadline)).await?;
            let wav = samples_to_wav(&utterance, SAMPLE_RATE)?;
            self.stt.transcribe(&wav).await
        }
        .await;

        self.capture.stop();
        result
    }
}
