//! Single-slot voice output
//!
//! All spoken feedback funnels through one [`Voice`]. Starting a new
//! utterance cancels the one in flight (the playback loop polls the cancel
//! flag), so directions never queue up behind stale ones.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::playback::AudioPlayback;
use super::tts::TextToSpeech;
use super::Speaker;
use crate::{Error, Result};

/// Handle to an utterance in flight
struct Utterance {
    cancel: Arc<AtomicBool>,
    handle: tokio::task::JoinHandle<()>,
}

/// The single spoken-output resource
pub struct Voice {
    tts: Arc<TextToSpeech>,
    current: Option<Utterance>,
}

impl Voice {
    /// Create a voice around a TTS backend
    #[must_use]
    pub fn new(tts: TextToSpeech) -> Self {
        Self {
            tts: Arc::new(tts),
            current: None,
        }
    }

    /// Cancel the in-flight utterance, if any
    fn cancel_current(&mut self) {
        if let Some(utterance) = self.current.take() {
            utterance.cancel.store(true, Ordering::Relaxed);
            utterance.handle.abort();
        }
    }

    /// Start speaking in the background, cancelling any current utterance
    pub fn start_speaking(&mut self, text: &str) {
        self.cancel_current();

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_task = Arc::clone(&cancel);
        let tts = Arc::clone(&self.tts);
        let text = text.to_string();

        let handle = tokio::spawn(async move {
            if let Err(e) = synthesize_and_play(&tts, &text, cancel_task).await {
                tracing::warn!(error = %e, "utterance failed");
            }
        });

        self.current = Some(Utterance { cancel, handle });
    }

    /// Speak and wait for playback to finish
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    pub async fn say(&mut self, text: &str) -> Result<()> {
        self.cancel_current();
        let cancel = Arc::new(AtomicBool::new(false));
        synthesize_and_play(&self.tts, text, cancel).await
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

/// Synthesize text and play it, honoring the cancel flag
async fn synthesize_and_play(
    tts: &TextToSpeech,
    text: &str,
    cancel: Arc<AtomicBool>,
) -> Result<()> {
    tracing::debug!(text, "speaking");
    let audio = tts.synthesize(text).await?;

    if cancel.load(Ordering::Relaxed) {
        return Ok(());
    }

    tokio::task::spawn_blocking(move || {
        let playback = AudioPlayback::new()?;
        playback.play_mp3(&audio, &cancel)
    })
    .await
    .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
}

#[async_trait::async_trait]
impl Speaker for Voice {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.start_speaking(text);
        Ok(())
    }

    async fn speak_and_wait(&mut self, text: &str) -> Result<()> {
        self.say(text).await
    }
}
