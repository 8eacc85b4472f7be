//! Speech input and output
//!
//! Microphone capture and utterance segmentation feed one-shot
//! transcription; synthesis goes through a single-slot voice where a new
//! utterance cancels the one in flight.

mod capture;
mod input;
mod playback;
mod segmenter;
mod stt;
mod tts;
mod voice;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use input::{MicInput, SpeechInput};
pub use playback::AudioPlayback;
pub use segmenter::UtteranceDetector;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
pub use voice::Voice;

use crate::Result;

/// The spoken-feedback seam
///
/// There is exactly one voice; implementations must cancel any in-flight
/// utterance when a new one starts.
#[async_trait::async_trait]
pub trait Speaker: Send {
    /// Start speaking; returns once the utterance is underway
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// Speak and return only after playback completes
    async fn speak_and_wait(&mut self, text: &str) -> Result<()>;
}
