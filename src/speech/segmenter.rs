//! Utterance segmentation
//!
//! Energy-gated speech detection over the raw sample stream: accumulate
//! while the speaker talks, emit the buffered utterance once trailing
//! silence is long enough. Cloud transcription decides what was said.

/// Minimum RMS energy to consider a chunk speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum utterance length to emit (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends an utterance (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmenterState {
    /// Waiting for speech energy
    Idle,
    /// Accumulating an utterance
    Speech,
}

/// Segments the microphone stream into complete utterances
#[derive(Debug)]
pub struct UtteranceDetector {
    state: SegmenterState,
    buffer: Vec<f32>,
    silence: usize,
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl UtteranceDetector {
    /// Create a detector in the idle state
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SegmenterState::Idle,
            buffer: Vec::new(),
            silence: 0,
        }
    }

    /// Feed captured samples; returns a complete utterance when one ends
    pub fn feed(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        if samples.is_empty() {
            return None;
        }

        let is_speech = rms_energy(samples) > ENERGY_THRESHOLD;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    self.state = SegmenterState::Speech;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence = 0;
                    tracing::trace!("speech started");
                }
                None
            }
            SegmenterState::Speech => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence = 0;
                } else {
                    self.silence += samples.len();
                }

                if self.silence > SILENCE_SAMPLES {
                    if self.buffer.len() > MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = self.buffer.len(), "utterance complete");
                        self.state = SegmenterState::Idle;
                        self.silence = 0;
                        return Some(std::mem::take(&mut self.buffer));
                    }
                    // Too short to be speech; discard
                    tracing::trace!("utterance too short, resetting");
                    self.reset();
                }
                None
            }
        }
    }

    /// Discard any partial utterance and return to idle
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.buffer.clear();
        self.silence = 0;
    }
}

/// RMS energy of a sample chunk
#[allow(clippy::cast_precision_loss)]
fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loud(n: usize) -> Vec<f32> {
        vec![0.5; n]
    }

    fn silence(n: usize) -> Vec<f32> {
        vec![0.0; n]
    }

    #[test]
    fn test_energy_calculation() {
        assert!(rms_energy(&silence(100)) < 0.001);
        assert!(rms_energy(&loud(100)) > 0.4);
        assert_eq!(rms_energy(&[]), 0.0);
    }

    #[test]
    fn test_silence_alone_stays_idle() {
        let mut detector = UtteranceDetector::new();
        assert!(detector.feed(&silence(20000)).is_none());
        assert!(detector.feed(&silence(20000)).is_none());
    }

    #[test]
    fn test_speech_then_silence_emits_utterance() {
        let mut detector = UtteranceDetector::new();

        assert!(detector.feed(&loud(MIN_SPEECH_SAMPLES + 1000)).is_none());
        let utterance = detector.feed(&silence(SILENCE_SAMPLES + 1000));

        let utterance = utterance.expect("utterance should complete");
        assert!(utterance.len() > MIN_SPEECH_SAMPLES);
    }

    #[test]
    fn test_short_blip_is_discarded() {
        let mut detector = UtteranceDetector::new();

        assert!(detector.feed(&loud(1000)).is_none());
        // Long silence after a too-short burst resets without emitting
        assert!(detector.feed(&silence(SILENCE_SAMPLES + 1000)).is_none());
        // Detector is reusable afterwards
        assert!(detector.feed(&loud(MIN_SPEECH_SAMPLES + 1000)).is_none());
        assert!(detector.feed(&silence(SILENCE_SAMPLES + 1000)).is_some());
    }

    #[test]
    fn test_reset_discards_partial_utterance() {
        let mut detector = UtteranceDetector::new();

        detector.feed(&loud(MIN_SPEECH_SAMPLES + 1000));
        detector.reset();
        assert!(detector.feed(&silence(SILENCE_SAMPLES + 1000)).is_none());
    }
}
