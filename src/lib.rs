//! framepilot - voice-driven camera assistant
//!
//! Listens for a wake phrase, takes a spoken description of an object, then
//! polls a remote vision model with webcam frames until the object sits in
//! the center of the view — speaking directions along the way — and takes
//! the photo.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Session                          │
//! │  wake word → description → auto-detect → photo → ...  │
//! └──────────┬──────────────┬──────────────┬─────────────┘
//!            │              │              │
//!      ┌─────▼─────┐  ┌─────▼─────┐  ┌─────▼─────┐
//!      │  Speech   │  │  Camera   │  │  Detect   │
//!      │ STT / TTS │  │  frames   │  │ parse+loop│
//!      └───────────┘  └───────────┘  └─────┬─────┘
//!                                          │
//!                                    ┌─────▼─────┐
//!                                    │   Proxy   │
//!                                    │ → OpenAI  │
//!                                    │ → Gemini  │
//!                                    └───────────┘
//! ```

pub mod camera;
pub mod config;
pub mod detect;
pub mod error;
pub mod prompt;
pub mod proxy;
pub mod session;
pub mod speech;
pub mod vision;

pub use camera::{Frame, FrameSource, SnapshotCamera, StillImage};
pub use config::Config;
pub use detect::{BoundingBox, CenterLoop, DetectionResult, Parser, ResponseHistory, TickOutcome};
pub use error::{Error, Result};
pub use session::{Session, SessionEvent, SessionState};
pub use speech::{MicInput, Speaker, SpeechInput, SpeechToText, TextToSpeech, Voice};
pub use vision::{VisionApi, VisionClient, VisionReply};
