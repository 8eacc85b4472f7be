//! Error types for framepilot

use thiserror::Error;

/// Result type alias for framepilot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in framepilot
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing API key, bad config file)
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera capture surface unavailable or produced an unusable frame
    #[error("camera error: {0}")]
    Camera(String),

    /// Audio device error (mic/speaker missing or permission denied)
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Vision query error (proxy unreachable, non-2xx, empty response)
    #[error("vision error: {0}")]
    Vision(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Image decoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
