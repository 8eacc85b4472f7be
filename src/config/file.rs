//! TOML configuration file loading
//!
//! Supports `~/.config/framepilot/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Assistant behaviour (wake word, timing)
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Camera capture configuration
    #[serde(default)]
    pub camera: CameraFileConfig,

    /// Vision proxy configuration
    #[serde(default)]
    pub vision: VisionFileConfig,

    /// Speech (STT/TTS) configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// API keys for upstream providers
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Proxy server configuration
    #[serde(default)]
    pub proxy: ProxyFileConfig,
}

/// Assistant behaviour configuration
#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Wake phrase (e.g. "vision assist")
    pub wake_word: Option<String>,

    /// Seconds between auto-center ticks
    pub tick_interval_secs: Option<u64>,

    /// Seconds to wait after a capture before resuming wake listening
    pub restart_delay_secs: Option<u64>,

    /// Milliseconds between storing a description and starting detection
    pub detect_start_delay_ms: Option<u64>,
}

/// Camera configuration
#[derive(Debug, Default, Deserialize)]
pub struct CameraFileConfig {
    /// HTTP snapshot URL yielding a still JPEG/PNG (IP-webcam style)
    pub snapshot_url: Option<String>,
}

/// Vision proxy client configuration
#[derive(Debug, Default, Deserialize)]
pub struct VisionFileConfig {
    /// Base URL of the vision proxy (e.g. "http://localhost:5174")
    pub proxy_url: Option<String>,
}

/// Speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub gemini: Option<String>,
}

/// Proxy server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ProxyFileConfig {
    /// Port the proxy listens on
    pub port: Option<u16>,
}

impl ConfigFile {
    /// Parse a TOML string into a partial config
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed
    pub fn parse(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_valid() {
        let config = ConfigFile::parse("").unwrap();
        assert!(config.assistant.wake_word.is_none());
        assert!(config.api_keys.openai.is_none());
    }

    #[test]
    fn test_partial_overlay() {
        let config = ConfigFile::parse(
            r#"
            [assistant]
            wake_word = "vision assist"
            tick_interval_secs = 5

            [camera]
            snapshot_url = "http://192.168.1.20:8080/shot.jpg"
            "#,
        )
        .unwrap();

        assert_eq!(config.assistant.wake_word.as_deref(), Some("vision assist"));
        assert_eq!(config.assistant.tick_interval_secs, Some(5));
        assert!(config.vision.proxy_url.is_none());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(ConfigFile::parse("[assistant").is_err());
    }
}
