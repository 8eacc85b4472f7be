//! Configuration management for framepilot
//!
//! Precedence, lowest to highest: built-in defaults, the TOML config file,
//! then environment variables.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::Result;
use file::ConfigFile;

/// Default wake phrase
pub const DEFAULT_WAKE_WORD: &str = "vision assist";

/// Default seconds between auto-center ticks
const DEFAULT_TICK_INTERVAL_SECS: u64 = 3;

/// Default seconds before resuming wake listening after a capture
const DEFAULT_RESTART_DELAY_SECS: u64 = 3;

/// Default milliseconds between description and detection start
const DEFAULT_DETECT_START_DELAY_MS: u64 = 1000;

/// Default vision proxy base URL
const DEFAULT_PROXY_URL: &str = "http://localhost:5174";

/// Default proxy listen port
const DEFAULT_PROXY_PORT: u16 = 5174;

/// framepilot runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Assistant behaviour
    pub assistant: AssistantConfig,

    /// Camera capture configuration
    pub camera: CameraConfig,

    /// Vision proxy client configuration
    pub vision: VisionConfig,

    /// Speech (STT/TTS) configuration
    pub speech: SpeechConfig,

    /// API keys for upstream providers
    pub api_keys: ApiKeys,

    /// Proxy server configuration
    pub proxy: ProxyConfig,
}

/// Assistant behaviour configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Wake phrase, matched case-insensitively as a substring
    pub wake_word: String,

    /// Interval between auto-center ticks
    pub tick_interval: Duration,

    /// Delay after a capture before resuming wake listening
    pub restart_delay: Duration,

    /// Delay between storing a description and starting detection
    pub detect_start_delay: Duration,
}

/// Camera capture configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// HTTP snapshot URL yielding a still image, if configured
    pub snapshot_url: Option<String>,
}

/// Vision proxy client configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the vision proxy
    pub proxy_url: String,
}

/// Speech configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// STT model identifier
    pub stt_model: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier
    pub tts_speed: f32,
}

/// API keys for upstream providers
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI key (vision proxy upstream, Whisper STT, TTS)
    pub openai: Option<String>,

    /// Gemini key (gemini-vision proxy upstream)
    pub gemini: Option<String>,
}

/// Proxy server configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Port the proxy listens on
    pub port: u16,
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed
    pub fn load() -> Result<Self> {
        let file = Self::load_file()?.unwrap_or_default();
        Ok(Self::from_overlay(file))
    }

    /// Path to the config file, if a config directory can be resolved
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "framepilot", "framepilot")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Read and parse the config file if present
    fn load_file() -> Result<Option<ConfigFile>> {
        let Some(path) = Self::config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let file = ConfigFile::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(Some(file))
    }

    /// Assemble the runtime config from a partial file overlay plus env vars
    fn from_overlay(file: ConfigFile) -> Self {
        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .or(file.api_keys.openai),
            gemini: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .or(file.api_keys.gemini),
        };

        let proxy_url = std::env::var("FRAMEPILOT_PROXY_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .or(file.vision.proxy_url)
            .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());

        let proxy_port = std::env::var("FRAMEPILOT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .or(file.proxy.port)
            .unwrap_or(DEFAULT_PROXY_PORT);

        Self {
            assistant: AssistantConfig {
                wake_word: file
                    .assistant
                    .wake_word
                    .unwrap_or_else(|| DEFAULT_WAKE_WORD.to_string()),
                tick_interval: Duration::from_secs(
                    file.assistant
                        .tick_interval_secs
                        .unwrap_or(DEFAULT_TICK_INTERVAL_SECS),
                ),
                restart_delay: Duration::from_secs(
                    file.assistant
                        .restart_delay_secs
                        .unwrap_or(DEFAULT_RESTART_DELAY_SECS),
                ),
                detect_start_delay: Duration::from_millis(
                    file.assistant
                        .detect_start_delay_ms
                        .unwrap_or(DEFAULT_DETECT_START_DELAY_MS),
                ),
            },
            camera: CameraConfig {
                snapshot_url: file.camera.snapshot_url,
            },
            vision: VisionConfig { proxy_url },
            speech: SpeechConfig {
                stt_model: file
                    .speech
                    .stt_model
                    .unwrap_or_else(|| "whisper-1".to_string()),
                tts_model: file
                    .speech
                    .tts_model
                    .unwrap_or_else(|| "tts-1".to_string()),
                tts_voice: file
                    .speech
                    .tts_voice
                    .unwrap_or_else(|| "alloy".to_string()),
                tts_speed: file.speech.tts_speed.unwrap_or(1.0),
            },
            api_keys,
            proxy: ProxyConfig { port: proxy_port },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_overlay(ConfigFile::default());

        assert_eq!(config.assistant.wake_word, DEFAULT_WAKE_WORD);
        assert_eq!(config.assistant.tick_interval, Duration::from_secs(3));
        assert_eq!(config.vision.proxy_url, DEFAULT_PROXY_URL);
        assert_eq!(config.speech.stt_model, "whisper-1");
        assert_eq!(config.proxy.port, DEFAULT_PROXY_PORT);
    }

    #[test]
    fn test_file_overlay_wins_over_defaults() {
        let file = ConfigFile::parse(
            r#"
            [assistant]
            wake_word = "hey camera"
            tick_interval_secs = 5

            [speech]
            tts_voice = "nova"
            "#,
        )
        .unwrap();

        let config = Config::from_overlay(file);
        assert_eq!(config.assistant.wake_word, "hey camera");
        assert_eq!(config.assistant.tick_interval, Duration::from_secs(5));
        assert_eq!(config.speech.tts_voice, "nova");
        // Untouched fields fall back to defaults
        assert_eq!(config.speech.tts_model, "tts-1");
    }
}
