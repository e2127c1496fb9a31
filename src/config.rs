//! Configuration management
//!
//! Settings come from `~/.config/drishti/config.toml` (a partial overlay on
//! defaults) with API keys also readable from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default STT model when none is configured
const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Default TTS model when none is configured
const DEFAULT_TTS_MODEL: &str = "tts-1";

/// Default TTS voice
const DEFAULT_TTS_VOICE: &str = "nova";

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Voice pipeline configuration
    pub voice: VoiceConfig,

    /// Camera and detection configuration
    pub camera: CameraConfig,

    /// Location used for weather and news lookups
    pub location: LocationConfig,

    /// News retrieval configuration
    pub news: NewsConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable microphone input and spoken output
    pub enabled: bool,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// Spoken language hint for transcription (e.g. "en")
    pub language: String,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS voice used for Hindi translations; falls back to `tts_voice`
    pub hindi_voice: Option<String>,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stt_provider: "whisper".to_string(),
            stt_model: DEFAULT_STT_MODEL.to_string(),
            language: "en".to_string(),
            tts_provider: "openai".to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            hindi_voice: None,
            tts_speed: 0.9,
        }
    }
}

/// Camera and detection configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Camera device index (0 = default webcam)
    pub index: u32,

    /// Minimum detection confidence (0.0 to 1.0)
    pub confidence: f32,

    /// Bounding box overlap threshold for the detection API
    pub overlap: f32,

    /// Maximum frames to post per currency request
    pub max_frames: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            confidence: 0.8,
            overlap: 0.5,
            max_frames: 8,
        }
    }
}

/// Location used for weather and news lookups
#[derive(Debug, Clone, Default)]
pub struct LocationConfig {
    /// City name (e.g. "Mumbai")
    pub city: String,

    /// ISO country code (e.g. "IN"); optional
    pub country_code: String,
}

/// News retrieval configuration
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// Maximum number of headlines to announce
    pub max_headlines: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self { max_headlines: 10 }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,

    /// Roboflow API key (currency note detection)
    pub roboflow: Option<String>,

    /// Imagga API key (object tagging)
    pub imagga_key: Option<String>,

    /// Imagga API secret
    pub imagga_secret: Option<String>,

    /// `OpenWeatherMap` API key
    pub openweather: Option<String>,

    /// NewsAPI key
    pub newsapi: Option<String>,
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed
    pub fn load() -> Result<Self> {
        let file = load_config_file();
        Ok(Self::from_file(file))
    }

    /// Build a runtime config from a (possibly partial) file overlay
    #[must_use]
    pub fn from_file(file: ConfigFile) -> Self {
        let voice_defaults = VoiceConfig::default();
        let camera_defaults = CameraConfig::default();
        let news_defaults = NewsConfig::default();

        let voice = VoiceConfig {
            enabled: file.voice.enabled.unwrap_or(voice_defaults.enabled),
            stt_provider: file
                .voice
                .stt_provider
                .unwrap_or(voice_defaults.stt_provider),
            stt_model: file.voice.stt_model.unwrap_or(voice_defaults.stt_model),
            language: file.voice.language.unwrap_or(voice_defaults.language),
            tts_provider: file
                .voice
                .tts_provider
                .unwrap_or(voice_defaults.tts_provider),
            tts_model: file.voice.tts_model.unwrap_or(voice_defaults.tts_model),
            tts_voice: file.voice.tts_voice.unwrap_or(voice_defaults.tts_voice),
            hindi_voice: file.voice.hindi_voice,
            tts_speed: file.voice.tts_speed.unwrap_or(voice_defaults.tts_speed),
        };

        let camera = CameraConfig {
            index: file.camera.index.unwrap_or(camera_defaults.index),
            confidence: file.camera.confidence.unwrap_or(camera_defaults.confidence),
            overlap: file.camera.overlap.unwrap_or(camera_defaults.overlap),
            max_frames: file.camera.max_frames.unwrap_or(camera_defaults.max_frames),
        };

        let location = LocationConfig {
            city: file.location.city.unwrap_or_default(),
            country_code: file.location.country_code.unwrap_or_default(),
        };

        let news = NewsConfig {
            max_headlines: file
                .news
                .max_headlines
                .unwrap_or(news_defaults.max_headlines),
        };

        // Environment variables win over the config file for keys
        let api_keys = ApiKeys {
            openai: env_or("OPENAI_API_KEY", file.api_keys.openai),
            deepgram: env_or("DEEPGRAM_API_KEY", file.api_keys.deepgram),
            elevenlabs: env_or("ELEVENLABS_API_KEY", file.api_keys.elevenlabs),
            roboflow: env_or("ROBOFLOW_API_KEY", file.api_keys.roboflow),
            imagga_key: env_or("IMAGGA_API_KEY", file.api_keys.imagga_key),
            imagga_secret: env_or("IMAGGA_API_SECRET", file.api_keys.imagga_secret),
            openweather: env_or("OPENWEATHER_API_KEY", file.api_keys.openweather),
            newsapi: env_or("NEWSAPI_KEY", file.api_keys.newsapi),
        };

        Self {
            voice,
            camera,
            location,
            news,
            api_keys,
        }
    }
}

fn env_or(var: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).or(fallback)
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Camera configuration
    #[serde(default)]
    pub camera: CameraFileConfig,

    /// Location configuration
    #[serde(default)]
    pub location: LocationFileConfig,

    /// News configuration
    #[serde(default)]
    pub news: NewsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Voice section of the config file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    pub enabled: Option<bool>,
    pub stt_provider: Option<String>,
    pub stt_model: Option<String>,
    pub language: Option<String>,
    pub tts_provider: Option<String>,
    pub tts_model: Option<String>,
    pub tts_voice: Option<String>,
    pub hindi_voice: Option<String>,
    pub tts_speed: Option<f32>,
}

/// Camera section of the config file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CameraFileConfig {
    pub index: Option<u32>,
    pub confidence: Option<f32>,
    pub overlap: Option<f32>,
    pub max_frames: Option<u32>,
}

/// Location section of the config file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LocationFileConfig {
    pub city: Option<String>,
    pub country_code: Option<String>,
}

/// News section of the config file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NewsFileConfig {
    pub max_headlines: Option<u32>,
}

/// API keys section of the config file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
    pub roboflow: Option<String>,
    pub imagga_key: Option<String>,
    pub imagga_secret: Option<String>,
    pub openweather: Option<String>,
    pub newsapi: Option<String>,
}

/// Load the config file, falling back to defaults
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be
/// parsed.
#[must_use]
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/drishti/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("drishti").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_file(ConfigFile::default());

        assert!(config.voice.enabled);
        assert_eq!(config.voice.stt_provider, "whisper");
        assert_eq!(config.voice.stt_model, "whisper-1");
        assert_eq!(config.camera.index, 0);
        assert_eq!(config.news.max_headlines, 10);
        assert!(config.location.city.is_empty());
    }

    #[test]
    fn test_partial_overlay() {
        let file: ConfigFile = toml::from_str(
            r#"
            [voice]
            tts_voice = "shimmer"
            tts_speed = 1.1

            [location]
            city = "Mumbai"
            country_code = "IN"

            [camera]
            confidence = 0.7
            "#,
        )
        .unwrap();

        let config = Config::from_file(file);

        assert_eq!(config.voice.tts_voice, "shimmer");
        assert!((config.voice.tts_speed - 1.1).abs() < f32::EPSILON);
        assert_eq!(config.location.city, "Mumbai");
        assert_eq!(config.location.country_code, "IN");
        assert!((config.camera.confidence - 0.7).abs() < f32::EPSILON);
        // Untouched sections keep defaults
        assert_eq!(config.voice.stt_model, "whisper-1");
        assert_eq!(config.camera.max_frames, 8);
    }
}
