//! Interactive first-run setup wizard (`drishti setup`)

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::config::{
    self, ApiKeysFileConfig, CameraFileConfig, ConfigFile, LocationFileConfig, NewsFileConfig,
    VoiceFileConfig,
};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Drishti Setup\n");

    let existing = config::load_config_file();
    let config_path = config::config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/drishti/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Location (weather and news)
    let city: String = Input::new()
        .with_prompt("City (for weather and news)")
        .default(existing.location.city.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let country_code: String = Input::new()
        .with_prompt("Country code (e.g. IN, leave blank to skip)")
        .default(existing.location.country_code.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    // 2. Voice providers
    let stt_providers = ["Whisper (OpenAI)", "Deepgram"];
    let default_stt = existing
        .voice
        .stt_provider
        .as_deref()
        .and_then(|p| match p {
            "deepgram" => Some(1),
            _ => Some(0),
        })
        .unwrap_or(0);

    let stt_idx = Select::new()
        .with_prompt("Speech recognition provider")
        .items(&stt_providers)
        .default(default_stt)
        .interact()?;
    let stt_provider = if stt_idx == 1 { "deepgram" } else { "whisper" };

    let tts_providers = ["OpenAI", "ElevenLabs"];
    let default_tts = existing
        .voice
        .tts_provider
        .as_deref()
        .and_then(|p| match p {
            "elevenlabs" => Some(1),
            _ => Some(0),
        })
        .unwrap_or(0);

    let tts_idx = Select::new()
        .with_prompt("Speech output provider")
        .items(&tts_providers)
        .default(default_tts)
        .interact()?;
    let tts_provider = if tts_idx == 1 { "elevenlabs" } else { "openai" };

    // 3. API keys
    let openai = prompt_key(
        "OpenAI API key (Whisper STT and TTS)",
        existing.api_keys.openai.as_deref(),
    )?;
    let deepgram = if stt_provider == "deepgram" {
        prompt_key("Deepgram API key", existing.api_keys.deepgram.as_deref())?
    } else {
        existing.api_keys.deepgram.clone()
    };
    let elevenlabs = if tts_provider == "elevenlabs" {
        prompt_key("ElevenLabs API key", existing.api_keys.elevenlabs.as_deref())?
    } else {
        existing.api_keys.elevenlabs.clone()
    };

    let enable_detection = Confirm::new()
        .with_prompt("Configure camera features (currency and object detection)?")
        .default(true)
        .interact()?;

    let (roboflow, imagga_key, imagga_secret) = if enable_detection {
        (
            prompt_key(
                "Roboflow API key (currency notes)",
                existing.api_keys.roboflow.as_deref(),
            )?,
            prompt_key(
                "Imagga API key (object detection)",
                existing.api_keys.imagga_key.as_deref(),
            )?,
            prompt_key("Imagga API secret", existing.api_keys.imagga_secret.as_deref())?,
        )
    } else {
        (
            existing.api_keys.roboflow.clone(),
            existing.api_keys.imagga_key.clone(),
            existing.api_keys.imagga_secret.clone(),
        )
    };

    let openweather = prompt_key(
        "OpenWeatherMap API key",
        existing.api_keys.openweather.as_deref(),
    )?;
    let newsapi = prompt_key("NewsAPI key", existing.api_keys.newsapi.as_deref())?;

    // 4. Write the config file
    let file = ConfigFile {
        voice: VoiceFileConfig {
            enabled: Some(true),
            stt_provider: Some(stt_provider.to_string()),
            stt_model: existing.voice.stt_model,
            language: existing.voice.language,
            tts_provider: Some(tts_provider.to_string()),
            tts_model: existing.voice.tts_model,
            tts_voice: existing.voice.tts_voice,
            hindi_voice: existing.voice.hindi_voice,
            tts_speed: existing.voice.tts_speed,
        },
        camera: CameraFileConfig {
            index: existing.camera.index,
            confidence: existing.camera.confidence,
            overlap: existing.camera.overlap,
            max_frames: existing.camera.max_frames,
        },
        location: LocationFileConfig {
            city: non_empty(city),
            country_code: non_empty(country_code),
        },
        news: NewsFileConfig {
            max_headlines: existing.news.max_headlines,
        },
        api_keys: ApiKeysFileConfig {
            openai,
            deepgram,
            elevenlabs,
            roboflow,
            imagga_key,
            imagga_secret,
            openweather,
            newsapi,
        },
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, toml::to_string_pretty(&file)?)?;

    println!("\nConfig written to {}", config_path.display());
    println!("Run `drishti` to start the assistant.");

    Ok(())
}

/// Prompt for an API key, keeping the existing one on blank input
fn prompt_key(label: &str, existing: Option<&str>) -> anyhow::Result<Option<String>> {
    let masked = existing.map(|k| {
        if k.len() > 8 {
            format!("{}...{}", &k[..4], &k[k.len() - 4..])
        } else {
            "****".to_string()
        }
    });

    let prompt = if let Some(ref m) = masked {
        format!("{label} (current: {m}, leave blank to keep)")
    } else {
        format!("{label} (leave blank to skip)")
    };

    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.is_empty() {
        existing.map(str::to_string)
    } else {
        Some(input)
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
