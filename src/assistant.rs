//! The assistant dispatch loop
//!
//! Sequential listen → recognize → route → handle → speak. No state is kept
//! across iterations; a failed iteration logs, apologizes, and tries again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, Timelike};

use crate::camera::{FrameGrabber, Webcam};
use crate::config::Config;
use crate::dispatch::{CommandRouter, Route};
use crate::handlers::{
    CurrencyHandler, NewsHandler, ObjectsHandler, TimeHandler, TranslateHandler, WeatherHandler,
};
use crate::voice::{samples_to_wav, Microphone, SpeechToText, Speaker, TextToSpeech, SAMPLE_RATE};
use crate::Result;

/// How long one listen call waits for a phrase
const LISTEN_TIMEOUT: Duration = Duration::from_secs(15);

/// Spoken when recognition fails or nothing matches
const RETRY_PROMPT: &str = "Say that again please.";

/// Spoken when a handler fails
const HANDLER_APOLOGY: &str = "Sorry, I could not do that.";

/// The voice assistant
pub struct Assistant {
    router: CommandRouter,
    microphone: Microphone,
    speaker: Speaker,
    stt: SpeechToText,
    tts: TextToSpeech,
}

impl Assistant {
    /// Build the assistant from configuration
    ///
    /// Handlers whose API keys are missing are skipped with a warning, so a
    /// partially configured assistant still runs.
    ///
    /// # Errors
    ///
    /// Returns error if audio devices or the STT/TTS backends cannot be set up
    pub fn new(config: &Config) -> Result<Self> {
        let router = build_router(config);
        if router.is_empty() {
            tracing::warn!("no task handlers available - check configured API keys");
        }

        Ok(Self {
            router,
            microphone: Microphone::new()?,
            speaker: Speaker::new()?,
            stt: SpeechToText::from_config(&config.voice, &config.api_keys)?,
            tts: TextToSpeech::from_config(&config.voice, &config.api_keys)?,
        })
    }

    /// Run the dispatch loop until "shutdown" is spoken or Ctrl-C arrives
    ///
    /// # Errors
    ///
    /// Returns error if the microphone fails; handler and speech errors are
    /// logged and the loop continues
    pub async fn run(self) -> Result<()> {
        let Self {
            router,
            mut microphone,
            mut speaker,
            stt,
            tts,
        } = self;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown_flag.store(true, Ordering::SeqCst);
            }
        });

        let hello = greeting(Local::now().hour());
        println!("{hello}");
        if let Err(e) = speak(&mut speaker, &tts, hello, None).await {
            tracing::warn!(error = %e, "greeting failed");
        }

        tracing::info!(handlers = router.len(), "assistant running");

        loop {
            if shutdown.load(Ordering::SeqCst) {
                tracing::info!("shutdown requested");
                break;
            }

            println!("Listening...");
            let phrase =
                tokio::task::block_in_place(|| microphone.record_phrase(LISTEN_TIMEOUT))?;
            let Some(samples) = phrase else {
                continue;
            };

            println!("Recognizing...");
            let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
            let transcript = match stt.transcribe(&wav).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "recognition failed");
                    say_or_log(&mut speaker, &tts, RETRY_PROMPT).await;
                    continue;
                }
            };

            let command = transcript.trim();
            if command.is_empty() {
                continue;
            }
            println!("You said: {command}");

            match router.route(command) {
                Route::Shutdown => {
                    println!("Shutting down...");
                    say_or_log(&mut speaker, &tts, "Shutting down.").await;
                    break;
                }
                Route::Unrecognized => {
                    tracing::debug!(command, "no handler matched");
                    say_or_log(&mut speaker, &tts, RETRY_PROMPT).await;
                }
                Route::Handled(handler) => {
                    tracing::info!(handler = handler.name(), command, "dispatching");
                    match handler.handle(command).await {
                        Ok(reply) => {
                            for line in &reply.lines {
                                println!("{line}");
                                if let Err(e) =
                                    speak(&mut speaker, &tts, line, reply.voice_override.as_deref())
                                        .await
                                {
                                    tracing::error!(error = %e, "speech output failed");
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(handler = handler.name(), error = %e, "handler failed");
                            say_or_log(&mut speaker, &tts, HANDLER_APOLOGY).await;
                        }
                    }
                }
            }
        }

        tracing::info!("assistant stopped");
        Ok(())
    }
}

/// Build the handler registry from configuration
///
/// Registration order is the dispatch priority. Handlers with missing keys
/// (or, for the camera handlers, no working webcam) are skipped.
#[must_use]
pub fn build_router(config: &Config) -> CommandRouter {
    let mut router = CommandRouter::new();

    // Camera is only opened if a detection handler can use it
    let wants_camera = config.api_keys.roboflow.is_some()
        || (config.api_keys.imagga_key.is_some() && config.api_keys.imagga_secret.is_some());

    let camera: Option<Arc<Mutex<dyn FrameGrabber>>> = if wants_camera {
        match Webcam::open(config.camera.index) {
            Ok(webcam) => Some(Arc::new(Mutex::new(webcam))),
            Err(e) => {
                tracing::warn!(error = %e, "camera unavailable, detection handlers disabled");
                None
            }
        }
    } else {
        None
    };

    if let (Some(key), Some(camera)) = (config.api_keys.roboflow.clone(), camera.clone()) {
        match CurrencyHandler::new(key, &config.camera, camera) {
            Ok(handler) => router.register(Box::new(handler)),
            Err(e) => tracing::warn!(error = %e, "currency handler disabled"),
        }
    }

    if let (Some(key), Some(secret), Some(camera)) = (
        config.api_keys.imagga_key.clone(),
        config.api_keys.imagga_secret.clone(),
        camera,
    ) {
        match ObjectsHandler::new(key, secret, camera) {
            Ok(handler) => router.register(Box::new(handler)),
            Err(e) => tracing::warn!(error = %e, "object detection handler disabled"),
        }
    }

    router.register(Box::new(TimeHandler));

    if let Some(key) = config.api_keys.openweather.clone() {
        match WeatherHandler::new(key, &config.location) {
            Ok(handler) => router.register(Box::new(handler)),
            Err(e) => tracing::warn!(error = %e, "weather handler disabled"),
        }
    }

    if let Some(key) = config.api_keys.newsapi.clone() {
        match NewsHandler::new(key, &config.location, &config.news) {
            Ok(handler) => router.register(Box::new(handler)),
            Err(e) => tracing::warn!(error = %e, "news handler disabled"),
        }
    }

    router.register(Box::new(TranslateHandler::new(
        config.voice.hindi_voice.clone(),
    )));

    router
}

/// Synthesize and play one line, blocking until playback finishes
///
/// # Errors
///
/// Returns error if synthesis or playback fails
pub async fn speak(
    speaker: &mut Speaker,
    tts: &TextToSpeech,
    text: &str,
    voice: Option<&str>,
) -> Result<()> {
    tracing::debug!(text, "speaking");

    let audio = match voice {
        Some(v) => tts.synthesize_with_voice(text, v).await?,
        None => tts.synthesize(text).await?,
    };

    tokio::task::block_in_place(|| speaker.play_mp3(&audio))
}

/// Speak, logging instead of failing
async fn say_or_log(speaker: &mut Speaker, tts: &TextToSpeech, text: &str) {
    if let Err(e) = speak(speaker, tts, text, None).await {
        tracing::error!(error = %e, "speech output failed");
    }
}

/// Greeting for the local hour
#[must_use]
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning!"
    } else if hour < 18 {
        "Good afternoon!"
    } else {
        "Good evening!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_by_hour() {
        assert_eq!(greeting(0), "Good morning!");
        assert_eq!(greeting(11), "Good morning!");
        assert_eq!(greeting(12), "Good afternoon!");
        assert_eq!(greeting(17), "Good afternoon!");
        assert_eq!(greeting(18), "Good evening!");
        assert_eq!(greeting(23), "Good evening!");
    }
}
