//! Task handlers
//!
//! Each handler is triggered by keywords in the recognized utterance and
//! performs one external API call (or a camera grab plus one call), returning
//! the lines to speak.

mod currency;
mod news;
mod objects;
mod time;
mod translate;
mod weather;

use async_trait::async_trait;

pub use currency::{CurrencyHandler, DetectResponse, Prediction, denomination, pick_denomination};
pub use news::{NewsArticle, NewsHandler, NewsResponse, format_headlines};
pub use objects::{ObjectsHandler, TagsResponse, format_tags};
pub use time::{TimeHandler, spoken_time};
pub use translate::{TranslateHandler, extract_translation_text};
pub use weather::{
    WeatherDescription, WeatherHandler, WeatherMain, WeatherReport, format_report,
};

use crate::Result;

/// What a handler wants spoken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Lines to speak, in order
    pub lines: Vec<String>,

    /// TTS voice to use instead of the default (e.g. for Hindi)
    pub voice_override: Option<String>,
}

impl Reply {
    /// Reply with a single spoken line
    #[must_use]
    pub fn say(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            voice_override: None,
        }
    }

    /// Reply with multiple spoken lines
    #[must_use]
    pub fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            voice_override: None,
        }
    }

    /// Use a specific TTS voice for this reply
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice_override = Some(voice.into());
        self
    }
}

/// A keyword-triggered task
#[async_trait]
pub trait Handler: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Trigger keywords; the handler fires when any of these is a substring
    /// of the lowercased utterance
    fn keywords(&self) -> &[&'static str];

    /// Perform the task and return what to speak
    ///
    /// # Errors
    ///
    /// Returns error if the external call fails
    async fn handle(&self, utterance: &str) -> Result<Reply>;
}
