//! English to Hindi translation via the MyMemory API

use async_trait::async_trait;

use crate::handlers::{Handler, Reply};
use crate::{Error, Result};

/// MyMemory translation endpoint (keyless)
const TRANSLATE_URL: &str = "https://api.mymemory.translated.net/get";

/// Response from the MyMemory API
#[derive(Debug, serde::Deserialize)]
struct TranslateResponse {
    #[serde(rename = "responseData")]
    response_data: TranslationData,
}

#[derive(Debug, serde::Deserialize)]
struct TranslationData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Translates the rest of the utterance from English to Hindi
pub struct TranslateHandler {
    client: reqwest::Client,
    hindi_voice: Option<String>,
}

impl TranslateHandler {
    /// Create a translation handler
    ///
    /// `hindi_voice` is the TTS voice used to speak the translation; `None`
    /// keeps the default voice.
    #[must_use]
    pub fn new(hindi_voice: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            hindi_voice,
        }
    }
}

#[async_trait]
impl Handler for TranslateHandler {
    fn name(&self) -> &'static str {
        "translate"
    }

    fn keywords(&self) -> &[&'static str] {
        &["translate"]
    }

    async fn handle(&self, utterance: &str) -> Result<Reply> {
        let text = extract_translation_text(utterance);
        if text.is_empty() {
            return Ok(Reply::say("What should I translate?"));
        }

        tracing::debug!(text = %text, "translating to Hindi");

        let url = format!(
            "{TRANSLATE_URL}?q={}&langpair={}",
            urlencoding::encode(&text),
            urlencoding::encode("en|hi")
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "MyMemory API error");
            return Err(Error::Translate(format!(
                "MyMemory API error {status}: {body}"
            )));
        }

        let result: TranslateResponse = response.json().await?;
        let translated = result.response_data.translated_text;
        tracing::info!(translated = %translated, "translation complete");

        let mut reply = Reply::say(translated);
        if let Some(ref voice) = self.hindi_voice {
            reply = reply.with_voice(voice.clone());
        }
        Ok(reply)
    }
}

/// Strip the trigger words from the utterance, leaving the text to translate
///
/// "Translate good morning to Hindi" becomes "good morning".
#[must_use]
pub fn extract_translation_text(utterance: &str) -> String {
    let lower = utterance.to_lowercase();

    let mut text = lower;
    for trigger in ["translate", "into hindi", "to hindi", "in hindi"] {
        text = text.replace(trigger, " ");
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_translation_text() {
        assert_eq!(
            extract_translation_text("Translate good morning to Hindi"),
            "good morning"
        );
        assert_eq!(
            extract_translation_text("translate where is the station"),
            "where is the station"
        );
        assert_eq!(
            extract_translation_text("translate thank you into hindi"),
            "thank you"
        );
        assert_eq!(extract_translation_text("translate"), "");
    }

    #[test]
    fn test_translate_response_parsing() {
        let json = r#"{
            "responseData": {"translatedText": "सुप्रभात", "match": 1.0},
            "responseStatus": 200
        }"#;

        let parsed: TranslateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.response_data.translated_text, "सुप्रभात");
    }
}
