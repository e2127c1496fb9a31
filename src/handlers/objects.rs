//! Object detection around the user
//!
//! Captures one webcam frame and asks the Imagga tagging API what is in it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::camera::FrameGrabber;
use crate::handlers::{Handler, Reply};
use crate::{Error, Result};

/// Imagga tagging endpoint
const TAGS_URL: &str = "https://api.imagga.com/v2/tags";

/// Minimum tag confidence (Imagga reports 0 to 100)
const CONFIDENCE_THRESHOLD: f64 = 30.0;

/// Response from the Imagga tagging API
#[derive(Debug, serde::Deserialize)]
pub struct TagsResponse {
    pub result: TagsResult,
}

#[derive(Debug, serde::Deserialize)]
pub struct TagsResult {
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// One tag with its confidence
#[derive(Debug, serde::Deserialize)]
pub struct Tag {
    pub confidence: f64,
    pub tag: TagLabel,
}

#[derive(Debug, serde::Deserialize)]
pub struct TagLabel {
    pub en: String,
}

/// Announces objects visible through the webcam
pub struct ObjectsHandler {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    camera: Arc<Mutex<dyn FrameGrabber>>,
}

impl ObjectsHandler {
    /// Create an object detection handler
    ///
    /// # Errors
    ///
    /// Returns error if the API key or secret is missing
    pub fn new(
        api_key: String,
        api_secret: String,
        camera: Arc<Mutex<dyn FrameGrabber>>,
    ) -> Result<Self> {
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(Error::Config(
                "Imagga API key and secret required for object detection".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            api_secret,
            camera,
        })
    }

    async fn tag_frame(&self, jpeg: Vec<u8>) -> Result<TagsResponse> {
        let form = reqwest::multipart::Form::new().part(
            "image",
            reqwest::multipart::Part::bytes(jpeg)
                .file_name("frame.jpg")
                .mime_str("image/jpeg")
                .map_err(|e| Error::Detection(e.to_string()))?,
        );

        let response = self
            .client
            .post(TAGS_URL)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Imagga API error");
            return Err(Error::Detection(format!(
                "Imagga API error {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Handler for ObjectsHandler {
    fn name(&self) -> &'static str {
        "objects"
    }

    fn keywords(&self) -> &[&'static str] {
        &["detect", "around me", "what do you see"]
    }

    async fn handle(&self, _utterance: &str) -> Result<Reply> {
        let jpeg = {
            let mut camera = self
                .camera
                .lock()
                .map_err(|_| Error::Camera("camera lock poisoned".to_string()))?;
            camera.grab_jpeg()?
        };

        tracing::debug!(bytes = jpeg.len(), "posting frame for tagging");

        let tags = self.tag_frame(jpeg).await?;
        let names: Vec<String> = tags
            .result
            .tags
            .into_iter()
            .filter(|t| t.confidence > CONFIDENCE_THRESHOLD)
            .map(|t| t.tag.en)
            .collect();

        tracing::info!(count = names.len(), "objects tagged");
        Ok(Reply::say(format_tags(&names)))
    }
}

/// Format a spoken sentence from the detected tags
#[must_use]
pub fn format_tags(names: &[String]) -> String {
    if names.is_empty() {
        "I could not make out anything around you.".to_string()
    } else {
        format!("I found {} around you.", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags() {
        let names = vec!["table".to_string(), "chair".to_string(), "lamp".to_string()];
        assert_eq!(format_tags(&names), "I found table, chair, lamp around you.");
    }

    #[test]
    fn test_format_no_tags() {
        assert_eq!(
            format_tags(&[]),
            "I could not make out anything around you."
        );
    }

    #[test]
    fn test_tags_response_parsing() {
        let json = r#"{
            "result": {
                "tags": [
                    {"confidence": 62.4, "tag": {"en": "table"}},
                    {"confidence": 12.9, "tag": {"en": "sky"}}
                ]
            }
        }"#;

        let parsed: TagsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.result.tags.len(), 2);
        assert_eq!(parsed.result.tags[0].tag.en, "table");

        let names: Vec<String> = parsed
            .result
            .tags
            .into_iter()
            .filter(|t| t.confidence > CONFIDENCE_THRESHOLD)
            .map(|t| t.tag.en)
            .collect();
        assert_eq!(names, vec!["table".to_string()]);
    }
}
