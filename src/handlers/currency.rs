//! Indian currency note recognition
//!
//! Posts webcam frames to the Roboflow hosted detection model and announces
//! the detected denomination. Frames are tried until one yields a confident
//! detection, bounded by `max_frames`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::camera::FrameGrabber;
use crate::config::CameraConfig;
use crate::handlers::{Handler, Reply};
use crate::{Error, Result};

/// Roboflow hosted inference endpoint
const DETECT_URL: &str = "https://detect.roboflow.com";

/// Roboflow project for Indian currency notes
const PROJECT_NAME: &str = "indian-currency-detector-boyiq";

/// Model version within the project
const MODEL_VERSION: &str = "1";

/// Response from the Roboflow detection API
#[derive(Debug, serde::Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// One detected object
#[derive(Debug, serde::Deserialize)]
pub struct Prediction {
    /// Class label (e.g. "five-hundred", "ten-front")
    pub class: String,

    /// Detection confidence (0.0 to 1.0)
    pub confidence: f32,
}

/// Recognizes currency notes through the webcam
pub struct CurrencyHandler {
    client: reqwest::Client,
    api_key: String,
    confidence: f32,
    overlap: f32,
    max_frames: u32,
    camera: Arc<Mutex<dyn FrameGrabber>>,
}

impl CurrencyHandler {
    /// Create a currency handler
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(
        api_key: String,
        camera_config: &CameraConfig,
        camera: Arc<Mutex<dyn FrameGrabber>>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Roboflow API key required for currency recognition".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            confidence: camera_config.confidence,
            overlap: camera_config.overlap,
            max_frames: camera_config.max_frames,
            camera,
        })
    }

    async fn detect_frame(&self, jpeg: Vec<u8>) -> Result<DetectResponse> {
        let url = format!(
            "{DETECT_URL}/{PROJECT_NAME}/{MODEL_VERSION}?api_key={}&confidence={}&overlap={}",
            self.api_key, self.confidence, self.overlap
        );

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(jpeg)
                .file_name("frame.jpg")
                .mime_str("image/jpeg")
                .map_err(|e| Error::Detection(e.to_string()))?,
        );

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Roboflow API error");
            return Err(Error::Detection(format!(
                "Roboflow API error {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Handler for CurrencyHandler {
    fn name(&self) -> &'static str {
        "currency"
    }

    fn keywords(&self) -> &[&'static str] {
        &["currency", "note", "rupee"]
    }

    async fn handle(&self, _utterance: &str) -> Result<Reply> {
        for attempt in 1..=self.max_frames {
            let jpeg = {
                let mut camera = self
                    .camera
                    .lock()
                    .map_err(|_| Error::Camera("camera lock poisoned".to_string()))?;
                camera.grab_jpeg()?
            };

            tracing::debug!(attempt, bytes = jpeg.len(), "posting frame for detection");

            let detections = self.detect_frame(jpeg).await?;

            if let Some(value) = pick_denomination(&detections.predictions, self.confidence) {
                tracing::info!(value, attempt, "currency note recognized");
                return Ok(Reply::say(format!("{value} rupees")));
            }
        }

        Ok(Reply::say(
            "I could not recognize a currency note. Please hold it closer to the camera.",
        ))
    }
}

/// Map a detection class label to a rupee denomination
///
/// Labels arrive as e.g. "five-hundred", "ten-front", "hundred_back"; the
/// front/back suffix is ignored.
#[must_use]
pub fn denomination(label: &str) -> Option<u32> {
    let normalized = label.to_lowercase().replace('-', "_");
    let base = normalized
        .strip_suffix("_front")
        .or_else(|| normalized.strip_suffix("_back"))
        .unwrap_or(&normalized);

    match base {
        "ten" => Some(10),
        "twenty" => Some(20),
        "fifty" => Some(50),
        "hundred" | "one_hundred" => Some(100),
        "two_hundred" => Some(200),
        "five_hundred" => Some(500),
        "two_thousand" => Some(2000),
        _ => None,
    }
}

/// Pick the denomination of the most confident recognizable prediction
#[must_use]
pub fn pick_denomination(predictions: &[Prediction], min_confidence: f32) -> Option<u32> {
    predictions
        .iter()
        .filter(|p| p.confidence >= min_confidence)
        .filter_map(|p| denomination(&p.class).map(|d| (d, p.confidence)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, _)| d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denomination_labels() {
        assert_eq!(denomination("five-hundred"), Some(500));
        assert_eq!(denomination("two-thousand"), Some(2000));
        assert_eq!(denomination("ten-front"), Some(10));
        assert_eq!(denomination("ten-back"), Some(10));
        assert_eq!(denomination("hundred_front"), Some(100));
        assert_eq!(denomination("twenty-back"), Some(20));
        assert_eq!(denomination("two-hundred"), Some(200));
        assert_eq!(denomination("fifty-front"), Some(50));
        assert_eq!(denomination("FIFTY-BACK"), Some(50));
        assert_eq!(denomination("dollar"), None);
    }

    #[test]
    fn test_pick_most_confident() {
        let predictions = vec![
            Prediction {
                class: "ten-front".to_string(),
                confidence: 0.85,
            },
            Prediction {
                class: "five-hundred".to_string(),
                confidence: 0.93,
            },
        ];

        assert_eq!(pick_denomination(&predictions, 0.8), Some(500));
    }

    #[test]
    fn test_pick_ignores_low_confidence() {
        let predictions = vec![Prediction {
            class: "five-hundred".to_string(),
            confidence: 0.4,
        }];

        assert_eq!(pick_denomination(&predictions, 0.8), None);
    }

    #[test]
    fn test_pick_ignores_unknown_labels() {
        let predictions = vec![Prediction {
            class: "background".to_string(),
            confidence: 0.99,
        }];

        assert_eq!(pick_denomination(&predictions, 0.8), None);
    }

    #[test]
    fn test_detect_response_parsing() {
        let json = r#"{
            "predictions": [
                {"x": 320.0, "y": 240.0, "width": 200.0, "height": 90.0,
                 "confidence": 0.91, "class": "five-hundred"}
            ]
        }"#;

        let parsed: DetectResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.predictions.len(), 1);
        assert_eq!(parsed.predictions[0].class, "five-hundred");
        assert_eq!(pick_denomination(&parsed.predictions, 0.8), Some(500));
    }
}
