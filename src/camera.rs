//! Webcam frame capture
//!
//! Detection handlers only need JPEG bytes, so capture sits behind the
//! `FrameGrabber` trait and tests can substitute canned frames.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

use crate::{Error, Result};

/// JPEG encoding quality for frames posted to detection APIs
const JPEG_QUALITY: u8 = 85;

/// Source of JPEG-encoded camera frames
pub trait FrameGrabber: Send {
    /// Capture one frame and return it as JPEG bytes
    ///
    /// # Errors
    ///
    /// Returns error if the frame cannot be captured or encoded
    fn grab_jpeg(&mut self) -> Result<Vec<u8>>;
}

/// Webcam frame grabber backed by the local camera device
pub struct Webcam {
    camera: nokhwa::Camera,
}

impl Webcam {
    /// Open the camera at the given device index
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened
    pub fn open(index: u32) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| Error::Camera(e.to_string()))?;

        camera
            .open_stream()
            .map_err(|e| Error::Camera(e.to_string()))?;

        tracing::debug!(index, "camera opened");

        Ok(Self { camera })
    }
}

impl FrameGrabber for Webcam {
    fn grab_jpeg(&mut self) -> Result<Vec<u8>> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| Error::Camera(e.to_string()))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::Camera(e.to_string()))?;

        let mut jpeg = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
        encoder
            .encode(
                decoded.as_raw(),
                decoded.width(),
                decoded.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| Error::Camera(e.to_string()))?;

        tracing::debug!(
            width = decoded.width(),
            height = decoded.height(),
            bytes = jpeg.len(),
            "frame captured"
        );

        Ok(jpeg)
    }
}
