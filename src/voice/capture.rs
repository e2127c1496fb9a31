//! Microphone capture
//!
//! Single-shot phrase recording: each call blocks until one utterance has
//! been endpointed or the timeout elapses.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};

use crate::voice::endpoint::PhraseDetector;
use crate::{Error, Result};

/// Sample rate for speech capture (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Ambient noise measured before listening starts
const CALIBRATION_WINDOW: Duration = Duration::from_millis(500);

/// Poll interval while waiting for a phrase
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Records single phrases from the default input device
pub struct Microphone {
    #[allow(dead_code)]
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
}

impl Microphone {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if no suitable input device or config is found
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable capture config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "microphone opened"
        );

        Ok(Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Record one phrase, blocking until it is endpointed
    ///
    /// Calibrates against ambient noise, then accumulates audio until the
    /// speaker pauses. Returns `None` if no phrase was heard before the
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the capture stream cannot be started
    pub fn record_phrase(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>> {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        let buffer = Arc::clone(&self.buffer);
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device".to_string()))?;

        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "capture stream error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let mut detector = PhraseDetector::new();

        // Let the room settle, then calibrate against what was heard
        std::thread::sleep(CALIBRATION_WINDOW);
        let ambient = self.take_buffer();
        detector.calibrate(&ambient);

        tracing::debug!("listening");

        let deadline = Instant::now() + timeout;
        let phrase = loop {
            std::thread::sleep(POLL_INTERVAL);

            let chunk = self.take_buffer();
            detector.process(&chunk);

            if detector.is_phrase_complete() {
                break Some(detector.take_phrase());
            }

            if Instant::now() >= deadline {
                tracing::debug!("listen timeout, no phrase captured");
                break None;
            }
        };

        drop(stream);

        if let Some(ref samples) = phrase {
            tracing::debug!(samples = samples.len(), "phrase captured");
        }

        Ok(phrase)
    }

    /// Get captured audio and clear the buffer
    fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

/// Convert f32 samples to WAV bytes for the STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
