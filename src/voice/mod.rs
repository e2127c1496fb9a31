//! Voice pipeline
//!
//! Microphone capture with energy-based endpointing, cloud STT/TTS, and
//! speaker playback. Capture and playback both block per call.

mod capture;
mod endpoint;
mod playback;
mod stt;
mod tts;

pub use capture::{Microphone, SAMPLE_RATE, samples_to_wav};
pub use endpoint::{PhraseDetector, PhraseState, rms_energy};
pub use playback::Speaker;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
