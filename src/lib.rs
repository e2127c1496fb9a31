//! Drishti - a voice-driven assistant for visually impaired users
//!
//! Captures a spoken phrase, recognizes it through a cloud STT service,
//! routes it to one keyword-triggered task handler, and speaks the result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Speech Capture                      │
//! │        Microphone  │  Endpointing  │  STT           │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                Command Dispatcher                    │
//! │        keyword match → at most one handler           │
//! └────────────────────┬────────────────────────────────┘
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Task Handlers                       │
//! │  currency │ objects │ time │ weather │ news │ hindi │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Speech Output                        │
//! │              TTS  │  Playback                       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod assistant;
pub mod camera;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod voice;

pub use assistant::{Assistant, build_router, greeting};
pub use camera::{FrameGrabber, Webcam};
pub use config::Config;
pub use dispatch::{CommandRouter, Route};
pub use error::{Error, Result};
pub use handlers::{Handler, Reply};
