//! Utterance endpointing
//!
//! Decides when a spoken phrase starts and ends using RMS energy over the
//! incoming sample stream. The capture side calibrates the threshold against
//! ambient noise before listening.

/// Energy floor below which calibration never pushes the threshold
const ENERGY_FLOOR: f32 = 0.015;

/// Ambient noise multiplier applied during calibration
const AMBIENT_MARGIN: f32 = 2.0;

/// Minimum speech length to count as a phrase (samples at 16kHz, 0.3s)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends a phrase (samples at 16kHz, 0.8s)
const SILENCE_SAMPLES: usize = 12800;

/// State of the phrase detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseState {
    /// Waiting for speech to start
    Idle,
    /// Speech detected, accumulating the phrase
    Capturing,
}

/// Detects the boundaries of a single spoken phrase
pub struct PhraseDetector {
    threshold: f32,
    state: PhraseState,
    phrase_buffer: Vec<f32>,
    silence_counter: usize,
}

impl Default for PhraseDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseDetector {
    /// Create a detector with the default energy threshold
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: ENERGY_FLOOR,
            state: PhraseState::Idle,
            phrase_buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Calibrate the speech threshold against ambient room noise
    ///
    /// Pass a short sample of silence recorded before listening starts.
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let ambient_energy = rms_energy(ambient);
        self.threshold = (ambient_energy * AMBIENT_MARGIN).max(ENERGY_FLOOR);
        tracing::debug!(
            ambient_energy,
            threshold = self.threshold,
            "phrase detector calibrated"
        );
    }

    /// Feed captured samples into the detector
    pub fn process(&mut self, samples: &[f32]) {
        let energy = rms_energy(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            PhraseState::Idle => {
                if is_speech {
                    self.state = PhraseState::Capturing;
                    self.phrase_buffer.clear();
                    self.phrase_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            PhraseState::Capturing => {
                self.phrase_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }
            }
        }
    }

    /// Whether a complete phrase has been captured
    ///
    /// True once enough speech has accumulated and trailing silence has
    /// passed the endpoint window.
    #[must_use]
    pub fn is_phrase_complete(&self) -> bool {
        self.state == PhraseState::Capturing
            && self.silence_counter > SILENCE_SAMPLES
            && self.phrase_buffer.len() > MIN_SPEECH_SAMPLES
    }

    /// Whether speech is currently being captured
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.state == PhraseState::Capturing
    }

    /// Take the captured phrase and reset to idle
    pub fn take_phrase(&mut self) -> Vec<f32> {
        let phrase = std::mem::take(&mut self.phrase_buffer);
        self.reset();
        phrase
    }

    /// Reset the detector to idle
    pub fn reset(&mut self) {
        self.state = PhraseState::Idle;
        self.phrase_buffer.clear();
        self.silence_counter = 0;
    }

    /// Current detector state
    #[must_use]
    pub const fn state(&self) -> PhraseState {
        self.state
    }

    /// Current speech energy threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_calculation() {
        let silence = vec![0.0f32; 100];
        assert!(rms_energy(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(rms_energy(&loud) > 0.4);
    }

    #[test]
    fn test_calibration_floor() {
        let mut detector = PhraseDetector::new();
        detector.calibrate(&vec![0.0f32; 1600]);
        // Dead-silent rooms still get the floor threshold
        assert!((detector.threshold() - ENERGY_FLOOR).abs() < f32::EPSILON);
    }

    #[test]
    fn test_calibration_noisy_room() {
        let mut detector = PhraseDetector::new();
        detector.calibrate(&vec![0.1f32; 1600]);
        assert!(detector.threshold() > 0.15);
    }

    #[test]
    fn test_phrase_lifecycle() {
        let mut detector = PhraseDetector::new();
        assert_eq!(detector.state(), PhraseState::Idle);

        // Loud speech for 0.5s
        detector.process(&vec![0.5f32; 8000]);
        assert!(detector.is_capturing());
        assert!(!detector.is_phrase_complete());

        // Trailing silence past the endpoint window
        detector.process(&vec![0.0f32; 16000]);
        assert!(detector.is_phrase_complete());

        let phrase = detector.take_phrase();
        assert_eq!(phrase.len(), 24000);
        assert_eq!(detector.state(), PhraseState::Idle);
    }

    #[test]
    fn test_short_blip_not_a_phrase() {
        let mut detector = PhraseDetector::new();

        // 0.1s of sound is below the minimum speech length
        detector.process(&vec![0.5f32; 1600]);
        detector.process(&vec![0.0f32; 16000]);
        assert!(!detector.is_phrase_complete());
    }
}
