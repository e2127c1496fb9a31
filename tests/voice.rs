//! Voice pipeline integration tests
//!
//! Exercises endpointing and WAV encoding with synthetic audio. No audio
//! hardware is needed.

use drishti::voice::{rms_energy, samples_to_wav, PhraseDetector, PhraseState, SAMPLE_RATE};

/// Generate a sine wave at the capture rate
#[allow(clippy::cast_precision_loss)]
fn sine_wave(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude
        })
        .collect()
}

/// Generate silence
#[allow(clippy::cast_precision_loss)]
fn silence(duration_secs: f32) -> Vec<f32> {
    vec![0.0; (SAMPLE_RATE as f32 * duration_secs) as usize]
}

#[test]
fn test_detector_captures_a_spoken_phrase() {
    let mut detector = PhraseDetector::new();
    detector.calibrate(&silence(0.5));

    // One second of "speech" followed by a pause
    let speech = sine_wave(300.0, 1.0, 0.3);
    for chunk in speech.chunks(1600) {
        detector.process(chunk);
    }
    assert_eq!(detector.state(), PhraseState::Capturing);
    assert!(!detector.is_phrase_complete());

    let quiet = silence(1.0);
    for chunk in quiet.chunks(1600) {
        detector.process(chunk);
    }
    assert!(detector.is_phrase_complete());

    let phrase = detector.take_phrase();
    // Phrase plus the trailing silence that ended it
    assert!(phrase.len() >= speech.len());
    assert_eq!(detector.state(), PhraseState::Idle);
}

#[test]
fn test_detector_ignores_quiet_audio() {
    let mut detector = PhraseDetector::new();
    detector.calibrate(&silence(0.5));

    // Well below the energy floor
    let hum = sine_wave(60.0, 2.0, 0.005);
    for chunk in hum.chunks(1600) {
        detector.process(chunk);
    }

    assert_eq!(detector.state(), PhraseState::Idle);
    assert!(!detector.is_phrase_complete());
}

#[test]
fn test_calibration_raises_threshold_in_noisy_room() {
    let mut quiet_room = PhraseDetector::new();
    quiet_room.calibrate(&silence(0.5));

    let mut noisy_room = PhraseDetector::new();
    noisy_room.calibrate(&sine_wave(120.0, 0.5, 0.1));

    assert!(noisy_room.threshold() > quiet_room.threshold());

    // Speech that clears the quiet threshold but not the noisy one
    let murmur = sine_wave(300.0, 0.1, 0.03);
    quiet_room.process(&murmur);
    noisy_room.process(&murmur);

    assert_eq!(quiet_room.state(), PhraseState::Capturing);
    assert_eq!(noisy_room.state(), PhraseState::Idle);
}

#[test]
fn test_rms_energy_scales_with_amplitude() {
    let quiet = sine_wave(440.0, 0.1, 0.1);
    let loud = sine_wave(440.0, 0.1, 0.5);

    assert!(rms_energy(&loud) > rms_energy(&quiet) * 4.0);
    assert!(rms_energy(&silence(0.1)) < 0.001);
}

#[test]
fn test_wav_encoding_is_readable() {
    let samples = sine_wave(440.0, 0.25, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav[..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");

    let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, samples.len());
}

#[test]
fn test_wav_encoding_clamps_out_of_range_samples() {
    let samples = vec![2.0, -2.0, 0.0];
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
    let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(decoded, vec![32767, -32768, 0]);
}
