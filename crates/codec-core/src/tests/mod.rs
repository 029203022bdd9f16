//! Shared test utilities and cross-module integration tests

use crate::codecs::tms5220::{Frame, FrameEncoder, Tms5220Codec};
use crate::types::VoiceCodec;

/// Deterministic test-signal generators
pub mod signals {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::PI;

    /// Generate a sinusoid with the given period in samples
    pub fn sine(length: usize, period: f32, amplitude: f32) -> Vec<f32> {
        (0..length)
            .map(|n| (2.0 * PI * n as f32 / period).sin() * amplitude)
            .collect()
    }

    /// Generate a decaying cosine: `a * cos(2 pi n / p) * exp(-d * n)`
    pub fn damped_cosine(length: usize, period: f32, amplitude: f32, decay: f32) -> Vec<f32> {
        (0..length)
            .map(|n| (2.0 * PI * n as f32 / period).cos() * amplitude * (-decay * n as f32).exp())
            .collect()
    }

    /// Generate seeded uniform noise
    pub fn noise(length: usize, amplitude: f32, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..length)
            .map(|_| rng.gen_range(-amplitude..amplitude))
            .collect()
    }

    /// Generate a vowel-like signal with three formants and an envelope
    pub fn speech_like(length: usize, sample_rate: u32) -> Vec<f32> {
        let formants = [500.0f32, 1500.0, 2500.0];
        let gains = [0.5f32, 0.3, 0.2];

        (0..length)
            .map(|n| {
                let t = n as f32 / sample_rate as f32;
                let mut sample = 0.0;

                for (frequency, gain) in formants.iter().zip(gains.iter()) {
                    sample += (2.0 * PI * frequency * t).sin() * gain;
                }

                let envelope = (2.0 * PI * 5.0 * t).sin().abs();
                sample * envelope
            })
            .collect()
    }

    /// Index of the first local maximum after the initial descent of an ACF
    pub fn first_peak_after_trough(acf: &[f32]) -> usize {
        let mut i = 0;

        while i + 1 < acf.len() && acf[i + 1] < acf[i] {
            i += 1;
        }

        while i + 1 < acf.len() && acf[i + 1] > acf[i] {
            i += 1;
        }

        i
    }
}

#[test]
fn test_end_to_end_voiced_round_trip() {
    // Encode a periodic tone, parse the ASCII form back, and resynthesize
    let input = signals::sine(8000, 50.0, 0.5);
    let codec = Tms5220Codec::new();

    let frames = codec.analyze(&input).unwrap();
    let hex = FrameEncoder::from_frames(&frames).to_hex(true);

    let parsed = codec.parse_ascii(&hex).unwrap();
    assert_eq!(parsed.len(), frames.len());

    for (parsed_frame, frame) in parsed.iter().zip(frames.iter()) {
        assert_eq!(parsed_frame.quantized_gain(), frame.quantized_gain());
        assert_eq!(parsed_frame.quantized_pitch(), frame.quantized_pitch());
    }

    let pcm = codec.synthesize(&parsed);
    assert_eq!(pcm.len(), input.len());
    assert!(pcm.iter().any(|&s| s != 0.0));
}

#[test]
fn test_end_to_end_speech_like_signal() {
    let input = signals::speech_like(8000, 8000);
    let mut codec = Tms5220Codec::new();

    let encoded = codec.encode(&input).unwrap();
    assert!(!encoded.is_empty());

    let pcm = codec.decode(&encoded).unwrap();
    assert_eq!(pcm.len(), input.len());

    // Output stays within the clamped range
    assert!(pcm.iter().all(|&s| (-1.0..=1.0).contains(&s)));
}

#[test]
fn test_noise_produces_unvoiced_frames() {
    // Broadband noise has no consistent low-frequency correlation, so at
    // least part of it reads as unvoiced (k1 >= 0)
    let input = signals::noise(8000, 0.5, 42);
    let codec = Tms5220Codec::new();

    let frames = codec.analyze(&input).unwrap();
    assert!(frames.iter().any(|f| !f.is_voiced()));
}

#[test]
fn test_synthesized_audio_renders_to_wav() {
    let input = signals::sine(2000, 50.0, 0.5);
    let mut codec = Tms5220Codec::new();

    let encoded = codec.encode(&input).unwrap();
    let pcm = codec.decode(&encoded).unwrap();

    let buffer = crate::audio::AudioBuffer::from_samples(pcm, 8000, 25.0);
    let dir = temp_dir::TempDir::new().unwrap();
    let path = dir.path().join("synth.wav");

    buffer.render(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_frame_table_survives_repeat_marking() {
    // Repeat frames shrink the bitstream but must still parse and render
    let input = signals::sine(8000, 50.0, 0.5);

    let codec = Tms5220Codec::new().with_post_processor(crate::types::PostProcessorParameters {
        detect_repeat_frames: true,
        ..Default::default()
    });

    let frames = codec.analyze(&input).unwrap();
    let n_repeats = frames.iter().filter(|f| f.is_repeat()).count();

    let hex = FrameEncoder::from_frames(&frames).to_hex(true);
    let parsed = codec.parse_ascii(&hex).unwrap();

    assert_eq!(parsed.len(), frames.len());
    assert_eq!(parsed.iter().filter(|f| f.is_repeat()).count(), n_repeats);

    let pcm = codec.synthesize(&parsed);
    assert_eq!(pcm.len(), input.len());
}

#[test]
fn test_stop_frame_bounds_synthesis() {
    // A stop frame in the middle of a parsed table halts rendering there
    let mut table = vec![
        Frame::new(38, true, 300.0, &[-0.7, 0.2, 0.1, -0.1, 0.1, 0.3, 0.0, 0.2, -0.2, 0.1]),
        Frame::new(38, true, 300.0, &[-0.7, 0.2, 0.1, -0.1, 0.1, 0.3, 0.0, 0.2, -0.2, 0.1]),
    ];
    table.push(Frame::new(0, false, crate::codecs::tms5220::tables::RMS[15], &[]));
    table.push(table[0].clone());

    let codec = Tms5220Codec::new();
    let pcm = codec.synthesize(&table);

    assert_eq!(pcm.len(), 2 * codec.samples_per_frame());
}
