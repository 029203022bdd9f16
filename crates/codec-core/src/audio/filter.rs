//! Time-domain filters for analysis preprocessing
//!
//! Filtering reduces the impact of unnecessary frequency components on
//! speech analysis. The bank implements biquadratic highpass and lowpass
//! filters, a single-pole pre-emphasis filter, and the Hamming window
//! applied to segments ahead of autocorrelation.
//!
//! The biquad algorithms follow Robert Bristow-Johnson's Audio EQ Cookbook.

use std::f32::consts::PI;

use crate::audio::buffer::AudioBuffer;

/// Design rate for the biquad coefficient equations, in Hertz
const DESIGN_SAMPLE_RATE_HZ: f32 = 8000.0;

/// Fixed quality factor (1/sqrt(2), a Butterworth response)
const BIQUAD_Q: f32 = 0.707;

enum FilterMode {
    Highpass,
    Lowpass,
}

/// Apply a pre-emphasis filter in place
///
/// `y[0] = x[0]; y[n] = x[n] - alpha * x[n-1]`
///
/// Pre-emphasis exaggerates the high-frequency components of the signal,
/// compensating for the spectral tilt of voiced speech ahead of LPC
/// analysis. A typical coefficient is 0.9375.
pub fn pre_emphasis(buffer: &mut AudioBuffer, alpha: f32) {
    let samples = buffer.samples_mut();

    for n in (1..samples.len()).rev() {
        samples[n] -= alpha * samples[n - 1];
    }
}

/// Apply a biquadratic highpass filter in place
pub fn highpass(buffer: &mut AudioBuffer, cutoff_hz: u32) {
    let coeffs = biquad_coefficients(&FilterMode::Highpass, cutoff_hz);
    apply_biquad(buffer.samples_mut(), &coeffs);
}

/// Apply a biquadratic lowpass filter in place
pub fn lowpass(buffer: &mut AudioBuffer, cutoff_hz: u32) {
    let coeffs = biquad_coefficients(&FilterMode::Lowpass, cutoff_hz);
    apply_biquad(buffer.samples_mut(), &coeffs);
}

/// Apply a Hamming window to a segment in place
///
/// `x[n] *= 0.54 - 0.46 * cos(2 * pi * n / N)`
///
/// Information about the transition between adjacent segments is lost
/// during segmentation; windowing smooths the boundaries so the
/// autocorrelation is not dominated by edge discontinuities.
pub fn hamming_window(segment: &mut [f32]) {
    let size = segment.len();

    for (n, sample) in segment.iter_mut().enumerate() {
        let theta = 2.0 * PI * n as f32 / size as f32;
        let window = 0.54 - 0.46 * theta.cos();
        *sample *= window;
    }
}

/// Apply a Hamming window to every segment of a buffer in place
pub fn hamming_window_buffer(buffer: &mut AudioBuffer) {
    for i in 0..buffer.n_segments() {
        if let Ok(segment) = buffer.segment_mut(i) {
            hamming_window(segment);
        }
    }
}

/// Standard RBJ coefficients: `[b0, b1, b2, a1, a2, a0]`
fn biquad_coefficients(mode: &FilterMode, cutoff_hz: u32) -> [f32; 6] {
    let omega = 2.0 * PI * cutoff_hz as f32 / DESIGN_SAMPLE_RATE_HZ;
    let cs = omega.cos();
    let sn = omega.sin();
    let alpha = sn / (2.0 * BIQUAD_Q);

    let (b0, b1) = match mode {
        FilterMode::Highpass => ((1.0 + cs) / 2.0, -(1.0 + cs)),
        FilterMode::Lowpass => ((1.0 - cs) / 2.0, 1.0 - cs),
    };

    [b0, b1, b0, -2.0 * cs, 1.0 - alpha, 1.0 + alpha]
}

/// Direct-form-I iteration, normalized by a0 at each step
fn apply_biquad(samples: &mut [f32], coeffs: &[f32; 6]) {
    let [b0, b1, b2, a1, a2, a0] = *coeffs;

    let (mut x1, mut x2) = (0.0f32, 0.0f32);
    let (mut y1, mut y2) = (0.0f32, 0.0f32);

    for sample in samples.iter_mut() {
        let x = *sample;
        let result = (b0 * x + b1 * x1 + b2 * x2 - a1 * y1 - a2 * y2) / a0;

        x2 = x1;
        x1 = x;
        y2 = y1;
        y1 = result;

        *sample = result;
    }
}
