//! Lattice-filter speech synthesis
//!
//! The [`Synthesizer`] reconstructs PCM audio from a frame table the way
//! the TMS5220 does: voiced frames excite a ten-stage all-pole lattice
//! filter with a chirp pulse train, unvoiced frames push the output of a
//! 16-bit LFSR noise generator through the first four stages.

use tracing::debug;

use crate::audio::AudioBuffer;
use crate::codecs::tms5220::frame::Frame;
use crate::codecs::tms5220::tables;

/// Synthesizer activity, tracked across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesizerState {
    /// No speech in progress
    Idle,
    /// A non-silent frame has been seen and the filter is running
    Speaking,
}

/// Reconstructs audio from a table of LPC-10 frames
#[derive(Debug, Clone)]
pub struct Synthesizer {
    sample_rate_hz: u32,
    window_width_ms: f32,
    samples_per_frame: usize,

    state: SynthesizerState,

    // Frame parameters currently loaded into the filter
    energy: f32,
    period: usize,
    k: [f32; tables::N_COEFFS],

    // Lattice filter state
    x: [f32; tables::N_COEFFS],
    u0: f32,

    // Excitation state
    period_count: usize,
    lfsr: u16,

    samples: Vec<f32>,
}

impl Synthesizer {
    /// Create a new synthesizer
    ///
    /// # Arguments
    ///
    /// * `sample_rate_hz` - Output sampling rate, in Hertz
    /// * `window_width_ms` - Frame length, in milliseconds; together with
    ///   the sample rate this fixes the number of samples per frame
    pub fn new(sample_rate_hz: u32, window_width_ms: f32) -> Self {
        let samples_per_frame = (sample_rate_hz as f32 * window_width_ms * 1e-3) as usize;

        Self {
            sample_rate_hz,
            window_width_ms,
            samples_per_frame,
            state: SynthesizerState::Idle,
            energy: 0.0,
            period: 0,
            k: [0.0; tables::N_COEFFS],
            x: [0.0; tables::N_COEFFS],
            u0: 0.0,
            period_count: 0,
            lfsr: 1,
            samples: Vec::new(),
        }
    }

    /// Render an entire frame table to PCM samples
    ///
    /// Returns all samples generated before a stop frame or the end of the
    /// table, whichever comes first. The synthesizer ends Idle with its
    /// filter state fully reset.
    pub fn synthesize(&mut self, frames: &[Frame]) -> Vec<f32> {
        self.reset();

        for frame in frames {
            if self.process_frame(frame) {
                break;
            }
        }

        // End of table: full state reset, rendered samples persist
        self.reset_excitation();
        self.state = SynthesizerState::Idle;

        debug!(
            frames = frames.len(),
            samples = self.samples.len(),
            "synthesized frame table"
        );

        self.samples.clone()
    }

    /// Load one frame and render its span of samples
    ///
    /// This is the per-frame API for callers that poll between frames.
    /// Returns `true` when the frame is a stop frame, which halts speech
    /// and resets the filter.
    pub fn process_frame(&mut self, frame: &Frame) -> bool {
        if self.update_synthesis_table(frame) {
            return true;
        }

        for _ in 0..self.samples_per_frame {
            let sample = self.update_lattice_filter();
            self.samples.push(sample);
        }

        false
    }

    /// Access the samples rendered so far
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Current synthesizer activity
    pub fn state(&self) -> SynthesizerState {
        self.state
    }

    /// Number of samples rendered per frame
    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    /// Package the rendered samples into an audio buffer
    ///
    /// The buffer inherits the synthesizer's sample rate and window width,
    /// so it can be written straight to a WAV file.
    pub fn to_audio_buffer(&self) -> AudioBuffer {
        AudioBuffer::from_samples(
            self.samples.clone(),
            self.sample_rate_hz,
            self.window_width_ms,
        )
    }

    /// Clear rendered samples and reset all filter and excitation state
    pub fn reset(&mut self) {
        self.reset_excitation();
        self.state = SynthesizerState::Idle;
        self.samples.clear();
    }

    /// Load a frame's parameters into the synthesis table
    ///
    /// Returns `true` for a stop frame.
    fn update_synthesis_table(&mut self, frame: &Frame) -> bool {
        let gain_index = frame.quantized_gain();

        if gain_index == 0 {
            // Silent frame: energy is cut but filter state persists
            self.energy = 0.0;
        } else if gain_index == tables::STOP_FRAME_GAIN_INDEX {
            self.reset_excitation();
            self.state = SynthesizerState::Idle;
            return true;
        } else {
            self.energy = tables::ENERGY[gain_index];
            self.period = tables::PITCH[frame.quantized_pitch()] as usize;
            self.state = SynthesizerState::Speaking;

            // A repeat frame reuses the previous spectral envelope
            if !frame.is_repeat() {
                let coeffs = frame.quantized_coeffs();

                for i in 0..4 {
                    self.k[i] = tables::K_TABLES[i][coeffs[i]];
                }

                // Voiced-only parameters
                if self.period != 0 {
                    for i in 4..tables::N_COEFFS {
                        self.k[i] = tables::K_TABLES[i][coeffs[i]];
                    }
                }
            }
        }

        false
    }

    /// Generate one excitation sample and push it through the lattice
    fn update_lattice_filter(&mut self) -> f32 {
        if self.period != 0 {
            // Voiced: walk the chirp once per pitch period
            if self.period_count < self.period {
                self.period_count += 1;
            } else {
                self.period_count = 0;
            }

            self.u0 = if self.period_count < tables::CHIRP.len() {
                tables::CHIRP[self.period_count] * self.energy
            } else {
                0.0
            };
        } else {
            // Unvoiced: flat-spectrum noise from the LFSR
            self.u0 = if self.advance_noise() {
                self.energy
            } else {
                -self.energy
            };
        }

        // Unvoiced excitation only drives the first four stages; the upper
        // stages idle with their coefficients untouched
        let top = if self.period != 0 {
            self.u0 -= self.k[9] * self.x[9];
            9
        } else {
            4
        };

        for i in (1..=top).rev() {
            self.u0 -= self.k[i - 1] * self.x[i - 1];
            self.x[i] = self.x[i - 1] + self.k[i - 1] * self.u0;
        }

        self.x[0] = self.u0.clamp(-1.0, 1.0);
        self.x[0]
    }

    /// Advance the 16-bit noise LFSR and report its output bit
    fn advance_noise(&mut self) -> bool {
        let feedback = if self.lfsr & 1 == 1 { 0xB800 } else { 0 };
        self.lfsr = (self.lfsr >> 1) ^ feedback;
        self.lfsr & 1 == 1
    }

    fn reset_excitation(&mut self) {
        self.energy = 0.0;
        self.period = 0;
        self.k = [0.0; tables::N_COEFFS];
        self.x = [0.0; tables::N_COEFFS];
        self.u0 = 0.0;
        self.period_count = 0;
        self.lfsr = 1;
    }
}
