//! LPC-10 frame record and coding-table quantization
//!
//! A frame is the smallest unit of speech the TMS5220 can represent. It
//! typically corresponds to a 22.5-30 ms window of audio and holds a pitch
//! period, a voicing decision, a gain, and ten reflector coefficients. The
//! parameters do not travel as numerical values: the bitstream carries
//! indices into the coding tables the synthesizer possesses.

use serde::Serialize;

use crate::codecs::tms5220::tables;

/// Analysis parameters for one segment of speech
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pitch_period: usize,
    is_voiced: bool,
    gain_db: f32,
    coeffs: [f32; tables::N_COEFFS],
    is_repeat: bool,
}

/// Serialized view of a frame, carrying raw and quantized fields
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    /// Pitch period, in samples
    pub pitch_period: usize,
    /// Whether the frame is voiced
    pub is_voiced: bool,
    /// Whether the frame repeats its predecessor's spectral envelope
    pub is_repeat: bool,
    /// Gain, in decibels
    pub gain_db: f32,
    /// Reflector coefficients
    pub coeffs: Vec<f32>,
    /// Pitch index into the coding table
    pub quantized_pitch: usize,
    /// Gain index into the coding table
    pub quantized_gain: usize,
    /// Reflector-coefficient indices into the coding tables
    pub quantized_coeffs: Vec<usize>,
}

impl Frame {
    /// Create a new frame
    ///
    /// The gain may be NaN if the autocorrelation is zero, which has been
    /// observed when the frame is completely silent or when the highpass
    /// cutoff is set too low. Such frames are neutralized to silence.
    ///
    /// # Arguments
    ///
    /// * `pitch_period` - Pitch period, in samples
    /// * `is_voiced` - Whether the segment is vowel-like (voiced) or
    ///   consonant-like (unvoiced)
    /// * `gain_db` - Frame gain, in decibels
    /// * `coeffs` - LPC reflector coefficients; entries beyond the tenth are
    ///   ignored, missing entries are zero
    pub fn new(pitch_period: usize, is_voiced: bool, gain_db: f32, coeffs: &[f32]) -> Self {
        let mut frame = Self {
            pitch_period,
            is_voiced,
            gain_db,
            coeffs: [0.0; tables::N_COEFFS],
            is_repeat: false,
        };

        if gain_db.is_nan() {
            frame.gain_db = 0.0;
        } else {
            let n = coeffs.len().min(tables::N_COEFFS);
            frame.coeffs[..n].copy_from_slice(&coeffs[..n]);
        }

        frame
    }

    /// Create a silent frame
    pub fn silent() -> Self {
        Self::new(0, false, 0.0, &[])
    }

    /// Return the pitch period, in samples
    pub fn pitch_period(&self) -> usize {
        self.pitch_period
    }

    /// Set the pitch period, in samples
    pub fn set_pitch_period(&mut self, pitch_period: usize) {
        self.pitch_period = pitch_period;
    }

    /// Return the gain, in decibels
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Set the gain to an exact value, in decibels
    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = gain_db;
    }

    /// Set the gain to the coding-table entry at the given index
    ///
    /// Indices beyond the table are clamped to its last entry.
    pub fn set_gain_index(&mut self, index: usize) {
        let clamped = index.min(tables::RMS.len() - 1);
        self.gain_db = tables::RMS[clamped];
    }

    /// Return the reflector coefficients
    pub fn coeffs(&self) -> &[f32] {
        &self.coeffs
    }

    /// Replace the reflector coefficients
    pub fn set_coeffs(&mut self, coeffs: &[f32]) {
        self.coeffs = [0.0; tables::N_COEFFS];
        let n = coeffs.len().min(tables::N_COEFFS);
        self.coeffs[..n].copy_from_slice(&coeffs[..n]);
    }

    /// Return whether the frame reuses its predecessor's spectral envelope
    pub fn is_repeat(&self) -> bool {
        self.is_repeat
    }

    /// Mark the frame as identical to its neighbor
    ///
    /// Marking a frame as repeat reduces its storage cost to 11 bits.
    pub fn set_repeat(&mut self, is_repeat: bool) {
        self.is_repeat = is_repeat;
    }

    /// Return whether the frame is voiced
    pub fn is_voiced(&self) -> bool {
        self.is_voiced
    }

    /// Mark the frame as voiced or unvoiced
    pub fn set_voicing(&mut self, is_voiced: bool) {
        self.is_voiced = is_voiced;
    }

    /// Return whether the frame is silent
    ///
    /// A frame is silent iff its gain quantizes to index zero.
    pub fn is_silent(&self) -> bool {
        self.quantized_gain() == 0
    }

    /// Return the gain index into the coding table
    pub fn quantized_gain(&self) -> usize {
        closest_index(self.gain_db, &tables::RMS)
    }

    /// Return the pitch index into the coding table
    pub fn quantized_pitch(&self) -> usize {
        closest_index(self.pitch_period as f32, &tables::PITCH)
    }

    /// Return the reflector-coefficient indices into the coding tables
    pub fn quantized_coeffs(&self) -> [usize; tables::N_COEFFS] {
        let mut indices = [0usize; tables::N_COEFFS];

        for (i, index) in indices.iter_mut().enumerate() {
            *index = closest_index(self.coeffs[i], tables::K_TABLES[i]);
        }

        indices
    }

    /// Return a serializable view with raw and quantized fields
    pub fn record(&self) -> FrameRecord {
        FrameRecord {
            pitch_period: self.pitch_period,
            is_voiced: self.is_voiced,
            is_repeat: self.is_repeat,
            gain_db: self.gain_db,
            coeffs: self.coeffs.to_vec(),
            quantized_pitch: self.quantized_pitch(),
            quantized_gain: self.quantized_gain(),
            quantized_coeffs: self.quantized_coeffs().to_vec(),
        }
    }
}

/// Find the index of the coding-table entry closest to the given value
///
/// Ties break toward the lower index, and values beyond either end of the
/// table clamp to it.
pub fn closest_index(value: f32, table: &[f32]) -> usize {
    if value <= table[0] {
        return 0;
    }

    for i in 1..table.len() {
        let right = table[i];
        let left = table[i - 1];

        if value < right {
            let right_distance = right - value;
            let left_distance = value - left;

            return if right_distance < left_distance { i } else { i - 1 };
        }
    }

    table.len() - 1
}
