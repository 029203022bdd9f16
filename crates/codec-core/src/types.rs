//! Core types and traits for the codec library
//!
//! This module defines the parameter structs which configure each stage of
//! the pipeline, the bitstream format selector, and the codec trait that
//! front ends program against.

use bytes::Bytes;

use crate::error::Result;

/// Sentinel instructing the pipeline to skip an optional filter stage
pub const DISABLE_PARAMETER: i32 = -1;

/// Default sampling rate, in Hertz
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 8000;

/// Default segmentation window width, in milliseconds
pub const DEFAULT_WINDOW_WIDTH_MS: f32 = 25.0;

/// Parameters which must match for all analysis structures
///
/// The pitch-path and LPC-path buffers are segmented with these values, so
/// that frame `i` of one path covers the same span of audio as frame `i`
/// of the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedParameters {
    /// Sampling rate of the source audio, in Hertz
    pub sample_rate_hz: u32,
    /// Segmentation/analysis window width (frame length), in milliseconds
    pub window_width_ms: f32,
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            window_width_ms: DEFAULT_WINDOW_WIDTH_MS,
        }
    }
}

/// Upper vocal tract (LPC analysis) parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpperVocalTractParameters {
    /// Highpass cutoff, in Hertz, or [`DISABLE_PARAMETER`]
    pub highpass_cutoff_hz: i32,
    /// Lowpass cutoff, in Hertz, or [`DISABLE_PARAMETER`]
    pub lowpass_cutoff_hz: i32,
    /// Pre-emphasis coefficient, or a negative value to disable
    pub pre_emphasis_alpha: f32,
    /// LPC model order (the TMS5220 format fixes this at 10)
    pub model_order: usize,
}

impl Default for UpperVocalTractParameters {
    fn default() -> Self {
        Self {
            highpass_cutoff_hz: DISABLE_PARAMETER,
            lowpass_cutoff_hz: DISABLE_PARAMETER,
            pre_emphasis_alpha: DISABLE_PARAMETER as f32,
            model_order: 10,
        }
    }
}

/// Lower vocal tract (pitch and voicing analysis) parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerVocalTractParameters {
    /// Highpass cutoff, in Hertz, or [`DISABLE_PARAMETER`]
    pub highpass_cutoff_hz: i32,
    /// Lowpass cutoff, in Hertz, or [`DISABLE_PARAMETER`]
    pub lowpass_cutoff_hz: i32,
    /// Pre-emphasis coefficient, or a negative value to disable
    pub pre_emphasis_alpha: f32,
    /// Lowest admissible pitch, in Hertz
    pub min_pitch_hz: u32,
    /// Highest admissible pitch, in Hertz
    pub max_pitch_hz: u32,
}

impl Default for LowerVocalTractParameters {
    fn default() -> Self {
        Self {
            highpass_cutoff_hz: DISABLE_PARAMETER,
            lowpass_cutoff_hz: DISABLE_PARAMETER,
            pre_emphasis_alpha: DISABLE_PARAMETER as f32,
            min_pitch_hz: 50,
            max_pitch_hz: 500,
        }
    }
}

/// Frame post-processing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessorParameters {
    /// Offset applied to every non-silent frame's gain index
    pub gain_shift: i32,
    /// Whether to normalize gain toward the per-population ceilings
    pub normalize_gain: bool,
    /// Normalization ceiling for voiced frames, in decibels
    pub max_voiced_gain_db: f32,
    /// Normalization ceiling for unvoiced frames, in decibels
    pub max_unvoiced_gain_db: f32,
    /// Whether to mark near-identical neighbors as repeat frames
    pub detect_repeat_frames: bool,
}

impl Default for PostProcessorParameters {
    fn default() -> Self {
        Self {
            gain_shift: 0,
            normalize_gain: true,
            max_voiced_gain_db: 37.5,
            max_unvoiced_gain_db: 30.0,
            detect_repeat_frames: false,
        }
    }
}

/// Bitstream serialization parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamParameters {
    /// Textual wrapping of the packed bytes
    pub encoder_style: EncoderStyle,
    /// Whether to append an explicit stop frame
    ///
    /// A stop frame tells the TMS5220 to exit Speak External mode. It is
    /// unnecessary for software emulations and for bitstreams burned into
    /// a TMS6100 Voice Synthesis Memory.
    pub include_stop_frame: bool,
}

impl BitstreamParameters {
    /// Create parameters for a given style with a stop frame appended
    pub fn new(encoder_style: EncoderStyle) -> Self {
        Self {
            encoder_style,
            include_stop_frame: true,
        }
    }
}

impl Default for BitstreamParameters {
    fn default() -> Self {
        Self::new(EncoderStyle::Ascii)
    }
}

/// Format of the serialized bitstream
///
/// Every style carries the same byte sequence; only the wrapping varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderStyle {
    /// Comma-delimited lowercase ASCII hex bytes
    Ascii,
    /// C header defining an array of bytes
    C,
    /// C header defining an array of bytes in PROGMEM, for Arduino Talkie
    Arduino,
    /// JSON array of per-frame objects with raw and quantized fields
    Json,
    /// Raw byte sequence
    Binary,
}

impl Default for EncoderStyle {
    fn default() -> Self {
        Self::Ascii
    }
}

/// Voice codec information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecInfo {
    /// Codec name (e.g., "TMS5220")
    pub name: &'static str,
    /// Sample rate in Hz
    pub sample_rate_hz: u32,
    /// Number of channels (always 1 for this family)
    pub channels: u8,
    /// Samples covered by one frame
    pub samples_per_frame: usize,
}

/// Primary trait for voice codecs
///
/// An encode call returns only once the whole bitstream is produced, and a
/// decode call only once all PCM samples are generated. Callers wanting
/// cancellation must drive the per-frame APIs instead.
pub trait VoiceCodec: Send {
    /// Encode mono PCM samples to a packed bitstream
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be analyzed
    fn encode(&mut self, samples: &[f32]) -> Result<Bytes>;

    /// Decode a packed bitstream to mono PCM samples
    ///
    /// # Errors
    ///
    /// Returns an error if the bitstream violates the frame grammar
    fn decode(&mut self, data: &[u8]) -> Result<Vec<f32>>;

    /// Get codec information
    fn info(&self) -> CodecInfo;

    /// Reset internal state, preparing the codec for fresh input
    fn reset(&mut self);
}
