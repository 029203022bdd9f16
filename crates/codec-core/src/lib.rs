//! # TMSVOX Codec-Core: TMS5220 LPC-10 Voice Codec
//!
//! Converts recorded speech into a compact bitstream compatible with the
//! TMS5220 Voice Synthesis Processor's LPC-10 encoding, and resynthesizes
//! speech-like audio from such bitstreams. Targets classic
//! speech-synthesis silicon, Arduino Talkie-style embedded replay, and
//! software emulators.
//!
//! ## Features
//!
//! - **LPC-10 analysis**: autocorrelation pitch estimation and
//!   Levinson-Durbin reflector coefficients, with independent filter paths
//!   for the upper and lower vocal tract
//! - **Datasheet coding tables**: quantization onto the TMS5220 gain,
//!   pitch, and K-coefficient tables
//! - **Bit-exact packing**: variable-width frame grammar with per-byte bit
//!   reversal, matching the LSB-first TMS6100 Voice Synthesis Memory
//! - **Lattice synthesis**: chirp-excited voiced and LFSR-excited
//!   unvoiced reconstruction through a ten-stage lattice filter
//! - **Five output styles**: ASCII hex, C header, Arduino PROGMEM, JSON,
//!   and raw binary
//!
//! ## Quick Start
//!
//! ```rust
//! use tmsvox_codec_core::{Tms5220Codec, VoiceCodec};
//!
//! // One second of a 160 Hz tone at the nominal 8 kHz rate
//! let samples: Vec<f32> = (0..8000)
//!     .map(|n| (2.0 * std::f32::consts::PI * n as f32 / 50.0).sin() * 0.5)
//!     .collect();
//!
//! let mut codec = Tms5220Codec::new();
//!
//! // Encode to a packed bitstream, then resynthesize audio from it
//! let bitstream = codec.encode(&samples)?;
//! let pcm = codec.decode(&bitstream)?;
//!
//! assert_eq!(pcm.len(), samples.len());
//! # Ok::<(), tmsvox_codec_core::CodecError>(())
//! ```
//!
//! ## Bitstream Formats
//!
//! | Style | Shape |
//! |-------|-------|
//! | ASCII | `aa,bb,cc,...` lowercase hex |
//! | C | `const int NAME[] = {0xaa,0xbb,...};` |
//! | Arduino | `extern const uint8_t NAME[] PROGMEM = {0xaa,...};` |
//! | JSON | array of per-frame objects, raw and quantized fields |
//! | Binary | raw byte sequence |
//!
//! Within each emitted byte, bit 0 carries the first bit of the packing
//! sequence: consumers (TMS6100, emulators) read LSB first.
//!
//! ## Concurrency
//!
//! The core is single-threaded and synchronous. The coding tables are
//! read-only constants; every buffer, frame table, and synthesizer is an
//! owned value mutated only through its owner.

#![warn(missing_docs)]

pub mod analysis;
pub mod audio;
pub mod codecs;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types and traits
pub use audio::AudioBuffer;
pub use codecs::tms5220::{
    EncodedBitstream, Frame, FrameEncoder, FramePostprocessor, Synthesizer, SynthesizerState,
    Tms5220Codec,
};
pub use error::{CodecError, Result};
pub use types::{
    BitstreamParameters, CodecInfo, EncoderStyle, LowerVocalTractParameters,
    PostProcessorParameters, SharedParameters, UpperVocalTractParameters, VoiceCodec,
};

/// Version information for the codec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
