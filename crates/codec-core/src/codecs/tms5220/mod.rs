//! TMS5220 LPC-10 codec
//!
//! Converts recorded speech into a bitstream compatible with the TMS5220
//! Voice Synthesis Processor, and resynthesizes speech-like audio from
//! such bitstreams.
//!
//! The encode path segments mono PCM, estimates a pitch period from the
//! lowpass-filtered signal's autocorrelation, extracts ten reflector
//! coefficients and a prediction gain from the pre-emphasized and windowed
//! signal, and quantizes everything onto the chip's coding tables. The
//! decode path unpacks frames and drives a ten-stage lattice filter with
//! either a chirp pulse train (voiced) or LFSR noise (unvoiced).

pub mod codec;
pub mod encoder;
pub mod frame;
pub mod postprocessor;
pub mod synthesizer;
pub mod tables;

pub use codec::{EncodedBitstream, Tms5220Codec};
pub use encoder::FrameEncoder;
pub use frame::{closest_index, Frame, FrameRecord};
pub use postprocessor::FramePostprocessor;
pub use synthesizer::{Synthesizer, SynthesizerState};
