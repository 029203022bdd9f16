//! Voice codec implementations
//!
//! ## Available Codecs
//!
//! ### TMS5220 LPC-10 - [`tms5220`]
//! - **Target**: TI TMS5220 Voice Synthesis Processor and emulators
//! - **Sample Rate**: 8 kHz (nominal)
//! - **Model**: 10-pole lattice LPC with chirp/LFSR excitation
//! - **Bitstream**: variable-width frames, LSB-first bytes (TMS6100 order)
//! - **Use Case**: classic speech-synthesis silicon and Arduino Talkie

pub mod tms5220;
