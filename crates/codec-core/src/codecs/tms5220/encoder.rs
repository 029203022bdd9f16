//! Frame packing and bitstream parsing
//!
//! The [`FrameEncoder`] turns a frame table into an LPC-10 bitstream and
//! back. Frames have variable widths (4, 11, 29, or 50 bits) and are packed
//! back to back with no regard for byte boundaries. On emission each byte's
//! bit order is reversed, mimicking the TMS6100 Voice Synthesis Memory,
//! which clocks data out LSB first.

use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codecs::tms5220::frame::Frame;
use crate::codecs::tms5220::tables;
use crate::error::{CodecError, Result};

/// Bit string under construction, packed MSB-first into bytes
#[derive(Debug, Clone, Default)]
struct BitPacker {
    bytes: Vec<u8>,
    current: u8,
    n_pending: u8,
}

impl BitPacker {
    fn push_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | u8::from(bit);
        self.n_pending += 1;

        if self.n_pending == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.n_pending = 0;
        }
    }

    /// Append the `width` low bits of `value`, most significant first
    fn push_bits(&mut self, value: u32, width: usize) {
        for i in (0..width).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + usize::from(self.n_pending)
    }

    /// Close off the bit string: pad the final partial byte with zeros,
    /// then reverse the bit order of every byte for LSB-first consumers
    fn finish(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.bytes.len() + 1);

        for &byte in &self.bytes {
            out.put_u8(byte.reverse_bits());
        }

        if self.n_pending > 0 {
            let padded = self.current << (8 - self.n_pending);
            out.put_u8(padded.reverse_bits());
        }

        out.freeze()
    }
}

/// Cursor over a bit string in packing order (MSB first within each byte)
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    fn read_bits(&mut self, width: usize) -> Option<u32> {
        if self.remaining() < width {
            return None;
        }

        let mut value = 0u32;
        for _ in 0..width {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }

        Some(value)
    }
}

/// Generates and parses LPC-10 bitstreams from a frame table
///
/// The binary representation of a frame is seldom cleanly divisible into
/// bytes, so the first bits of a frame may fill the empty tail of the
/// previous byte and the last bits may partially occupy a new one.
#[derive(Debug, Clone, Default)]
pub struct FrameEncoder {
    frames: Vec<Frame>,
    bits: BitPacker,
    include_hex_prefix: bool,
}

impl FrameEncoder {
    /// Create a new encoder with an empty frame buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder populated with frames
    pub fn from_frames(frames: &[Frame]) -> Self {
        let mut encoder = Self::new();
        encoder.append_frames(frames);
        encoder
    }

    /// Prefix emitted hex bytes with `0x`
    pub fn with_hex_prefix(mut self, include_hex_prefix: bool) -> Self {
        self.include_hex_prefix = include_hex_prefix;
        self
    }

    /// Append a frame to the end of the bitstream
    pub fn append(&mut self, frame: Frame) {
        Self::push_frame_bits(&mut self.bits, &frame);
        self.frames.push(frame);
    }

    /// Append frames to the end of the bitstream
    pub fn append_frames(&mut self, frames: &[Frame]) {
        for frame in frames {
            self.append(frame.clone());
        }
    }

    /// Access the frame table
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of bits appended so far, before padding and byte reversal
    pub fn bit_len(&self) -> usize {
        self.bits.bit_len()
    }

    /// Serialize the frame table to packed bytes
    pub fn to_bytes(&self, append_stop_frame: bool) -> Bytes {
        let bytes = self.packed(append_stop_frame);
        debug!(
            frames = self.frames.len(),
            bytes = bytes.len(),
            "packed bitstream"
        );

        bytes
    }

    /// Serialize the frame table to a stream of comma-separated hex bytes
    pub fn to_hex(&self, append_stop_frame: bool) -> String {
        let bytes = self.to_bytes(append_stop_frame);
        let hex: Vec<String> = bytes
            .iter()
            .map(|byte| {
                if self.include_hex_prefix {
                    format!("0x{byte:02x}")
                } else {
                    format!("{byte:02x}")
                }
            })
            .collect();

        hex.join(",")
    }

    /// Serialize the frame table to a JSON array of per-frame objects
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        let records: Vec<_> = self.frames.iter().map(Frame::record).collect();
        serde_json::to_string_pretty(&records)
            .map_err(|err| CodecError::io(format!("JSON serialization failed: {err}")))
    }

    /// Replace the frame table by parsing comma-delimited ASCII hex bytes
    ///
    /// Bytes may carry an optional `0x` prefix. Parsing is greedy and halts
    /// at a stop frame; anything after it is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitstreamMalformed`] on non-hex input, or if
    /// the bit sequence ends in the middle of a frame. In the latter case
    /// the frames parsed before the violation remain available.
    pub fn import_ascii(&mut self, text: &str) -> Result<usize> {
        let mut data = Vec::new();

        for token in text.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);

            let byte = u8::from_str_radix(digits, 16).map_err(|_| {
                CodecError::bitstream_malformed(format!("non-hex byte '{token}'"))
            })?;

            data.push(byte);
        }

        self.import_bytes(&data)
    }

    /// Replace the frame table by parsing an ASCII bitstream file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the stream is
    /// malformed
    pub fn import_ascii_file(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        self.import_ascii(&text)
    }

    /// Replace the frame table by parsing raw packed bytes
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitstreamMalformed`] if the bit sequence ends
    /// in the middle of a frame
    pub fn import_bytes(&mut self, data: &[u8]) -> Result<usize> {
        self.frames.clear();
        self.bits = BitPacker::default();

        // Undo the TMS6100 byte reversal to recover packing order
        let normalized: Vec<u8> = data.iter().map(|byte| byte.reverse_bits()).collect();
        let mut reader = BitReader::new(&normalized);

        loop {
            // Fewer than four bits left is the zero padding of the last byte
            let Some(gain_index) = reader.read_bits(tables::GAIN_BIT_WIDTH) else {
                break;
            };

            if gain_index as usize == tables::STOP_FRAME_GAIN_INDEX {
                trace!(bit = reader.pos, "stop frame");
                break;
            }

            if gain_index == 0 {
                self.append(Frame::silent());
                continue;
            }

            let header = reader
                .read_bits(tables::REPEAT_BIT_WIDTH + tables::PITCH_BIT_WIDTH)
                .ok_or_else(|| Self::truncated(&reader))?;

            let is_repeat = header >> tables::PITCH_BIT_WIDTH == 1;
            let pitch_index = (header & ((1 << tables::PITCH_BIT_WIDTH) - 1)) as usize;

            let gain_db = tables::RMS[gain_index as usize];
            let pitch_period = tables::PITCH[pitch_index] as usize;
            let is_voiced = pitch_period != 0;

            if is_repeat {
                let mut frame = Frame::new(pitch_period, is_voiced, gain_db, &[]);
                frame.set_repeat(true);
                self.append(frame);
                continue;
            }

            let mut coeffs = [0.0f32; tables::N_COEFFS];
            let n_coeffs = if is_voiced { tables::N_COEFFS } else { 4 };

            for (i, coeff) in coeffs.iter_mut().enumerate().take(n_coeffs) {
                let width = tables::COEFF_BIT_WIDTHS[i];
                let index = reader
                    .read_bits(width)
                    .ok_or_else(|| Self::truncated(&reader))?;

                let table = tables::coeff_table(i)?;
                *coeff = table[index as usize];
            }

            self.append(Frame::new(pitch_period, is_voiced, gain_db, &coeffs));
        }

        debug!(frames = self.frames.len(), "parsed bitstream");
        Ok(self.frames.len())
    }

    /// Emit one frame's bits per the LPC-10 grammar
    fn push_frame_bits(bits: &mut BitPacker, frame: &Frame) {
        // At minimum, a frame contains an energy parameter
        let gain_index = frame.quantized_gain();
        bits.push_bits(gain_index as u32, tables::GAIN_BIT_WIDTH);

        // A silent frame contains no further parameters
        if frame.is_silent() {
            return;
        }

        bits.push_bit(frame.is_repeat());

        // A voiced frame has a non-zero pitch; unvoiced frames carry zero
        let pitch_index = if frame.is_voiced() {
            frame.quantized_pitch()
        } else {
            0
        };
        bits.push_bits(pitch_index as u32, tables::PITCH_BIT_WIDTH);

        if frame.is_repeat() {
            return;
        }

        // Voiced and unvoiced frames both carry reflector coefficients, but
        // differ in quantity
        let coeffs = frame.quantized_coeffs();
        let n_coeffs = if frame.is_voiced() {
            tables::N_COEFFS
        } else {
            4
        };

        for i in 0..n_coeffs {
            bits.push_bits(coeffs[i] as u32, tables::COEFF_BIT_WIDTHS[i]);
        }
    }

    /// Pack the accumulated bits, optionally appending a stop frame
    fn packed(&self, append_stop_frame: bool) -> Bytes {
        if append_stop_frame {
            let mut bits = self.bits.clone();
            bits.push_bits(tables::STOP_FRAME_GAIN_INDEX as u32, tables::GAIN_BIT_WIDTH);
            bits.finish()
        } else {
            self.bits.finish()
        }
    }

    fn truncated(reader: &BitReader<'_>) -> CodecError {
        CodecError::bitstream_malformed(format!(
            "bit sequence ends mid-frame at bit {}",
            reader.pos
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voiced_frame() -> Frame {
        Frame::new(
            38,
            true,
            56.850773,
            &[
                -0.753234, 0.939525, -0.342255, -0.172317, 0.108887, 0.679660, 0.056874, 0.433271,
                -0.220355, 0.17028,
            ],
        )
    }

    fn unvoiced_frame() -> Frame {
        let mut frame = voiced_frame();
        frame.set_voicing(false);
        frame
    }

    #[test]
    fn test_stop_frame_only() {
        let encoder = FrameEncoder::new();
        assert_eq!(encoder.to_hex(true), "0f");
    }

    #[test]
    fn test_silent_frame() {
        // Silent frame then stop frame:
        //   0000 + 1111 = 00001111, reversed per byte -> 11110000 -> f0
        let mut encoder = FrameEncoder::new();
        encoder.append(Frame::silent());

        assert_eq!(encoder.to_hex(true), "f0");
    }

    #[test]
    fn test_voiced_frame() {
        let mut encoder = FrameEncoder::new();
        encoder.append(voiced_frame());

        assert_eq!(encoder.to_hex(true), "c8,88,4f,25,ce,ab,3c");
    }

    #[test]
    fn test_unvoiced_frame() {
        let mut encoder = FrameEncoder::new();
        encoder.append(unvoiced_frame());

        assert_eq!(encoder.to_hex(true), "08,88,4f,e5,01");
    }

    #[test]
    fn test_mixture_of_frames() {
        let coeffs = [
            -0.653234, 0.139525, 0.342255, -0.172317, 0.108887, 0.679660, 0.056874, 0.433271,
            -0.220355, 0.17028,
        ];

        let frames = vec![
            Frame::silent(),
            Frame::new(38, true, 142.06, &coeffs),
            Frame::new(38, true, 142.06, &coeffs),
            unvoiced_frame(),
        ];

        let encoder = FrameEncoder::from_frames(&frames);
        assert_eq!(
            encoder.to_hex(true),
            "c0,8c,a4,5b,e2,bc,0a,33,92,6e,89,f3,2a,08,88,4f,e5,01"
        );
    }

    #[test]
    fn test_frame_bit_widths() {
        let mut encoder = FrameEncoder::new();

        encoder.append(Frame::silent());
        assert_eq!(encoder.bit_len(), 4);

        let mut repeat = voiced_frame();
        repeat.set_repeat(true);
        encoder.append(repeat);
        assert_eq!(encoder.bit_len(), 4 + 11);

        encoder.append(unvoiced_frame());
        assert_eq!(encoder.bit_len(), 4 + 11 + 29);

        encoder.append(voiced_frame());
        assert_eq!(encoder.bit_len(), 4 + 11 + 29 + 50);
    }

    #[test]
    fn test_hex_prefix() {
        let encoder = FrameEncoder::new().with_hex_prefix(true);
        assert_eq!(encoder.to_hex(true), "0x0f");
    }

    #[test]
    fn test_ascii_round_trip() {
        for stream in [
            "0f",
            "f0",
            "c8,88,4f,25,ce,ab,3c",
            "08,88,4f,e5,01",
            "c0,8c,a4,5b,e2,bc,0a,33,92,6e,89,f3,2a,08,88,4f,e5,01",
        ] {
            let mut encoder = FrameEncoder::new();
            encoder.import_ascii(stream).unwrap();
            assert_eq!(encoder.to_hex(true), stream);
        }
    }

    #[test]
    fn test_ascii_round_trip_with_prefix() {
        let mut encoder = FrameEncoder::new();
        encoder
            .import_ascii("0xc8,0x88,0x4f,0x25,0xce,0xab,0x3c")
            .unwrap();

        assert_eq!(encoder.to_hex(true), "c8,88,4f,25,ce,ab,3c");
    }

    #[test]
    fn test_parse_recovers_quantized_fields() {
        let frame = voiced_frame();
        let stream = {
            let mut encoder = FrameEncoder::new();
            encoder.append(frame.clone());
            encoder.to_bytes(true)
        };

        let mut decoder = FrameEncoder::new();
        let n = decoder.import_bytes(&stream).unwrap();
        assert_eq!(n, 1);

        let parsed = &decoder.frames()[0];
        assert_eq!(parsed.quantized_gain(), frame.quantized_gain());
        assert_eq!(parsed.quantized_pitch(), frame.quantized_pitch());
        assert_eq!(parsed.quantized_coeffs(), frame.quantized_coeffs());
        assert_eq!(parsed.is_repeat(), frame.is_repeat());

        // Floating-point fields round-trip to their table values
        assert_eq!(parsed.gain_db(), tables::RMS[frame.quantized_gain()]);
    }

    #[test]
    fn test_stop_frame_terminates_decoding() {
        // Stop frame first: everything after the stop is ignored
        let mut encoder = FrameEncoder::new();
        let n = encoder.import_ascii("0f,de,ad,be,ef").unwrap();

        assert_eq!(n, 0);
    }

    #[test]
    fn test_non_hex_input_rejected() {
        let mut encoder = FrameEncoder::new();
        let err = encoder.import_ascii("0f,zz").unwrap_err();

        assert!(matches!(err, CodecError::BitstreamMalformed { .. }));
    }

    #[test]
    fn test_truncated_stream_keeps_prefix() {
        // One full silent frame, then a non-silent gain nibble with nothing
        // after it: 0000 0001 -> reversed 10000000 = 0x80
        let mut encoder = FrameEncoder::new();
        let err = encoder.import_bytes(&[0x80]).unwrap_err();

        assert!(matches!(err, CodecError::BitstreamMalformed { .. }));
        assert_eq!(encoder.frames().len(), 1);
        assert!(encoder.frames()[0].is_silent());
    }

    #[test]
    fn test_json_export_contains_quantized_fields() {
        let mut encoder = FrameEncoder::new();
        encoder.append(voiced_frame());

        let json = encoder.to_json().unwrap();
        assert!(json.contains("\"quantized_gain\": 1"));
        assert!(json.contains("\"quantized_pitch\": 24"));
    }

    #[test]
    fn test_bytes_after_stop_ignored() {
        let mut encoder = FrameEncoder::new();
        encoder.append(voiced_frame());

        let mut data = encoder.to_bytes(true).to_vec();
        data.extend_from_slice(&[0xff, 0x00, 0x12]);

        let mut decoder = FrameEncoder::new();
        let n = decoder.import_bytes(&data).unwrap();
        assert_eq!(n, 1);
    }

    mod round_trip {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Quantized fields survive pack + unpack per the frame grammar
            #[test]
            fn prop_frame_round_trip(
                gain_index in 1usize..15,
                pitch_index in 1usize..64,
                is_voiced: bool,
                is_repeat: bool,
                i1 in 0usize..32,
                i2 in 0usize..32,
                i3 in 0usize..16,
                i4 in 0usize..16,
                i5 in 0usize..16,
                i6 in 0usize..16,
                i7 in 0usize..16,
                i8 in 0usize..8,
                i9 in 0usize..8,
                i10 in 0usize..8,
            ) {
                let coeffs = [
                    tables::K1[i1],
                    tables::K2[i2],
                    tables::K3[i3],
                    tables::K4[i4],
                    tables::K5[i5],
                    tables::K6[i6],
                    tables::K7[i7],
                    tables::K8[i8],
                    tables::K9[i9],
                    tables::K10[i10],
                ];

                let mut frame = Frame::new(
                    tables::PITCH[pitch_index] as usize,
                    is_voiced,
                    tables::RMS[gain_index],
                    &coeffs,
                );
                frame.set_repeat(is_repeat);

                let stream = {
                    let mut encoder = FrameEncoder::new();
                    encoder.append(frame.clone());
                    encoder.to_bytes(true)
                };

                let mut decoder = FrameEncoder::new();
                decoder.import_bytes(&stream).unwrap();
                prop_assert_eq!(decoder.frames().len(), 1);

                let parsed = &decoder.frames()[0];
                prop_assert_eq!(parsed.quantized_gain(), frame.quantized_gain());
                prop_assert_eq!(parsed.is_repeat(), frame.is_repeat());

                // An unvoiced frame carries a zero pitch field
                if is_voiced {
                    prop_assert_eq!(parsed.quantized_pitch(), frame.quantized_pitch());
                } else {
                    prop_assert_eq!(parsed.quantized_pitch(), 0);
                }

                // Repeat frames carry no coefficients of their own
                if !is_repeat {
                    let n_coeffs = if is_voiced { 10 } else { 4 };
                    prop_assert_eq!(
                        &parsed.quantized_coeffs()[..n_coeffs],
                        &frame.quantized_coeffs()[..n_coeffs]
                    );
                }
            }
        }
    }
}
