//! TMS5220 codec pipeline
//!
//! [`Tms5220Codec`] ties the analysis, post-processing, packing, and
//! synthesis stages together. Encoding runs two filter paths over copies
//! of the same buffer: the lower (pitch) path feeds the pitch estimator
//! and the upper (LPC) path feeds the linear predictor. Per segment, the
//! pitch period, voicing decision, prediction gain, and reflector
//! coefficients form one frame; frames are post-processed and packed into
//! a TMS6100-ordered bitstream.

use bytes::Bytes;
use tracing::debug;

use crate::analysis::autocorrelation::autocorrelate;
use crate::analysis::lpc::LinearPredictor;
use crate::analysis::pitch::PitchEstimator;
use crate::audio::{filter, AudioBuffer};
use crate::codecs::tms5220::encoder::FrameEncoder;
use crate::codecs::tms5220::frame::Frame;
use crate::codecs::tms5220::postprocessor::FramePostprocessor;
use crate::codecs::tms5220::synthesizer::Synthesizer;
use crate::error::{CodecError, Result};
use crate::types::{
    BitstreamParameters, CodecInfo, EncoderStyle, LowerVocalTractParameters,
    PostProcessorParameters, SharedParameters, UpperVocalTractParameters, VoiceCodec,
};

/// A serialized bitstream, textual or raw depending on the encoder style
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedBitstream {
    /// ASCII, C, Arduino, or JSON output
    Text(String),
    /// Raw packed bytes
    Binary(Bytes),
}

impl EncodedBitstream {
    /// Borrow the textual form, if this is a text style
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Consume the bitstream, yielding its bytes regardless of style
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Text(text) => Bytes::from(text.into_bytes()),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// Complete analysis-encoding-synthesis pipeline for the TMS5220
#[derive(Debug, Clone, Default)]
pub struct Tms5220Codec {
    shared: SharedParameters,
    upper: UpperVocalTractParameters,
    lower: LowerVocalTractParameters,
    post: PostProcessorParameters,
    bitstream: BitstreamParameters,
}

impl Tms5220Codec {
    /// Create a codec with default parameters (8 kHz, 25 ms frames)
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shared analysis parameters
    pub fn with_shared(mut self, shared: SharedParameters) -> Self {
        self.shared = shared;
        self
    }

    /// Replace the upper vocal tract (LPC) parameters
    pub fn with_upper_tract(mut self, upper: UpperVocalTractParameters) -> Self {
        self.upper = upper;
        self
    }

    /// Replace the lower vocal tract (pitch) parameters
    pub fn with_lower_tract(mut self, lower: LowerVocalTractParameters) -> Self {
        self.lower = lower;
        self
    }

    /// Replace the post-processing parameters
    pub fn with_post_processor(mut self, post: PostProcessorParameters) -> Self {
        self.post = post;
        self
    }

    /// Replace the bitstream serialization parameters
    pub fn with_bitstream(mut self, bitstream: BitstreamParameters) -> Self {
        self.bitstream = bitstream;
        self
    }

    /// Access the shared analysis parameters
    pub fn shared(&self) -> &SharedParameters {
        &self.shared
    }

    /// Number of samples covered by one frame
    pub fn samples_per_frame(&self) -> usize {
        (self.shared.sample_rate_hz as f32 * self.shared.window_width_ms * 1e-3) as usize
    }

    /// Analyze mono PCM samples into a frame table
    ///
    /// The pitch path is typically only lowpass-filtered, as pitch is a
    /// low-frequency component; highpass filtering and pre-emphasis, which
    /// exaggerate high frequencies, aid LPC analysis instead. Both paths
    /// share segmentation bounds. A degenerate segment never aborts the
    /// analysis; it yields a neutral silent frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidAudio`] if no samples are supplied
    pub fn analyze(&self, samples: &[f32]) -> Result<Vec<Frame>> {
        if samples.is_empty() {
            return Err(CodecError::invalid_audio("no samples to analyze"));
        }

        let mut lpc_buffer = AudioBuffer::from_samples(
            samples.to_vec(),
            self.shared.sample_rate_hz,
            self.shared.window_width_ms,
        );
        let mut pitch_buffer = lpc_buffer.clone();

        self.prepare_upper_tract(&mut lpc_buffer);
        self.prepare_lower_tract(&mut pitch_buffer);

        let n_segments = lpc_buffer.n_segments();
        let pitch_estimator = PitchEstimator::new(
            self.shared.sample_rate_hz,
            self.lower.min_pitch_hz,
            self.lower.max_pitch_hz,
        );
        let mut predictor = LinearPredictor::with_order(self.upper.model_order);

        let mut frames = Vec::with_capacity(n_segments);

        for i in 0..n_segments {
            // Window the LPC segment to smooth its boundaries
            let mut lpc_segment = lpc_buffer.segment(i)?.to_vec();
            filter::hamming_window(&mut lpc_segment);

            let lpc_acf = autocorrelate(&lpc_segment);
            let pitch_acf = autocorrelate(pitch_buffer.segment(i)?);

            let coeffs = predictor.reflector_coefficients(&lpc_acf);
            let gain_db = predictor.gain_db();
            let pitch_period = pitch_estimator.estimate_period(&pitch_acf);

            // The sign of the first reflector coefficient separates
            // vowel-like from consonant-like segments
            let is_voiced = coeffs[0] < 0.0;

            frames.push(Frame::new(pitch_period, is_voiced, gain_db, &coeffs));
        }

        self.post_process(&mut frames);

        debug!(n_segments, frames = frames.len(), "analyzed audio");
        Ok(frames)
    }

    /// Serialize a frame table per the configured encoder style
    ///
    /// `name` labels the byte array in the C and Arduino styles.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails
    pub fn serialize_frames(&self, frames: &[Frame], name: &str) -> Result<EncodedBitstream> {
        let style = self.bitstream.encoder_style;
        let include_stop = self.bitstream.include_stop_frame;

        let hex_prefix = matches!(style, EncoderStyle::C | EncoderStyle::Arduino);
        let encoder = FrameEncoder::from_frames(frames).with_hex_prefix(hex_prefix);

        let bitstream = match style {
            EncoderStyle::Ascii => EncodedBitstream::Text(encoder.to_hex(include_stop)),
            EncoderStyle::C => {
                let hex = encoder.to_hex(include_stop);
                EncodedBitstream::Text(format!("const int {name}[] = {{{hex}}};\n"))
            }
            EncoderStyle::Arduino => {
                let hex = encoder.to_hex(include_stop);
                EncodedBitstream::Text(format!(
                    "extern const uint8_t {name}[] PROGMEM = {{{hex}}};\n"
                ))
            }
            EncoderStyle::Json => EncodedBitstream::Text(encoder.to_json()?),
            EncoderStyle::Binary => EncodedBitstream::Binary(encoder.to_bytes(include_stop)),
        };

        Ok(bitstream)
    }

    /// Analyze samples and serialize the result in one step
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be analyzed or serialized
    pub fn encode_to_bitstream(&self, samples: &[f32], name: &str) -> Result<EncodedBitstream> {
        let frames = self.analyze(samples)?;
        self.serialize_frames(&frames, name)
    }

    /// Parse a comma-delimited ASCII hex bitstream into a frame table
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitstreamMalformed`] on non-hex input or a
    /// stream that ends mid-frame
    pub fn parse_ascii(&self, text: &str) -> Result<Vec<Frame>> {
        let mut encoder = FrameEncoder::new();
        encoder.import_ascii(text)?;
        Ok(encoder.frames().to_vec())
    }

    /// Parse raw packed bytes into a frame table
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BitstreamMalformed`] if the stream ends
    /// mid-frame
    pub fn parse_bytes(&self, data: &[u8]) -> Result<Vec<Frame>> {
        let mut encoder = FrameEncoder::new();
        encoder.import_bytes(data)?;
        Ok(encoder.frames().to_vec())
    }

    /// Render a frame table to PCM samples
    pub fn synthesize(&self, frames: &[Frame]) -> Vec<f32> {
        let mut synthesizer =
            Synthesizer::new(self.shared.sample_rate_hz, self.shared.window_width_ms);
        synthesizer.synthesize(frames)
    }

    fn prepare_upper_tract(&self, buffer: &mut AudioBuffer) {
        if self.upper.pre_emphasis_alpha >= 0.0 {
            filter::pre_emphasis(buffer, self.upper.pre_emphasis_alpha);
        }

        if self.upper.highpass_cutoff_hz > 0 {
            filter::highpass(buffer, self.upper.highpass_cutoff_hz as u32);
        }

        if self.upper.lowpass_cutoff_hz > 0 {
            filter::lowpass(buffer, self.upper.lowpass_cutoff_hz as u32);
        }
    }

    fn prepare_lower_tract(&self, buffer: &mut AudioBuffer) {
        if self.lower.pre_emphasis_alpha >= 0.0 {
            filter::pre_emphasis(buffer, self.lower.pre_emphasis_alpha);
        }

        if self.lower.highpass_cutoff_hz > 0 {
            filter::highpass(buffer, self.lower.highpass_cutoff_hz as u32);
        }

        if self.lower.lowpass_cutoff_hz > 0 {
            filter::lowpass(buffer, self.lower.lowpass_cutoff_hz as u32);
        }
    }

    fn post_process(&self, frames: &mut Vec<Frame>) {
        let mut post = FramePostprocessor::new(
            frames,
            self.post.max_voiced_gain_db,
            self.post.max_unvoiced_gain_db,
        );

        if self.post.normalize_gain {
            post.normalize_gain();
        }

        post.shift_gain(self.post.gain_shift);

        if self.post.detect_repeat_frames {
            post.detect_repeat_frames();
        }
    }
}

impl VoiceCodec for Tms5220Codec {
    fn encode(&mut self, samples: &[f32]) -> Result<Bytes> {
        let frames = self.analyze(samples)?;
        let encoder = FrameEncoder::from_frames(&frames);
        Ok(encoder.to_bytes(self.bitstream.include_stop_frame))
    }

    fn decode(&mut self, data: &[u8]) -> Result<Vec<f32>> {
        let frames = self.parse_bytes(data)?;
        Ok(self.synthesize(&frames))
    }

    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "TMS5220",
            sample_rate_hz: self.shared.sample_rate_hz,
            channels: 1,
            samples_per_frame: self.samples_per_frame(),
        }
    }

    fn reset(&mut self) {
        // The pipeline holds no state between calls
    }
}
