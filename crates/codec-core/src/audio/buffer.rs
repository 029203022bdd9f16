//! Segmented mono audio buffer
//!
//! An [`AudioBuffer`] stores mono floating-point PCM and exposes it as a
//! sequence of fixed-width analysis segments. Decoding source files,
//! resampling, and channel mixdown are the importer's job; the buffer
//! assumes it is handed mono samples at a declared rate.

use std::path::Path;

use tracing::debug;

use crate::error::{CodecError, Result};

/// Mono PCM samples with segment-based access for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate_hz: u32,
    n_segments: usize,
    n_samples_per_segment: usize,
}

impl AudioBuffer {
    /// Create a buffer from existing samples
    ///
    /// The samples are zero-padded so that the buffer covers a whole
    /// number of segments.
    ///
    /// # Arguments
    ///
    /// * `samples` - Floating-point PCM samples in [-1, 1]
    /// * `sample_rate_hz` - Sampling rate used to generate the samples
    /// * `window_width_ms` - Segmentation window width, in milliseconds
    pub fn from_samples(samples: Vec<f32>, sample_rate_hz: u32, window_width_ms: f32) -> Self {
        let mut buffer = Self {
            samples,
            sample_rate_hz,
            n_segments: 0,
            n_samples_per_segment: 0,
        };

        buffer.set_window_width_ms(window_width_ms);
        buffer
    }

    /// Create an empty buffer
    ///
    /// An empty buffer has no segments; samples may be supplied later via
    /// [`AudioBuffer::set_samples`].
    pub fn new(sample_rate_hz: u32, window_width_ms: f32) -> Self {
        Self::from_samples(Vec::new(), sample_rate_hz, window_width_ms)
    }

    /// Access the flat (unsegmented) samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Replace the buffer's samples
    ///
    /// Segment bounds are recomputed for the new samples. An empty
    /// replacement clears the buffer.
    pub fn set_samples(&mut self, samples: Vec<f32>) {
        if samples.is_empty() {
            self.samples.clear();
            self.n_segments = 0;
            return;
        }

        self.samples = samples;
        self.set_window_width_ms(self.window_width_ms());
    }

    /// Return the sampling rate, in Hertz
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Return the segmentation window width, in milliseconds
    pub fn window_width_ms(&self) -> f32 {
        self.n_samples_per_segment as f32 / (self.sample_rate_hz as f32 * 1e-3)
    }

    /// Recompute segment bounds for a new window width
    ///
    /// The samples are zero-padded so that the final segment is complete.
    /// A window width of zero degenerates to one-sample segments.
    pub fn set_window_width_ms(&mut self, window_width_ms: f32) {
        if window_width_ms == 0.0 {
            self.n_samples_per_segment = 1;
            self.n_segments = self.samples.len();
            return;
        }

        self.n_samples_per_segment =
            ((self.sample_rate_hz as f32 * window_width_ms * 1e-3) as usize).max(1);
        self.n_segments = self.samples.len() / self.n_samples_per_segment;

        // Pad the trailing partial segment with zeros
        let covered = self.n_samples_per_segment * self.n_segments;

        if self.samples.len() > covered {
            self.samples
                .resize(covered + self.n_samples_per_segment, 0.0);
        }
    }

    /// Return the number of samples in each segment
    pub fn n_samples_per_segment(&self) -> usize {
        self.n_samples_per_segment
    }

    /// Return the number of analysis segments
    pub fn n_segments(&self) -> usize {
        self.n_segments
    }

    /// Report whether the buffer contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Access the ith segment
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Empty`] for an empty buffer and
    /// [`CodecError::IndexOutOfRange`] if `i >= n_segments`
    pub fn segment(&self, i: usize) -> Result<&[f32]> {
        if self.is_empty() {
            return Err(CodecError::Empty);
        }

        if i >= self.n_segments {
            return Err(CodecError::index_out_of_range(i, self.n_segments));
        }

        let start = i * self.n_samples_per_segment;
        Ok(&self.samples[start..start + self.n_samples_per_segment])
    }

    /// Access all segments
    pub fn all_segments(&self) -> Vec<&[f32]> {
        (0..self.n_segments)
            .map(|i| {
                let start = i * self.n_samples_per_segment;
                &self.samples[start..start + self.n_samples_per_segment]
            })
            .collect()
    }

    /// Mutable access to the ith segment, for in-place windowing
    pub(crate) fn segment_mut(&mut self, i: usize) -> Result<&mut [f32]> {
        if self.is_empty() {
            return Err(CodecError::Empty);
        }

        if i >= self.n_segments {
            return Err(CodecError::index_out_of_range(i, self.n_segments));
        }

        let start = i * self.n_samples_per_segment;
        Ok(&mut self.samples[start..start + self.n_samples_per_segment])
    }

    /// Mutable access to the flat samples, for in-place filtering
    pub(crate) fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Export the buffer as a WAV file (PCM-16 mono) for playback
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Empty`] for an empty buffer, or an I/O error
    /// if the file cannot be written
    pub fn render(&self, path: &Path) -> Result<()> {
        if self.is_empty() {
            return Err(CodecError::Empty);
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate_hz,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer.write_sample(quantized)?;
        }
        writer.finalize()?;

        debug!(path = %path.display(), samples = self.samples.len(), "rendered WAV");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_buffer_has_no_segments() {
        let buffer = AudioBuffer::new(8000, 25.0);

        assert!(buffer.is_empty());
        assert_eq!(buffer.n_segments(), 0);
        assert!(matches!(buffer.segment(0), Err(CodecError::Empty)));
    }

    #[test]
    fn test_exact_multiple_needs_no_padding() {
        let buffer = AudioBuffer::from_samples(vec![0.5; 400], 8000, 25.0);

        assert_eq!(buffer.n_samples_per_segment(), 200);
        assert_eq!(buffer.n_segments(), 2);
        assert_eq!(buffer.samples().len(), 400);
    }

    #[test]
    fn test_partial_segment_zero_padded() {
        let buffer = AudioBuffer::from_samples(vec![0.5; 450], 8000, 25.0);

        assert_eq!(buffer.n_segments(), 2);
        assert_eq!(buffer.samples().len(), 600);
        assert!(buffer.samples()[450..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_segment_out_of_range() {
        let buffer = AudioBuffer::from_samples(vec![0.5; 400], 8000, 25.0);

        assert!(matches!(
            buffer.segment(2),
            Err(CodecError::IndexOutOfRange { index: 2, length: 2 })
        ));
    }

    #[test]
    fn test_segment_covers_expected_span() {
        let samples: Vec<f32> = (0..400).map(|i| i as f32).collect();
        let buffer = AudioBuffer::from_samples(samples, 8000, 25.0);

        let second = buffer.segment(1).unwrap();
        assert_eq!(second[0], 200.0);
        assert_eq!(second[199], 399.0);

        assert_eq!(buffer.all_segments().len(), 2);
    }

    #[test]
    fn test_zero_window_width_degenerates() {
        let buffer = AudioBuffer::from_samples(vec![0.1; 10], 8000, 0.0);

        assert_eq!(buffer.n_samples_per_segment(), 1);
        assert_eq!(buffer.n_segments(), 10);
    }

    #[test]
    fn test_set_samples_resegments() {
        let mut buffer = AudioBuffer::from_samples(vec![0.5; 400], 8000, 25.0);

        buffer.set_samples(vec![0.25; 200]);
        assert_eq!(buffer.n_segments(), 1);

        buffer.set_samples(Vec::new());
        assert!(buffer.is_empty());
        assert_eq!(buffer.n_segments(), 0);
    }

    #[test]
    fn test_window_width_round_trips() {
        let buffer = AudioBuffer::from_samples(vec![0.5; 400], 8000, 25.0);
        assert!((buffer.window_width_ms() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_render_rejects_empty_buffer() {
        let buffer = AudioBuffer::new(8000, 25.0);
        let dir = temp_dir::TempDir::new().unwrap();

        let result = buffer.render(&dir.path().join("empty.wav"));
        assert!(matches!(result, Err(CodecError::Empty)));
    }

    #[test]
    fn test_render_writes_wav16_mono() {
        let samples: Vec<f32> = (0..400)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        let buffer = AudioBuffer::from_samples(samples, 8000, 25.0);

        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        buffer.render(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 400);
    }

    proptest! {
        /// Segmentation always covers the samples within one zero segment
        #[test]
        fn prop_segmentation_padding(
            n_samples in 0usize..4000,
            window_width_ms in 1.0f32..50.0,
        ) {
            let samples = vec![0.25f32; n_samples];
            let buffer = AudioBuffer::from_samples(samples, 8000, window_width_ms);

            let covered = buffer.n_segments() * buffer.n_samples_per_segment();
            prop_assert!(covered <= buffer.samples().len());
            prop_assert!(
                buffer.samples().len() <= covered + buffer.n_samples_per_segment()
            );

            // Any padding must be silence
            prop_assert!(buffer.samples()[n_samples..].iter().all(|&s| s == 0.0));
        }
    }
}
