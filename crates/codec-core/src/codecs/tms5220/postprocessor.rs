//! Frame-table post-processing
//!
//! The [`FramePostprocessor`] mutates a frame table between analysis and
//! bit packing: gain normalization and shifting, pitch shifting and
//! override, and repeat-frame detection. It borrows the table mutably for
//! the duration of its work and snapshots the original frames so that any
//! edits can be unwound.

use tracing::debug;

use crate::codecs::tms5220::frame::Frame;
use crate::codecs::tms5220::tables;

/// Applies bulk edits to a frame table
#[derive(Debug)]
pub struct FramePostprocessor<'a> {
    frames: &'a mut Vec<Frame>,
    original_frames: Vec<Frame>,
    max_voiced_gain_db: f32,
    max_unvoiced_gain_db: f32,
}

impl<'a> FramePostprocessor<'a> {
    /// Create a new post-processor borrowing the given frame table
    ///
    /// # Arguments
    ///
    /// * `frames` - Frame table to edit in place
    /// * `max_voiced_gain_db` - Normalization ceiling for voiced frames
    /// * `max_unvoiced_gain_db` - Normalization ceiling for unvoiced frames
    pub fn new(
        frames: &'a mut Vec<Frame>,
        max_voiced_gain_db: f32,
        max_unvoiced_gain_db: f32,
    ) -> Self {
        let original_frames = frames.clone();

        Self {
            frames,
            original_frames,
            max_voiced_gain_db,
            max_unvoiced_gain_db,
        }
    }

    /// Return the normalization ceiling for voiced frames, in decibels
    pub fn max_voiced_gain_db(&self) -> f32 {
        self.max_voiced_gain_db
    }

    /// Set the normalization ceiling for voiced frames, in decibels
    pub fn set_max_voiced_gain_db(&mut self, gain_db: f32) {
        self.max_voiced_gain_db = gain_db;
    }

    /// Return the normalization ceiling for unvoiced frames, in decibels
    pub fn max_unvoiced_gain_db(&self) -> f32 {
        self.max_unvoiced_gain_db
    }

    /// Set the normalization ceiling for unvoiced frames, in decibels
    pub fn set_max_unvoiced_gain_db(&mut self, gain_db: f32) {
        self.max_unvoiced_gain_db = gain_db;
    }

    /// Mark frames which nearly repeat their predecessor
    ///
    /// The first reflector coefficient is typically effective at
    /// characterizing a frame, so two adjacent non-silent frames whose
    /// quantized first coefficients differ by exactly one index are treated
    /// as a repeat pair. This is a compression heuristic, not a
    /// correctness constraint.
    ///
    /// Returns the number of frames marked.
    pub fn detect_repeat_frames(&mut self) -> usize {
        let mut n_repeat_frames = 0;

        for i in 1..self.frames.len() {
            if self.frames[i].is_silent() || self.frames[i - 1].is_silent() {
                continue;
            }

            let previous_coeff = self.frames[i - 1].quantized_coeffs()[0] as i64;
            let current_coeff = self.frames[i].quantized_coeffs()[0] as i64;

            if (current_coeff - previous_coeff).abs() == 1 {
                self.frames[i].set_repeat(true);
                n_repeat_frames += 1;
            }
        }

        debug!(n_repeat_frames, "marked repeat frames");
        n_repeat_frames
    }

    /// Scale gains so each voicing population peaks at its ceiling
    ///
    /// Voiced and unvoiced frames are normalized independently, which
    /// improves perceived loudness without crossing into clipping.
    pub fn normalize_gain(&mut self) {
        self.normalize_gain_population(true);
        self.normalize_gain_population(false);
    }

    /// Shift every non-silent frame's gain index by the given offset
    ///
    /// A shift beyond either end of the coding table hits the ceiling (or
    /// floor) rather than wrapping. Overuse of the largest gain entry may
    /// destabilize the synthesized signal. Silent frames are untouched.
    pub fn shift_gain(&mut self, offset: i32) {
        if offset == 0 {
            return;
        }

        let max_index = tables::RMS.len() as i32 - 1;

        for frame in self.frames.iter_mut() {
            if frame.is_silent() {
                continue;
            }

            let shifted = (frame.quantized_gain() as i32 + offset).clamp(0, max_index);
            frame.set_gain_index(shifted as usize);
        }
    }

    /// Shift every non-silent frame's pitch index by the given offset
    ///
    /// Shifts beyond the pitch table clamp to its ends. Silent frames never
    /// have their pitch set.
    pub fn shift_pitch(&mut self, offset: i32) {
        if offset == 0 {
            return;
        }

        let max_index = tables::PITCH.len() as i32 - 1;

        for frame in self.frames.iter_mut() {
            if frame.is_silent() {
                continue;
            }

            let shifted = (frame.quantized_pitch() as i32 + offset).clamp(0, max_index);
            frame.set_pitch_period(tables::PITCH[shifted as usize] as usize);
        }
    }

    /// Set every non-silent frame's pitch to the given coding-table index
    ///
    /// Indices beyond the pitch table clamp to its last entry. Silent
    /// frames never have their pitch set.
    pub fn override_pitch(&mut self, index: usize) {
        let clamped = index.min(tables::PITCH.len() - 1);

        for frame in self.frames.iter_mut() {
            if !frame.is_silent() {
                frame.set_pitch_period(tables::PITCH[clamped] as usize);
            }
        }
    }

    /// Restore the frame table to its state at construction
    pub fn reset(&mut self) {
        self.frames.clone_from(&self.original_frames);
    }

    fn normalize_gain_population(&mut self, target_voiced: bool) {
        // Find the loudest frame of the population
        let mut max_gain = 0.0f32;
        for frame in self.frames.iter() {
            if frame.is_voiced() == target_voiced && frame.gain_db() > max_gain {
                max_gain = frame.gain_db();
            }
        }

        // An empty or all-silent population has nothing to scale
        if max_gain <= 0.0 {
            return;
        }

        let ceiling = if target_voiced {
            self.max_voiced_gain_db
        } else {
            self.max_unvoiced_gain_db
        };
        let scale = ceiling / max_gain;

        for frame in self.frames.iter_mut() {
            if frame.is_voiced() == target_voiced {
                let scaled = frame.gain_db() * scale;
                frame.set_gain_db(scaled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> Vec<Frame> {
        vec![
            Frame::silent(),
            Frame::new(38, true, 100.0, &[-0.7; 10]),
            Frame::new(40, true, 200.0, &[-0.66; 10]),
            Frame::new(0, false, 60.0, &[0.4; 10]),
        ]
    }

    #[test]
    fn test_shift_gain_clamps_and_skips_silent() {
        let mut frames = test_table();
        let silent_before = frames[0].clone();

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.shift_gain(100);

        assert_eq!(frames[0], silent_before);
        for frame in &frames[1..] {
            assert_eq!(frame.quantized_gain(), 15);
        }

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.shift_gain(-100);

        // Clamping to index zero silences the frame
        for frame in frames.iter() {
            assert_eq!(frame.quantized_gain(), 0);
        }
    }

    #[test]
    fn test_shift_gain_stays_in_table() {
        for offset in -20..=20 {
            let mut frames = test_table();
            let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
            post.shift_gain(offset);

            for frame in frames.iter() {
                assert!(frame.quantized_gain() <= 15);
            }
        }
    }

    #[test]
    fn test_detect_repeat_frames_bounds() {
        let mut frames = vec![
            Frame::new(38, true, 100.0, &[-0.7; 10]),
            Frame::silent(),
            Frame::new(40, true, 100.0, &[-0.7; 10]),
        ];

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        let n = post.detect_repeat_frames();

        // Frame 0 has no predecessor, and frame 2 follows a silent frame
        assert_eq!(n, 0);
        assert!(frames.iter().all(|f| !f.is_repeat()));
    }

    #[test]
    fn test_detect_repeat_frames_marks_neighbors() {
        // K1 entries 16 and 17 are -0.80420 and -0.74058: off by one index
        let mut frames = vec![
            Frame::new(38, true, 100.0, &[-0.80; 10]),
            Frame::new(38, true, 100.0, &[-0.74; 10]),
        ];

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        let n = post.detect_repeat_frames();

        assert_eq!(n, 1);
        assert!(!frames[0].is_repeat());
        assert!(frames[1].is_repeat());
    }

    #[test]
    fn test_normalize_gain_scales_populations_independently() {
        let mut frames = test_table();
        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.normalize_gain();

        // Loudest voiced frame lands on the voiced ceiling
        assert!((frames[2].gain_db() - 37.5).abs() < 1e-4);
        // Its quieter sibling scales by the same factor
        assert!((frames[1].gain_db() - 18.75).abs() < 1e-4);
        // The only unvoiced frame lands on the unvoiced ceiling
        assert!((frames[3].gain_db() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_gain_skips_empty_population() {
        let mut frames = vec![Frame::new(38, true, 100.0, &[-0.7; 10])];
        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.normalize_gain();

        assert!((frames[0].gain_db() - 37.5).abs() < 1e-4);
    }

    #[test]
    fn test_shift_and_override_pitch_skip_silent() {
        let mut frames = test_table();

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.override_pitch(10);

        assert_eq!(frames[0].pitch_period(), 0);
        assert_eq!(frames[1].pitch_period(), tables::PITCH[10] as usize);

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.shift_pitch(1000);

        assert_eq!(frames[0].pitch_period(), 0);
        assert_eq!(frames[1].pitch_period(), 159);
    }

    #[test]
    fn test_reset_restores_snapshot() {
        let mut frames = test_table();
        let snapshot = frames.clone();

        let mut post = FramePostprocessor::new(&mut frames, 37.5, 30.0);
        post.shift_gain(3);
        post.override_pitch(5);
        post.reset();

        assert_eq!(frames, snapshot);
    }
}
