//! Pitch estimation from the autocorrelation
//!
//! The ACF of a near-periodic signal rises from its global maximum at lag
//! zero, crosses a trough, then re-peaks near one period. Searching only
//! within the band of admissible periods avoids both sub-harmonics and
//! noise lobes.

use tracing::trace;

/// Estimates the pitch period of a segment from its autocorrelation
#[derive(Debug, Clone)]
pub struct PitchEstimator {
    sample_rate_hz: u32,
    min_period: usize,
    max_period: usize,
}

impl PitchEstimator {
    /// Create a new pitch estimator
    ///
    /// # Arguments
    ///
    /// * `sample_rate_hz` - Sampling rate of the analyzed audio
    /// * `min_frq_hz` - Lowest admissible pitch, in Hertz
    /// * `max_frq_hz` - Highest admissible pitch, in Hertz
    pub fn new(sample_rate_hz: u32, min_frq_hz: u32, max_frq_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            min_period: (sample_rate_hz / max_frq_hz) as usize,
            max_period: (sample_rate_hz / min_frq_hz) as usize,
        }
    }

    /// Return the shortest admissible period, in samples
    pub fn min_period(&self) -> usize {
        self.min_period
    }

    /// Set the shortest admissible period from a maximum frequency
    pub fn set_max_frq_hz(&mut self, max_frq_hz: u32) {
        self.min_period = (self.sample_rate_hz / max_frq_hz) as usize;
    }

    /// Return the longest admissible period, in samples
    pub fn max_period(&self) -> usize {
        self.max_period
    }

    /// Set the longest admissible period from a minimum frequency
    pub fn set_min_frq_hz(&mut self, min_frq_hz: u32) {
        self.max_period = (self.sample_rate_hz / min_frq_hz) as usize;
    }

    /// Estimate the pitch of a segment, in Hertz
    pub fn estimate_frequency(&self, acf: &[f32]) -> f32 {
        self.sample_rate_hz as f32 / self.estimate_period(acf) as f32
    }

    /// Estimate the pitch period of a segment, in samples
    ///
    /// Within the admissible window, descend to the first local minimum of
    /// the autocorrelation, then take the lag of the maximum between that
    /// trough and the end of the window. The result is clamped to the
    /// admissible band.
    pub fn estimate_period(&self, acf: &[f32]) -> usize {
        let start = self.min_period.min(acf.len());
        let end = self.max_period.min(acf.len());

        if start >= end {
            return self.min_period;
        }

        // Walk down to the bottom of the initial descent
        let mut trough = start;
        while trough + 1 < end && acf[trough + 1] < acf[trough] {
            trough += 1;
        }

        let period = (trough..end)
            .max_by(|&a, &b| acf[a].total_cmp(&acf[b]))
            .unwrap_or(start);

        trace!(trough, period, "pitch search");

        period.clamp(self.min_period, self.max_period)
    }
}
