//! Biased autocorrelation
//!
//! The autocorrelation of a segment is the basis of all analysis: the
//! pitch estimator searches it for a periodicity peak and the linear
//! predictor solves its normal equations for the reflector coefficients.

/// Compute the biased autocorrelation of a segment
///
/// `r[k] = (1/N) * sum(s[j] * s[j+k])` for `k = 0..N`
///
/// The biased form keeps the boundary taper, so a pitch search finds a
/// genuine secondary peak rather than a monotonic rise.
pub fn autocorrelate(segment: &[f32]) -> Vec<f32> {
    let size = segment.len();
    let mut acf = vec![0.0f32; size];

    for (k, r) in acf.iter_mut().enumerate() {
        let mut sum = 0.0f32;

        for j in 0..size - k {
            sum += segment[j] * segment[j + k];
        }

        *r = sum / size as f32;
    }

    acf
}
