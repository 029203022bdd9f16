//! Linear prediction via Levinson-Durbin recursion
//!
//! The upper vocal tract is modeled as a ten-pole lattice filter. Solving
//! the autocorrelation normal equations with the Levinson-Durbin recursion
//! yields the reflector coefficients directly, along with the residual
//! prediction error from which the frame gain is derived.

/// Order-10 linear predictor for the upper vocal tract
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    order: usize,
    error: f32,
}

impl Default for LinearPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearPredictor {
    /// Create a predictor with the TMS5220 model order of ten
    pub fn new() -> Self {
        Self::with_order(10)
    }

    /// Create a predictor with an explicit model order
    pub fn with_order(order: usize) -> Self {
        Self { order, error: 0.0 }
    }

    /// Return the model order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Compute reflector coefficients from an autocorrelation
    ///
    /// Runs the Levinson-Durbin recursion and returns `k[1..=order]`. The
    /// residual error is retained for [`LinearPredictor::gain_db`].
    ///
    /// A degenerate autocorrelation (`r[0] = 0`) produces NaN
    /// coefficients and gain; the frame constructor neutralizes such
    /// frames to silence.
    pub fn reflector_coefficients(&mut self, acf: &[f32]) -> Vec<f32> {
        let order = self.order;
        let r = acf;

        let mut k = vec![0.0f32; order + 1];
        let mut e = vec![0.0f32; order + 1];
        let mut b = vec![vec![0.0f32; order + 1]; order + 1];

        e[0] = r[0];
        k[0] = 0.0;

        for m in 1..=order {
            let mut sum = r[m];
            for i in 1..m {
                sum += b[m - 1][i] * r[m - i];
            }

            k[m] = -sum / e[m - 1];
            b[m][m] = k[m];
            e[m] = e[m - 1] * (1.0 - k[m] * k[m]);

            for i in 1..m {
                b[m][i] = b[m - 1][i] + k[m] * b[m - 1][m - i];
            }
        }

        // The retained error is the squared gain factor of the prediction
        self.error = e[order - 1];

        k.remove(0);
        k
    }

    /// Return the prediction gain, in decibels
    ///
    /// The gain of the signal is the ratio of the original signal energy
    /// to the residual error, scaled by a reference intensity and
    /// expressed on the decibel scale.
    pub fn gain_db(&self) -> f32 {
        let gain = 10.0 * (self.error / 1e-12).log10();
        gain.abs()
    }
}
