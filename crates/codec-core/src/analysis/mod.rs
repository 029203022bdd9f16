//! LPC analysis primitives
//!
//! Autocorrelation is the shared basis: the pitch estimator searches it
//! for a periodicity peak, and the Levinson-Durbin recursion solves it
//! for the reflector coefficients and prediction gain.

pub mod autocorrelation;
pub mod lpc;
pub mod pitch;

pub use autocorrelation::autocorrelate;
pub use lpc::LinearPredictor;
pub use pitch::PitchEstimator;
