//! decline::regression — parameter estimation for a single calibration set.
//!
//! - [`linear`]: linearize rates, ordinary least squares, invert to `(q_i, D_i)`.
//! - [`refine`]: optional least-squares refinement on the original rate scale.
pub mod linear;
pub mod refine;

pub use self::linear::{LinearEstimate, RegressionResult, fit_linear, linregress, r_squared};
pub use self::refine::{MIN_REFINE_SAMPLES, RefinedEstimate, refine};
