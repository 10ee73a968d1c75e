//! numerical_stability — guarded transforms and shared numeric tolerances.
//!
//! The refiner maps unconstrained optimizer coordinates onto positive
//! decline parameters through [`anchored_softplus`]; the inference layer
//! uses [`EIGEN_EPS`] when pseudo-inverting Hessians. All functions are
//! pure and assume finite inputs.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, anchored_softplus, anchored_softplus_deriv, safe_logistic, safe_softplus,
};
