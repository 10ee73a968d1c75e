//! inference — post-fit uncertainty for least-squares estimates.
//!
//! [`calc_standard_errors`] converts the numerical Hessian of an objective
//! at its optimum into per-parameter standard errors via an eigen
//! pseudoinverse. The decline refiner is the only caller.

pub mod hessian;

pub use self::hessian::calc_standard_errors;
