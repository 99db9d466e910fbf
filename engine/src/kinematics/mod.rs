//! Analytic motion integrators
//!
//! Both integrators are lazily caught up: they remember when they were last
//! touched and advance by the elapsed simulation time whenever `update(now)` is
//! called. Neither reads a clock on its own.
//!
//! - **angular**: rotation about a fixed 2D center at a signed angular rate
//! - **linear**: constant-velocity straight-line motion

pub mod angular;
pub mod linear;

pub use angular::{rotation_sign, AngularIntegrator, AngularRate, MAX_ANGLE_WRAPS};
pub use linear::LinearIntegrator;
