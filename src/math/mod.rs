//! Mathematical utilities: ringdown basis, splines and small linear solves.

pub mod basis;
pub mod ols;
pub mod spline;

pub use basis::*;
pub use ols::*;
pub use spline::CubicSpline;
