//! Orbital dynamics integration.
//!
//! - `rk45`: adaptive Dormand–Prince stepping with uniform dense output
//! - `stop`: the inspiral-plunge and ringdown termination predicates
//! - `stages`: the coarse/fine two-pass sequencing

pub mod rk45;
pub mod stages;
pub mod stop;

pub use rk45::{DormandPrince, StopCondition, Tolerances, VectorField};
pub use stages::{run_stages, StagePlan, StagedDynamics};
pub use stop::{InspiralPlungeStop, RingdownStop};
