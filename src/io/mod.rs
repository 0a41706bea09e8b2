//! Input/output helpers.
//!
//! - strain CSV write/read (`export`)
//! - run summary JSON (`summary`)

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
