//! This module is the pure, I/O-free compression engine. `artifact` owns the
//! container byte layout; `orchestrator` sequences the kernels around it.

pub mod artifact;
pub mod orchestrator;

pub use artifact::{CompressedContainer, Payload};
