//! This module defines the core, strongly-typed data representations used
//! throughout the cloudpack pipeline.
//!
//! It currently includes the validated `PointCloud` that both ends of the
//! public API exchange.

pub mod point_cloud;

// Re-export the main type(s) for easier access.
pub use point_cloud::PointCloud;
