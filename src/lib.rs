//! This file is the root of the `cloudpack` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`pipeline`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface: the point cloud type, the options, the
//!     error type and the stateless compress / uncompress functions.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

#[doc(hidden)]
pub use log as __log;

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod pipeline;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{
    analyze_container, check_compression, compress, enable_verbose_logging, uncompress,
    ContainerStats, HuffmanStats,
};
pub use config::{CompressOptions, CompressionMethod};
pub use error::{Axis, CloudpackError};
pub use types::PointCloud;
