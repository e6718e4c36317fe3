// In: src/error.rs

//! This module defines the single, unified error type for the entire cloudpack library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant aborts the current call. None of them is retryable: the same
//! bytes or the same cloud will fail the same way again.

use thiserror::Error;

/// Identifies which coordinate sequence an element-level error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CloudpackError {
    // =========================================================================
    // === Input / Container Errors
    // =========================================================================
    /// Zero-length or mismatched-length sequences and permutations.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Container fields inconsistent with their declared lengths, or an
    /// unrecognized method flag / tree node tag.
    #[error("Container format error: {0}")]
    Format(String),

    #[error("Non-finite value in {axis} at index {index}")]
    NonFinite { axis: Axis, index: usize },

    // =========================================================================
    // === Codec Errors (internal consistency, never recoverable)
    // =========================================================================
    #[error("Fatal codec error: {0}")]
    Codec(String),

    #[error("Delta for {axis}[{index}] cannot be reconstructed exactly at f32 precision")]
    PrecisionLoss { axis: Axis, index: usize },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error from the Serde JSON library, raised while (de)serializing options.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error originating from the underlying I/O subsystem (log file setup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudpackError {
    /// Shorthand used by the container parser for `std::io::Read` failures on
    /// an in-memory cursor, which can only mean truncation.
    pub(crate) fn truncated(what: &str, e: std::io::Error) -> Self {
        CloudpackError::Format(format!("truncated while reading {}: {}", what, e))
    }
}
