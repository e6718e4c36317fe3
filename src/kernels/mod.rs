//! This module declares the collection of pure, stateless kernels that make up
//! the point-cloud compression pipeline.
//!
//! Kernels know nothing about the container layout; the `pipeline` module
//! sequences them and frames their output.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Stage 1: Order-preserving sort with permutation recovery
pub mod permutation;

/// Stage 2: Value Reduction
pub mod delta;

/// Stage 3a: Entropy Coding
pub mod huffman;

/// Stage 3b: Fixed-width payload (no entropy coding)
pub mod hybrid;
