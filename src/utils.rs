//! This module provides a set of shared, low-level utility functions used
//! throughout the cloudpack core.
//!
//! Symbols are compared by bit pattern, never by float equality, so these
//! helpers expose `f32` data as `u32` views through `bytemuck`.

/// Reinterprets a slice of `f32` as the slice of its IEEE-754 bit patterns.
/// Zero-copy; `f32` and `u32` share size and alignment.
pub fn f32_bits(values: &[f32]) -> &[u32] {
    bytemuck::cast_slice(values)
}

/// Returns `true` iff both slices have the same length and every pair of
/// elements is bit-identical. Unlike `==`, this distinguishes `-0.0` from `0.0`.
pub fn bit_identical(a: &[f32], b: &[f32]) -> bool {
    f32_bits(a) == f32_bits(b)
}
