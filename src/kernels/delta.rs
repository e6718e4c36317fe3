//! This module contains the pure, stateless kernels for delta encoding and
//! decoding of a sorted `f32` sequence.
//!
//! Element 0 of a delta sequence carries the absolute first value; element `i`
//! carries `sorted[i] - sorted[i - 1]`. Decoding is a running sum in `f32`,
//! accumulated front to back.
//!
//! `f32` subtraction is not always undone by `f32` addition, so the encoder
//! checks every delta against the exact running sum the decoder will compute.
//! A delta that misses by a rounding tie is nudged to a neighbouring `f32`;
//! one that cannot be made exact fails the call instead of losing data.

use crate::error::{Axis, CloudpackError};

/// How many neighbouring `f32` values on each side of `next - prev` are tried.
const MAX_ULP_NUDGE: usize = 4;

//==================================================================================
// 1. Core Logic
//==================================================================================

/// Returns a delta `d` such that `prev + d` is bit-identical to `next`.
fn exact_delta(prev: f32, next: f32) -> Option<f32> {
    let reconstructs = |d: f32| d.is_finite() && (prev + d).to_bits() == next.to_bits();

    let mut d = next - prev;
    if !d.is_finite() {
        d = f32::MAX.copysign(d);
    }
    if reconstructs(d) {
        return Some(d);
    }
    // -0 + +0 is +0, so repeated -0 needs a -0 delta.
    if d == 0.0 && reconstructs(-d) {
        return Some(-d);
    }

    let (mut up, mut down) = (d, d);
    for _ in 0..MAX_ULP_NUDGE {
        up = step_ulp(up, true);
        down = step_ulp(down, false);
        if reconstructs(up) {
            return Some(up);
        }
        if reconstructs(down) {
            return Some(down);
        }
    }
    None
}

/// Moves `v` to the adjacent representable `f32` toward +inf (`up`) or -inf.
fn step_ulp(v: f32, up: bool) -> f32 {
    if v == 0.0 {
        let tiny = f32::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = v.to_bits();
    if (v > 0.0) == up {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Converts a sorted sequence into its delta sequence.
///
/// `axis` only labels a `PrecisionLoss` error.
pub fn encode(sorted: &[f32], axis: Axis) -> Result<Vec<f32>, CloudpackError> {
    let (&first, rest) = sorted.split_first().ok_or_else(|| {
        CloudpackError::Shape("cannot delta-encode an empty sequence".to_string())
    })?;

    let mut deltas = Vec::with_capacity(sorted.len());
    deltas.push(first);

    // `acc` mirrors the decoder's running sum exactly.
    let mut acc = first;
    for (offset, &next) in rest.iter().enumerate() {
        let d = exact_delta(acc, next).ok_or(CloudpackError::PrecisionLoss {
            axis,
            index: offset + 1,
        })?;
        acc += d;
        deltas.push(d);
    }
    Ok(deltas)
}

/// Reconstructs the sorted sequence with a front-to-back running sum.
pub fn decode(deltas: &[f32]) -> Result<Vec<f32>, CloudpackError> {
    if deltas.is_empty() {
        return Err(CloudpackError::Shape(
            "cannot delta-decode an empty sequence".to_string(),
        ));
    }
    let mut acc = 0.0f32;
    Ok(deltas
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            acc = if i == 0 { d } else { acc + d };
            acc
        })
        .collect())
}
