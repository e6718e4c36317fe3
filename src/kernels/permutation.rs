//! This module contains the pure, stateless kernels for order-preserving sorting
//! with permutation recovery.
//!
//! `forward` sorts a coordinate sequence and returns the inverse permutation that
//! restores the original order; `apply_inverse` performs that restoration.
//! Indices are stored as `u32`, which covers every `n` the container can frame.

use crate::error::CloudpackError;

//==================================================================================
// 1. Public API
//==================================================================================

/// Stable ascending sort of `values` under the IEEE total order.
///
/// Returns `(sorted, inverse)` such that `values[i] == sorted[inverse[i]]` for
/// every `i`. Equal values keep their original relative order, so the
/// permutation is well defined for repeated values.
pub fn forward(values: &[f32]) -> Result<(Vec<f32>, Vec<u32>), CloudpackError> {
    if values.is_empty() {
        return Err(CloudpackError::Shape(
            "cannot sort an empty sequence".to_string(),
        ));
    }
    if values.len() > u32::MAX as usize {
        return Err(CloudpackError::Shape(format!(
            "sequence of length {} exceeds the u32 index range",
            values.len()
        )));
    }

    // `perm[i]` is the original index of the i-th smallest value.
    let mut perm: Vec<u32> = (0..values.len() as u32).collect();
    perm.sort_by(|&a, &b| values[a as usize].total_cmp(&values[b as usize]));

    let sorted: Vec<f32> = perm.iter().map(|&p| values[p as usize]).collect();

    let mut inverse = vec![0u32; values.len()];
    for (rank, &orig) in perm.iter().enumerate() {
        inverse[orig as usize] = rank as u32;
    }
    Ok((sorted, inverse))
}

/// Restores original order: `result[i] = sorted[inverse[i]]`.
pub fn apply_inverse(sorted: &[f32], inverse: &[u32]) -> Result<Vec<f32>, CloudpackError> {
    if sorted.is_empty() {
        return Err(CloudpackError::Shape(
            "cannot un-permute an empty sequence".to_string(),
        ));
    }
    if sorted.len() != inverse.len() {
        return Err(CloudpackError::Shape(format!(
            "sequence length {} does not match permutation length {}",
            sorted.len(),
            inverse.len()
        )));
    }
    inverse
        .iter()
        .map(|&idx| {
            sorted.get(idx as usize).copied().ok_or_else(|| {
                CloudpackError::Format(format!(
                    "permutation index {} out of range for length {}",
                    idx,
                    sorted.len()
                ))
            })
        })
        .collect()
}

/// Checks that `perm` is a bijection over `[0, perm.len())`.
pub fn validate(perm: &[u32]) -> Result<(), CloudpackError> {
    let mut seen = vec![false; perm.len()];
    for &idx in perm {
        match seen.get_mut(idx as usize) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(CloudpackError::Format(format!(
                    "permutation index {} appears more than once",
                    idx
                )))
            }
            None => {
                return Err(CloudpackError::Format(format!(
                    "permutation index {} out of range for length {}",
                    idx,
                    perm.len()
                )))
            }
        }
    }
    Ok(())
}
