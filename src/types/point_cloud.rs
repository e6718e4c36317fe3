//! This module defines the validated, two-dimensional point cloud exchanged by
//! the public compress/uncompress API.

use ndarray::{Array1, ArrayView1};

use crate::error::{Axis, CloudpackError};
use crate::utils::bit_identical;

/// A pair of equal-length `f32` coordinate sequences with at least one point.
///
/// Construction validates shape and finiteness once, so every kernel
/// downstream can assume `x.len() == y.len() >= 1` and finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    x: Vec<f32>,
    y: Vec<f32>,
}

impl PointCloud {
    /// Builds a cloud from owned coordinate vectors.
    pub fn new(x: Vec<f32>, y: Vec<f32>) -> Result<Self, CloudpackError> {
        if x.is_empty() || y.is_empty() {
            return Err(CloudpackError::Shape(format!(
                "point cloud must contain at least one point (x: {}, y: {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() != y.len() {
            return Err(CloudpackError::Shape(format!(
                "x and y must have equal length, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        check_finite(&x, Axis::X)?;
        check_finite(&y, Axis::Y)?;
        Ok(Self { x, y })
    }

    /// Builds a cloud from `ndarray` vectors. Non-contiguous inputs are copied
    /// into logical order.
    pub fn from_arrays(x: Array1<f32>, y: Array1<f32>) -> Result<Self, CloudpackError> {
        Self::new(x.to_vec(), y.to_vec())
    }

    /// Number of points, `n`.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false` for a constructed cloud; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f32] {
        &self.x
    }

    pub fn y(&self) -> &[f32] {
        &self.y
    }

    pub fn x_view(&self) -> ArrayView1<'_, f32> {
        ArrayView1::from(self.x.as_slice())
    }

    pub fn y_view(&self) -> ArrayView1<'_, f32> {
        ArrayView1::from(self.y.as_slice())
    }

    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>) {
        (self.x, self.y)
    }

    /// Element-wise bit-pattern equality of both sequences.
    pub fn is_identical_to(&self, other: &PointCloud) -> bool {
        bit_identical(&self.x, &other.x) && bit_identical(&self.y, &other.y)
    }
}

fn check_finite(values: &[f32], axis: Axis) -> Result<(), CloudpackError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(CloudpackError::NonFinite { axis, index }),
        None => Ok(()),
    }
}
