//! Shape handling for tensors.
//!
//! This module provides the fixed-rank [`Shape`] used by every tensor,
//! including validation, element counting and broadcasting.

use std::fmt;

use super::{Stride, MAX_DIMS};
use crate::error::{FerrographError, Result};

/// Extents of a tensor, innermost dimension first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    ne: [usize; MAX_DIMS],
    n_dims: usize,
}

impl Shape {
    /// Creates a shape from 1 to 4 extents, innermost first.
    ///
    /// # Errors
    ///
    /// Returns an error if no extents or more than [`MAX_DIMS`] are given, if
    /// any extent is zero, or if the element count overflows `usize`.
    pub fn new(extents: &[usize]) -> Result<Self> {
        if extents.is_empty() || extents.len() > MAX_DIMS {
            return Err(FerrographError::invalid_shape(format!(
                "expected 1 to {} extents, got {}",
                MAX_DIMS,
                extents.len()
            )));
        }
        if extents.contains(&0) {
            return Err(FerrographError::invalid_shape(format!(
                "extents must be non-zero, got {:?}",
                extents
            )));
        }
        if extents
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
            .is_none()
        {
            return Err(FerrographError::invalid_shape(format!(
                "element count of {:?} overflows usize",
                extents
            )));
        }

        let mut ne = [1; MAX_DIMS];
        ne[..extents.len()].copy_from_slice(extents);
        Ok(Self {
            ne,
            n_dims: extents.len(),
        })
    }

    /// Returns all four extents, including trailing ones.
    pub fn ne(&self) -> [usize; MAX_DIMS] {
        self.ne
    }

    /// Returns the extents that were requested at construction.
    pub fn dims(&self) -> &[usize] {
        &self.ne[..self.n_dims]
    }

    /// Returns the number of dimensions.
    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    /// Returns the total number of elements.
    pub fn nelements(&self) -> usize {
        self.ne.iter().product()
    }

    /// Returns the contiguous strides for this shape.
    pub fn strides(&self) -> Stride {
        Stride::row_major(&self.ne)
    }

    /// Splits a flat element index into per-axis coordinates.
    pub fn unravel(&self, mut index: usize) -> [usize; MAX_DIMS] {
        let mut coords = [0; MAX_DIMS];
        for (coord, &extent) in coords.iter_mut().zip(self.ne.iter()) {
            *coord = index % extent;
            index /= extent;
        }
        coords
    }

    /// Computes the shape of an elementwise result of `self` and `other`.
    ///
    /// Each axis is broadcast independently: sizes must match or one of them
    /// must be 1, and the result takes the larger.
    pub fn broadcast(&self, other: &Shape) -> Result<Shape> {
        let mut ne = [1; MAX_DIMS];
        for (axis, out) in ne.iter_mut().enumerate() {
            let (a, b) = (self.ne[axis], other.ne[axis]);
            if a != b && a != 1 && b != 1 {
                return Err(FerrographError::IncompatibleShapes(
                    self.dims().to_vec(),
                    other.dims().to_vec(),
                ));
            }
            *out = a.max(b);
        }
        Ok(Shape {
            ne,
            n_dims: self.n_dims.max(other.n_dims),
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims())
    }
}
