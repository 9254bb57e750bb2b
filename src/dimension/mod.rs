//! Dimension system for tensors.
//!
//! Tensors have up to [`MAX_DIMS`] extents stored innermost-first: `ne[0]` is the
//! length of a contiguous row, and unused trailing extents are fixed at 1.
//! This module handles extents, strides and elementwise broadcasting.

pub mod shape;
pub mod stride;

pub use shape::Shape;
pub use stride::Stride;

/// Maximum number of dimensions a tensor can have.
pub const MAX_DIMS: usize = 4;
