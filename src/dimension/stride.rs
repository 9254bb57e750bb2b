//! Stride handling for tensors.
//!
//! Strides are the number of elements to skip in memory to move one step along
//! each dimension. Tensors are laid out innermost-first, so `nb[0]` is always 1.

use super::MAX_DIMS;

/// Element strides of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stride {
    nb: [usize; MAX_DIMS],
}

impl Stride {
    /// Computes contiguous strides for the given extents.
    pub fn row_major(ne: &[usize; MAX_DIMS]) -> Self {
        let mut nb = [1; MAX_DIMS];
        for i in 1..MAX_DIMS {
            nb[i] = nb[i - 1] * ne[i - 1];
        }
        Self { nb }
    }

    /// Returns the stride values.
    pub fn as_array(&self) -> [usize; MAX_DIMS] {
        self.nb
    }

    /// Computes the flat offset of `coords` in a tensor with extents `ne`,
    /// repeating any axis of extent 1.
    pub fn broadcast_offset(&self, coords: &[usize; MAX_DIMS], ne: &[usize; MAX_DIMS]) -> usize {
        let mut offset = 0;
        for axis in 0..MAX_DIMS {
            offset += (coords[axis] % ne[axis]) * self.nb[axis];
        }
        offset
    }
}
