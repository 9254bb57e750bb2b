//! Core tensor type.
//!
//! A [`Tensor`] describes a typed, shaped array together with the operator that
//! produces it. Tensors live in a [`Context`](crate::context::Context) arena and
//! refer to each other by [`TensorId`].

use std::fmt;

use crate::{
    dimension::{Shape, Stride},
    dtype::DType,
    ops::Op,
    storage::Storage,
};

/// Index of a tensor inside its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(pub(crate) usize);

impl TensorId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the computation graph.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub(crate) dtype: DType,
    pub(crate) shape: Shape,
    pub(crate) strides: Stride,
    pub(crate) storage: Storage,
    pub(crate) op: Op,
    pub(crate) src0: Option<TensorId>,
    pub(crate) src1: Option<TensorId>,
}

impl Tensor {
    pub(crate) fn new(dtype: DType, shape: Shape, storage: Storage) -> Self {
        Self {
            dtype,
            shape,
            strides: shape.strides(),
            storage,
            op: Op::None,
            src0: None,
            src1: None,
        }
    }

    pub(crate) fn with_op(mut self, op: Op, src0: TensorId, src1: Option<TensorId>) -> Self {
        self.op = op;
        self.src0 = Some(src0);
        self.src1 = src1;
        self
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns all four extents, innermost first.
    pub fn ne(&self) -> [usize; 4] {
        self.shape.ne()
    }

    pub fn strides(&self) -> &Stride {
        &self.strides
    }

    /// Returns the total number of elements.
    pub fn nelements(&self) -> usize {
        self.shape.nelements()
    }

    /// Returns the operator that produces this tensor.
    pub fn op(&self) -> Op {
        self.op
    }

    pub fn src0(&self) -> Option<TensorId> {
        self.src0
    }

    pub fn src1(&self) -> Option<TensorId> {
        self.src1
    }

    /// Returns `true` if the tensor has no producing operator.
    pub fn is_leaf(&self) -> bool {
        self.op == Op::None
    }

    /// Returns `true` if the tensor aliases another tensor's storage.
    pub fn is_view(&self) -> bool {
        self.storage.is_view()
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }
}
