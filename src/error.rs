use thiserror::Error;

use crate::dtype::DType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerrographError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Incompatible shapes for operation: {0:?} and {1:?}")]
    IncompatibleShapes(Vec<usize>, Vec<usize>),
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
    #[error("Reshape error: cannot reshape tensor of size {0:?} to {1:?}")]
    ReshapeError(Vec<usize>, Vec<usize>),
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DType, actual: DType },
    #[error("Unsupported type {dtype} for operation {op}")]
    UnsupportedType { op: &'static str, dtype: DType },
    #[error("Invalid tensor id: {0}")]
    InvalidTensor(usize),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Out of memory: requested {requested} bytes, {available} of {limit} available")]
    OutOfMemory {
        requested: usize,
        available: usize,
        limit: usize,
    },
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl FerrographError {
    pub fn shape_mismatch(expected: Vec<usize>, actual: Vec<usize>) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn type_mismatch(expected: DType, actual: DType) -> Self {
        Self::TypeMismatch { expected, actual }
    }
}

pub type Result<T, E = FerrographError> = std::result::Result<T, E>;
