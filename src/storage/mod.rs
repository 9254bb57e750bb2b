//! Storage for tensor data.
//!
//! A tensor either owns a contiguous typed buffer or aliases the buffer of
//! another tensor in the same context.

use crate::dtype::DType;
use crate::tensor::TensorId;

/// A contiguous, type-tagged element buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
}

impl TensorData {
    /// Allocates a zero-filled buffer of `len` elements.
    pub fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::F32 => TensorData::F32(vec![0.0; len]),
            DType::F64 => TensorData::F64(vec![0.0; len]),
            DType::I32 => TensorData::I32(vec![0; len]),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            TensorData::F32(_) => DType::F32,
            TensorData::F64(_) => DType::F64,
            TensorData::I32(_) => DType::I32,
        }
    }

    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            TensorData::F32(values) => values.len(),
            TensorData::F64(values) => values.len(),
            TensorData::I32(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a tensor's elements live.
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    /// The tensor exclusively owns its buffer.
    Owned(TensorData),
    /// The tensor shares the buffer owned by `source`.
    View { source: TensorId },
}

impl Storage {
    pub fn is_view(&self) -> bool {
        matches!(self, Storage::View { .. })
    }
}
