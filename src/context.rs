//! Tensor arena and allocator.
//!
//! Every tensor is created through a [`Context`], which owns its storage for the
//! lifetime of the context. Tensors refer to each other by [`TensorId`], so the
//! operand links of the computation graph never own anything.

use tracing::trace;

use crate::{
    dimension::Shape,
    dtype::{DType, Element},
    error::{FerrographError, Result},
    storage::{Storage, TensorData},
    tensor::{Tensor, TensorId},
};

/// Allocation settings of a [`Context`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextConfig {
    /// Upper bound, in bytes, on owned tensor storage. `None` means unlimited.
    pub mem_limit: Option<usize>,
}

impl ContextConfig {
    pub fn with_mem_limit(mut self, bytes: usize) -> Self {
        self.mem_limit = Some(bytes);
        self
    }
}

/// Arena owning all tensors of a computation.
#[derive(Debug, Default)]
pub struct Context {
    tensors: Vec<Tensor>,
    config: ContextConfig,
    mem_used: usize,
}

impl Context {
    /// Creates a context without a memory limit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            tensors: Vec::new(),
            config,
            mem_used: 0,
        }
    }

    /// Returns the number of tensors in the arena.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Returns the number of bytes of owned storage allocated so far.
    pub fn mem_used(&self) -> usize {
        self.mem_used
    }

    pub fn tensor(&self, id: TensorId) -> Result<&Tensor> {
        self.tensors
            .get(id.0)
            .ok_or(FerrographError::InvalidTensor(id.0))
    }

    /// Creates a zero-filled tensor with 1 to 4 extents, innermost first.
    pub fn new_tensor(&mut self, dtype: DType, extents: &[usize]) -> Result<TensorId> {
        let shape = Shape::new(extents)?;
        let tensor = self.allocate(dtype, shape)?;
        Ok(self.push(tensor))
    }

    pub fn new_tensor_1d(&mut self, dtype: DType, ne0: usize) -> Result<TensorId> {
        self.new_tensor(dtype, &[ne0])
    }

    pub fn new_tensor_2d(&mut self, dtype: DType, ne0: usize, ne1: usize) -> Result<TensorId> {
        self.new_tensor(dtype, &[ne0, ne1])
    }

    pub fn new_tensor_3d(
        &mut self,
        dtype: DType,
        ne0: usize,
        ne1: usize,
        ne2: usize,
    ) -> Result<TensorId> {
        self.new_tensor(dtype, &[ne0, ne1, ne2])
    }

    pub fn new_tensor_4d(
        &mut self,
        dtype: DType,
        ne0: usize,
        ne1: usize,
        ne2: usize,
        ne3: usize,
    ) -> Result<TensorId> {
        self.new_tensor(dtype, &[ne0, ne1, ne2, ne3])
    }

    /// Creates a tensor holding a copy of `data`.
    ///
    /// The element type is taken from `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is invalid or `data.len()` differs from the
    /// element count of the shape.
    pub fn new_tensor_with_data<T: Element>(
        &mut self,
        extents: &[usize],
        data: &[T],
    ) -> Result<TensorId> {
        let shape = Shape::new(extents)?;
        if data.len() != shape.nelements() {
            return Err(FerrographError::shape_mismatch(
                vec![shape.nelements()],
                vec![data.len()],
            ));
        }
        self.reserve(T::DTYPE, &shape)?;
        let storage = Storage::Owned(T::into_data(data.to_vec()));
        let tensor = Tensor::new(T::DTYPE, shape, storage);
        Ok(self.push(tensor))
    }

    pub fn new_tensor_1d_with_data<T: Element>(
        &mut self,
        ne0: usize,
        data: &[T],
    ) -> Result<TensorId> {
        self.new_tensor_with_data(&[ne0], data)
    }

    pub fn new_tensor_2d_with_data<T: Element>(
        &mut self,
        ne0: usize,
        ne1: usize,
        data: &[T],
    ) -> Result<TensorId> {
        self.new_tensor_with_data(&[ne0, ne1], data)
    }

    pub fn new_tensor_3d_with_data<T: Element>(
        &mut self,
        ne0: usize,
        ne1: usize,
        ne2: usize,
        data: &[T],
    ) -> Result<TensorId> {
        self.new_tensor_with_data(&[ne0, ne1, ne2], data)
    }

    /// Borrows the elements of a tensor, following views to their storage.
    pub fn data<T: Element>(&self, id: TensorId) -> Result<&[T]> {
        let buffer = self.buffer(id)?;
        T::slice(buffer).ok_or_else(|| FerrographError::type_mismatch(T::DTYPE, buffer.dtype()))
    }

    /// Mutably borrows the elements of a tensor.
    ///
    /// Writing through a view modifies the storage it aliases.
    pub fn data_mut<T: Element>(&mut self, id: TensorId) -> Result<&mut [T]> {
        let buffer = self.buffer_mut(id)?;
        let dtype = buffer.dtype();
        T::slice_mut(buffer).ok_or_else(|| FerrographError::type_mismatch(T::DTYPE, dtype))
    }

    /// Overwrites the elements of a tensor.
    pub fn set_data<T: Element>(&mut self, id: TensorId, values: &[T]) -> Result<()> {
        let data = self.data_mut::<T>(id)?;
        if data.len() != values.len() {
            return Err(FerrographError::shape_mismatch(
                vec![data.len()],
                vec![values.len()],
            ));
        }
        data.copy_from_slice(values);
        Ok(())
    }

    pub fn to_vec<T: Element>(&self, id: TensorId) -> Result<Vec<T>> {
        Ok(self.data::<T>(id)?.to_vec())
    }

    /// Allocates an owned, zero-filled tensor without adding it to the arena.
    pub(crate) fn allocate(&mut self, dtype: DType, shape: Shape) -> Result<Tensor> {
        self.reserve(dtype, &shape)?;
        trace!(%dtype, %shape, "allocate");
        Ok(Tensor::new(
            dtype,
            shape,
            Storage::Owned(TensorData::zeros(dtype, shape.nelements())),
        ))
    }

    pub(crate) fn push(&mut self, tensor: Tensor) -> TensorId {
        let id = TensorId(self.tensors.len());
        self.tensors.push(tensor);
        id
    }

    /// Returns the tensor that owns the storage `id` reads from.
    pub(crate) fn owner(&self, id: TensorId) -> Result<TensorId> {
        match self.tensor(id)?.storage() {
            Storage::Owned(_) => Ok(id),
            Storage::View { source } => Ok(*source),
        }
    }

    pub(crate) fn buffer(&self, id: TensorId) -> Result<&TensorData> {
        let owner = self.owner(id)?;
        match self.tensor(owner)?.storage() {
            Storage::Owned(data) => Ok(data),
            Storage::View { .. } => Err(FerrographError::InvalidTensor(owner.0)),
        }
    }

    pub(crate) fn buffer_mut(&mut self, id: TensorId) -> Result<&mut TensorData> {
        let owner = self.owner(id)?;
        match &mut self.tensors[owner.0].storage {
            Storage::Owned(data) => Ok(data),
            Storage::View { .. } => Err(FerrographError::InvalidTensor(owner.0)),
        }
    }

    /// Detaches the buffer of an owned tensor so it can be written while the
    /// rest of the arena is shared. Pair with [`Context::restore_buffer`].
    pub(crate) fn take_buffer(&mut self, id: TensorId) -> Result<TensorData> {
        let tensor = self
            .tensors
            .get_mut(id.0)
            .ok_or(FerrographError::InvalidTensor(id.0))?;
        match &mut tensor.storage {
            Storage::Owned(data) => {
                let empty = TensorData::zeros(data.dtype(), 0);
                Ok(std::mem::replace(data, empty))
            }
            Storage::View { .. } => Err(FerrographError::invalid_input(format!(
                "tensor {} is a view and has no buffer of its own",
                id
            ))),
        }
    }

    pub(crate) fn restore_buffer(&mut self, id: TensorId, data: TensorData) {
        if let Some(Storage::Owned(slot)) = self.tensors.get_mut(id.0).map(|t| &mut t.storage) {
            *slot = data;
        }
    }

    /// Charges the storage of a `dtype` tensor of `shape` against the budget.
    fn reserve(&mut self, dtype: DType, shape: &Shape) -> Result<()> {
        let bytes = shape.nelements().checked_mul(dtype.size());
        let bytes = match (bytes, self.config.mem_limit) {
            (Some(bytes), _) => bytes,
            (None, Some(limit)) => {
                return Err(FerrographError::OutOfMemory {
                    requested: usize::MAX,
                    available: limit.saturating_sub(self.mem_used),
                    limit,
                })
            }
            (None, None) => {
                return Err(FerrographError::invalid_shape(format!(
                    "{} tensor of {} exceeds the address space",
                    dtype, shape
                )))
            }
        };
        if let Some(limit) = self.config.mem_limit {
            let available = limit.saturating_sub(self.mem_used);
            if bytes > available {
                return Err(FerrographError::OutOfMemory {
                    requested: bytes,
                    available,
                    limit,
                });
            }
        }
        self.mem_used = self.mem_used.saturating_add(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tensor_zeroed() {
        let mut ctx = Context::new();
        let t = ctx.new_tensor_2d(DType::F32, 3, 2).unwrap();
        let tensor = ctx.tensor(t).unwrap();
        assert_eq!(tensor.ne(), [3, 2, 1, 1]);
        assert!(tensor.is_leaf());
        assert_eq!(ctx.data::<f32>(t).unwrap(), &[0.0; 6]);
        assert_eq!(ctx.mem_used(), 24);
    }

    #[test]
    fn test_with_data_copies() {
        let mut ctx = Context::new();
        let values = vec![1.0f64, 2.0, 3.0];
        let t = ctx.new_tensor_1d_with_data(3, &values).unwrap();
        assert_eq!(ctx.tensor(t).unwrap().dtype(), DType::F64);
        assert_eq!(ctx.to_vec::<f64>(t).unwrap(), values);
    }

    #[test]
    fn test_with_data_length_mismatch() {
        let mut ctx = Context::new();
        let err = ctx.new_tensor_2d_with_data(2, 2, &[1.0f32, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, FerrographError::ShapeMismatch { .. }));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_typed_access() {
        let mut ctx = Context::new();
        let t = ctx.new_tensor_1d(DType::I32, 4).unwrap();
        ctx.set_data(t, &[1, 2, 3, 4]).unwrap();
        assert_eq!(ctx.data::<i32>(t).unwrap(), &[1, 2, 3, 4]);
        assert_eq!(
            ctx.data::<f32>(t).unwrap_err(),
            FerrographError::type_mismatch(DType::F32, DType::I32)
        );
        assert!(ctx.set_data(t, &[1, 2]).is_err());
    }

    #[test]
    fn test_mem_limit() {
        let mut ctx = Context::with_config(ContextConfig::default().with_mem_limit(40));
        ctx.new_tensor_1d(DType::F32, 8).unwrap();
        let err = ctx.new_tensor_1d(DType::F64, 2).unwrap_err();
        assert_eq!(
            err,
            FerrographError::OutOfMemory {
                requested: 16,
                available: 8,
                limit: 40
            }
        );
        assert_eq!(ctx.len(), 1);
        ctx.new_tensor_1d(DType::F64, 1).unwrap();
        assert_eq!(ctx.mem_used(), 40);
    }

    #[test]
    fn test_oversized_allocation() {
        let mut ctx = Context::with_config(ContextConfig::default().with_mem_limit(1024));
        let err = ctx.new_tensor_1d(DType::F64, usize::MAX / 4).unwrap_err();
        assert!(matches!(
            err,
            FerrographError::OutOfMemory {
                available: 1024,
                limit: 1024,
                ..
            }
        ));

        let mut ctx = Context::new();
        let err = ctx.new_tensor_1d(DType::F64, usize::MAX / 4).unwrap_err();
        assert!(matches!(err, FerrographError::InvalidShape(_)));
        let err = ctx.new_tensor_2d(DType::F32, 1 << 40, 1 << 40).unwrap_err();
        assert!(matches!(err, FerrographError::InvalidShape(_)));
        assert!(ctx.is_empty());
        assert_eq!(ctx.mem_used(), 0);
    }

    #[test]
    fn test_invalid_id() {
        let ctx = Context::new();
        assert_eq!(
            ctx.tensor(TensorId(3)).unwrap_err(),
            FerrographError::InvalidTensor(3)
        );
    }
}
