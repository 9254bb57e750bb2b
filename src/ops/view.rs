//! Zero-copy reshape operators.
//!
//! A reshape produces a view: it shares the storage of its source and only
//! carries new extents. It is still recorded as a graph node so the builder
//! orders it after its source, but it has nothing to compute.

use super::Op;
use crate::{
    context::Context,
    dimension::Shape,
    error::{FerrographError, Result},
    storage::Storage,
    tensor::{Tensor, TensorId},
};

/// Reinterprets `x` with the given extents, innermost first.
///
/// # Errors
///
/// Returns an error if the extents are invalid or their product differs from
/// the element count of `x`.
pub fn reshape(ctx: &mut Context, x: TensorId, extents: &[usize]) -> Result<TensorId> {
    let src = ctx.tensor(x)?;
    let shape = Shape::new(extents)?;
    if shape.nelements() != src.nelements() {
        return Err(FerrographError::ReshapeError(
            src.shape().dims().to_vec(),
            extents.to_vec(),
        ));
    }

    let dtype = src.dtype();
    let source = ctx.owner(x)?;
    let out = Tensor::new(dtype, shape, Storage::View { source }).with_op(Op::Reshape, x, None);
    Ok(ctx.push(out))
}

pub fn reshape_1d(ctx: &mut Context, x: TensorId, ne0: usize) -> Result<TensorId> {
    reshape(ctx, x, &[ne0])
}

pub fn reshape_2d(ctx: &mut Context, x: TensorId, ne0: usize, ne1: usize) -> Result<TensorId> {
    reshape(ctx, x, &[ne0, ne1])
}

pub fn reshape_3d(
    ctx: &mut Context,
    x: TensorId,
    ne0: usize,
    ne1: usize,
    ne2: usize,
) -> Result<TensorId> {
    reshape(ctx, x, &[ne0, ne1, ne2])
}

pub fn reshape_4d(
    ctx: &mut Context,
    x: TensorId,
    ne0: usize,
    ne1: usize,
    ne2: usize,
    ne3: usize,
) -> Result<TensorId> {
    reshape(ctx, x, &[ne0, ne1, ne2, ne3])
}
