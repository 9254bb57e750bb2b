//! Arithmetic operations for tensors.
//!
//! Binary operators broadcast: along each axis the operand extents must match
//! or one of them must be 1, in which case that operand is repeated.

use super::{float_operand, Op};
use crate::{
    context::Context,
    error::{FerrographError, Result},
    tensor::TensorId,
};

fn binary(ctx: &mut Context, op: Op, a: TensorId, b: TensorId) -> Result<TensorId> {
    let a_dtype = float_operand(ctx, op, a)?;
    let b_dtype = float_operand(ctx, op, b)?;
    if a_dtype != b_dtype {
        return Err(FerrographError::type_mismatch(a_dtype, b_dtype));
    }

    let a_shape = *ctx.tensor(a)?.shape();
    let b_shape = *ctx.tensor(b)?.shape();
    let shape = a_shape.broadcast(&b_shape)?;

    let out = ctx.allocate(a_dtype, shape)?.with_op(op, a, Some(b));
    Ok(ctx.push(out))
}

/// Element-wise addition of two tensors.
pub fn add(ctx: &mut Context, a: TensorId, b: TensorId) -> Result<TensorId> {
    binary(ctx, Op::Add, a, b)
}

/// Element-wise subtraction of two tensors.
pub fn sub(ctx: &mut Context, a: TensorId, b: TensorId) -> Result<TensorId> {
    binary(ctx, Op::Sub, a, b)
}

/// Element-wise multiplication of two tensors.
pub fn mul(ctx: &mut Context, a: TensorId, b: TensorId) -> Result<TensorId> {
    binary(ctx, Op::Mul, a, b)
}

/// Element-wise division of two tensors.
///
/// Division by zero follows IEEE 754 and yields an infinity or NaN.
pub fn div(ctx: &mut Context, a: TensorId, b: TensorId) -> Result<TensorId> {
    binary(ctx, Op::Div, a, b)
}

/// Element-wise power `a^b`.
///
/// A negative base with a non-integer exponent yields NaN.
pub fn pow(ctx: &mut Context, a: TensorId, b: TensorId) -> Result<TensorId> {
    binary(ctx, Op::Pow, a, b)
}
