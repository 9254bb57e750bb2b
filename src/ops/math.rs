//! Elementwise mathematical functions.
//!
//! All of these preserve the shape and element type of their operand.

use super::{float_operand, Op};
use crate::{context::Context, error::Result, tensor::TensorId};

fn unary(ctx: &mut Context, op: Op, x: TensorId) -> Result<TensorId> {
    let dtype = float_operand(ctx, op, x)?;
    let shape = *ctx.tensor(x)?.shape();
    let out = ctx.allocate(dtype, shape)?.with_op(op, x, None);
    Ok(ctx.push(out))
}

/// Copies `x` into a new tensor with its own storage.
pub fn dup(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Dup, x)
}

/// Element-wise square.
pub fn sqr(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Sqr, x)
}

/// Element-wise square root. Negative inputs yield NaN.
pub fn sqrt(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Sqrt, x)
}

/// Element-wise negation.
pub fn neg(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Neg, x)
}

/// Element-wise absolute value.
pub fn abs(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Abs, x)
}

/// Element-wise exponential function.
pub fn exp(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Exp, x)
}

/// Element-wise Gauss error function.
pub fn erf(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Erf, x)
}

/// Element-wise ReLU (Rectified Linear Unit) function.
pub fn relu(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Relu, x)
}

/// Element-wise GELU, in its exact `erf` form.
pub fn gelu(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Gelu, x)
}

/// Element-wise SiLU (`x * sigmoid(x)`).
pub fn silu(ctx: &mut Context, x: TensorId) -> Result<TensorId> {
    unary(ctx, Op::Silu, x)
}
