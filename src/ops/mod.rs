//! Operators of the computation graph.
//!
//! Each constructor allocates the output tensor in the context, records the
//! operator and its operands, and returns immediately. Values are produced
//! later by [`graph_compute`](crate::graph::graph_compute).

mod arithmetic;
pub(crate) mod elementwise;
mod math;
mod view;

pub use arithmetic::*;
pub use math::*;
pub use view::*;

use std::fmt;

use crate::{
    context::Context,
    dtype::DType,
    error::{FerrographError, Result},
    tensor::TensorId,
};

/// Operator that produces a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Leaf tensor, no producing operator.
    None,
    Dup,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Sqr,
    Sqrt,
    Neg,
    Abs,
    Exp,
    Erf,
    Relu,
    Gelu,
    Silu,
    Reshape,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::None => "NONE",
            Op::Dup => "DUP",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Pow => "POW",
            Op::Sqr => "SQR",
            Op::Sqrt => "SQRT",
            Op::Neg => "NEG",
            Op::Abs => "ABS",
            Op::Exp => "EXP",
            Op::Erf => "ERF",
            Op::Relu => "RELU",
            Op::Gelu => "GELU",
            Op::Silu => "SILU",
            Op::Reshape => "RESHAPE",
        }
    }

    /// Returns `true` for shape-preserving single-operand operators.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Op::Dup
                | Op::Sqr
                | Op::Sqrt
                | Op::Neg
                | Op::Abs
                | Op::Exp
                | Op::Erf
                | Op::Relu
                | Op::Gelu
                | Op::Silu
        )
    }

    /// Returns `true` for broadcasting two-operand operators.
    pub fn is_binary(self) -> bool {
        matches!(self, Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Pow)
    }

    /// Returns `true` for operators that only relabel existing storage.
    pub fn is_view(self) -> bool {
        self == Op::Reshape
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checks that `id` exists and holds a type the kernels can evaluate.
fn float_operand(ctx: &Context, op: Op, id: TensorId) -> Result<DType> {
    let dtype = ctx.tensor(id)?.dtype();
    if !dtype.is_float() {
        return Err(FerrographError::UnsupportedType {
            op: op.name(),
            dtype,
        });
    }
    Ok(dtype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_classes() {
        assert!(Op::Erf.is_unary());
        assert!(Op::Pow.is_binary());
        assert!(Op::Reshape.is_view());
        assert!(!Op::None.is_unary() && !Op::None.is_binary() && !Op::None.is_view());
        assert_eq!(Op::Div.to_string(), "DIV");
    }

    #[test]
    fn test_integer_operand_rejected() {
        let mut ctx = Context::new();
        let t = ctx.new_tensor_1d(DType::I32, 3).unwrap();
        let err = sqrt(&mut ctx, t).unwrap_err();
        assert_eq!(
            err,
            FerrographError::UnsupportedType {
                op: "SQRT",
                dtype: DType::I32
            }
        );
    }
}
