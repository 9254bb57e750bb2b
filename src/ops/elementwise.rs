//! Element-wise compute kernels.
//!
//! A kernel fills one contiguous chunk of a node's output. `start` is the flat
//! index of the chunk's first element; operands are only read.

use crate::{
    dimension::{Shape, Stride},
    dtype::FloatElement,
};

use super::Op;

/// Applies a unary operator to one value.
pub(crate) fn unary_value<T: FloatElement>(op: Op, x: T) -> T {
    let one = T::one();
    let half = one / (one + one);
    match op {
        Op::Dup => x,
        Op::Sqr => x * x,
        Op::Sqrt => x.sqrt(),
        Op::Neg => -x,
        Op::Abs => x.abs(),
        Op::Exp => x.exp(),
        Op::Erf => x.erf(),
        Op::Relu => x.max(T::zero()),
        Op::Gelu => half * x * (one + (x * T::FRAC_1_SQRT_2()).erf()),
        Op::Silu => x / (one + (-x).exp()),
        Op::None
        | Op::Add
        | Op::Sub
        | Op::Mul
        | Op::Div
        | Op::Pow
        | Op::Reshape => unreachable!("{} is not a unary kernel", op),
    }
}

/// Applies a binary operator to one pair of values.
pub(crate) fn binary_value<T: FloatElement>(op: Op, a: T, b: T) -> T {
    match op {
        Op::Add => a + b,
        Op::Sub => a - b,
        Op::Mul => a * b,
        Op::Div => a / b,
        Op::Pow => a.powf(b),
        Op::None
        | Op::Dup
        | Op::Sqr
        | Op::Sqrt
        | Op::Neg
        | Op::Abs
        | Op::Exp
        | Op::Erf
        | Op::Relu
        | Op::Gelu
        | Op::Silu
        | Op::Reshape => unreachable!("{} is not a binary kernel", op),
    }
}

/// A read-only operand buffer with the layout it is read through.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operand<'a, T> {
    pub data: &'a [T],
    pub shape: Shape,
    pub strides: Stride,
}

impl<'a, T> Operand<'a, T> {
    pub fn new(data: &'a [T], shape: Shape, strides: Stride) -> Self {
        Self {
            data,
            shape,
            strides,
        }
    }

    #[cfg(test)]
    fn contiguous(data: &'a [T], shape: Shape) -> Self {
        Self::new(data, shape, shape.strides())
    }
}

/// The work of one node, shared by every chunk of it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Kernel<'a, T> {
    Unary {
        op: Op,
        src: &'a [T],
    },
    Binary {
        op: Op,
        lhs: Operand<'a, T>,
        rhs: Operand<'a, T>,
        out: Shape,
    },
}

impl<'a, T: FloatElement> Kernel<'a, T> {
    /// Computes `dst`, the output elements `start..start + dst.len()`.
    pub fn run(&self, start: usize, dst: &mut [T]) {
        match *self {
            Kernel::Unary { op, src } => map(op, &src[start..start + dst.len()], dst),
            Kernel::Binary { op, lhs, rhs, out } => zip_with(op, lhs, rhs, out, start, dst),
        }
    }
}

fn map<T: FloatElement>(op: Op, src: &[T], dst: &mut [T]) {
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = unary_value(op, x);
    }
}

fn zip_with<T: FloatElement>(
    op: Op,
    lhs: Operand<'_, T>,
    rhs: Operand<'_, T>,
    out: Shape,
    start: usize,
    dst: &mut [T],
) {
    let end = start + dst.len();

    if lhs.shape == out && rhs.shape == out {
        let pairs = lhs.data[start..end].iter().zip(&rhs.data[start..end]);
        for (d, (&a, &b)) in dst.iter_mut().zip(pairs) {
            *d = binary_value(op, a, b);
        }
        return;
    }

    let (lhs_ne, rhs_ne) = (lhs.shape.ne(), rhs.shape.ne());
    for (i, d) in (start..end).zip(dst.iter_mut()) {
        let coords = out.unravel(i);
        let a = lhs.data[lhs.strides.broadcast_offset(&coords, &lhs_ne)];
        let b = rhs.data[rhs.strides.broadcast_offset(&coords, &rhs_ne)];
        *d = binary_value(op, a, b);
    }
}
