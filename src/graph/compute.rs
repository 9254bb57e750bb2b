//! Parallel evaluation of a built graph.
//!
//! Nodes run one after another. The elements of a single node are split into
//! contiguous chunks that run on a rayon pool, joined before the next node.

use std::ops::Range;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info_span, trace};

use super::Graph;
use crate::{
    context::Context,
    dtype::{DType, FloatElement},
    error::{FerrographError, Result},
    ops::{
        elementwise::{Kernel, Operand},
        Op,
    },
    storage::TensorData,
    tensor::TensorId,
};

/// Evaluates every node of `graph`, in graph order.
///
/// Each node's output is split into `threads_count` contiguous chunks that are
/// computed in parallel; all chunks of a node finish before the next node
/// starts. Operands are only read and every chunk writes a disjoint part of
/// the output, so no locking is involved. Reshape nodes alias their source and
/// are skipped.
///
/// The graph must have been built with [`build_forward_expand`](super::build_forward_expand)
/// against the same context, and all of its leafs are expected to hold data.
/// Re-running a computed graph yields the same values.
pub fn graph_compute(ctx: &mut Context, graph: &Graph) -> Result<()> {
    let span = info_span!(
        "graph_compute",
        nodes = graph.n_nodes(),
        threads = graph.threads_count
    );
    let _enter = span.enter();

    let pool = if graph.threads_count > 1 {
        let pool = ThreadPoolBuilder::new()
            .num_threads(graph.threads_count)
            .thread_name(|i| format!("ferrograph-worker-{}", i))
            .build()
            .map_err(|e| FerrographError::ThreadPool(e.to_string()))?;
        Some(pool)
    } else {
        None
    };

    for &id in &graph.nodes {
        let op = ctx.tensor(id)?.op();
        if op.is_view() || op == Op::None {
            trace!(node = id.index(), %op, "nothing to compute");
            continue;
        }

        let mut buffer = ctx.take_buffer(id)?;
        debug!(node = id.index(), %op, elements = buffer.len(), "compute node");
        let result = compute_node(ctx, id, &mut buffer, graph.threads_count, pool.as_ref());
        ctx.restore_buffer(id, buffer);
        result?;
    }
    Ok(())
}

fn compute_node(
    ctx: &Context,
    id: TensorId,
    dst: &mut TensorData,
    n_threads: usize,
    pool: Option<&ThreadPool>,
) -> Result<()> {
    match dst {
        TensorData::F32(values) => compute_typed::<f32>(ctx, id, values, n_threads, pool),
        TensorData::F64(values) => compute_typed::<f64>(ctx, id, values, n_threads, pool),
        TensorData::I32(_) => Err(FerrographError::UnsupportedType {
            op: ctx.tensor(id)?.op().name(),
            dtype: DType::I32,
        }),
    }
}

fn compute_typed<T: FloatElement>(
    ctx: &Context,
    id: TensorId,
    dst: &mut [T],
    n_threads: usize,
    pool: Option<&ThreadPool>,
) -> Result<()> {
    let tensor = ctx.tensor(id)?;
    let op = tensor.op();
    let missing =
        || FerrographError::invalid_input(format!("{} node {} lacks an operand", op, id));
    let src0 = tensor.src0().ok_or_else(missing)?;

    let kernel = if op.is_unary() {
        Kernel::Unary {
            op,
            src: ctx.data::<T>(src0)?,
        }
    } else if op.is_binary() {
        let src1 = tensor.src1().ok_or_else(missing)?;
        Kernel::Binary {
            op,
            lhs: operand(ctx, src0)?,
            rhs: operand(ctx, src1)?,
            out: *tensor.shape(),
        }
    } else {
        return Err(FerrographError::invalid_input(format!(
            "no kernel for operator {}",
            op
        )));
    };

    match pool {
        Some(pool) => dispatch(pool, &kernel, dst, n_threads),
        None => kernel.run(0, dst),
    }
    Ok(())
}

fn operand<T: FloatElement>(ctx: &Context, id: TensorId) -> Result<Operand<'_, T>> {
    let tensor = ctx.tensor(id)?;
    Ok(Operand::new(ctx.data::<T>(id)?, *tensor.shape(), *tensor.strides()))
}

/// Runs `kernel` over `dst` in `n_threads` chunks and waits for all of them.
fn dispatch<T: FloatElement>(
    pool: &ThreadPool,
    kernel: &Kernel<'_, T>,
    dst: &mut [T],
    n_threads: usize,
) {
    let n = dst.len();
    pool.scope(|s| {
        let mut rest = dst;
        for ith in 0..n_threads {
            let range = chunk_range(n, n_threads, ith);
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            rest = tail;
            if chunk.is_empty() {
                continue;
            }
            s.spawn(move |_| {
                trace!(ith, start = range.start, end = range.end, "chunk");
                kernel.run(range.start, chunk);
            });
        }
    });
}

/// Element range of chunk `ith` when `n` elements are split `n_threads` ways.
///
/// Chunks are contiguous, cover `0..n` in order, and differ in length by at
/// most one element.
pub(crate) fn chunk_range(n: usize, n_threads: usize, ith: usize) -> Range<usize> {
    (ith * n / n_threads)..((ith + 1) * n / n_threads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::build_forward_expand, ops};
    use approx::assert_relative_eq;

    #[test]
    fn test_chunk_range_covers() {
        for n in 1..20 {
            for t in 1..8 {
                let mut next = 0;
                for ith in 0..t {
                    let range = chunk_range(n, t, ith);
                    assert_eq!(range.start, next);
                    assert!(range.len() <= n / t + 1);
                    next = range.end;
                }
                assert_eq!(next, n);
            }
        }
    }

    #[test]
    fn test_more_threads_than_elements() {
        assert_eq!(chunk_range(2, 5, 0), 0..0);
        assert_eq!(chunk_range(2, 5, 2), 0..1);
        assert_eq!(chunk_range(2, 5, 4), 1..2);
    }

    #[test]
    fn test_compute_chain() {
        let mut ctx = Context::new();
        let a = ctx.new_tensor_1d_with_data(4, &[1.0f64, 4.0, 9.0, 16.0]).unwrap();
        let b = ctx.new_tensor_1d_with_data(1, &[2.0f64]).unwrap();
        let s = ops::sqrt(&mut ctx, a).unwrap();
        let d = ops::div(&mut ctx, s, b).unwrap();

        let mut graph = Graph::new(3).unwrap();
        build_forward_expand(&mut graph, &ctx, d).unwrap();
        graph_compute(&mut ctx, &graph).unwrap();

        assert_eq!(ctx.data::<f64>(s).unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ctx.data::<f64>(d).unwrap(), &[0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_compute_through_reshape() {
        let mut ctx = Context::new();
        let x = ctx
            .new_tensor_2d_with_data(3, 2, &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        let sq = ops::sqr(&mut ctx, x).unwrap();
        let flat = ops::reshape_1d(&mut ctx, sq, 6).unwrap();
        let half = ctx.new_tensor_1d_with_data(1, &[0.5f32]).unwrap();
        let out = ops::mul(&mut ctx, flat, half).unwrap();

        let mut graph = Graph::new(2).unwrap();
        build_forward_expand(&mut graph, &ctx, out).unwrap();
        assert_eq!(graph.nodes(), &[sq, flat, out]);
        graph_compute(&mut ctx, &graph).unwrap();

        assert_eq!(ctx.tensor(out).unwrap().shape().dims(), &[6]);
        assert_eq!(
            ctx.data::<f32>(out).unwrap(),
            &[0.5, 2.0, 4.5, 8.0, 12.5, 18.0]
        );
    }

    #[test]
    fn test_gelu_f32() {
        let mut ctx = Context::new();
        let x = ctx.new_tensor_1d_with_data(2, &[0.0f32, 1.0]).unwrap();
        let y = ops::gelu(&mut ctx, x).unwrap();
        let mut graph = Graph::sequential();
        build_forward_expand(&mut graph, &ctx, y).unwrap();
        graph_compute(&mut ctx, &graph).unwrap();

        let values = ctx.data::<f32>(y).unwrap();
        assert_eq!(values[0], 0.0);
        assert_relative_eq!(values[1], 0.841_344_7, epsilon = 1e-6);
    }
}
