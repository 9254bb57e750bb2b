//! Graph construction.
//!
//! Linearizes the operand graph reachable from a root into evaluation order.

use tracing::debug;

use super::Graph;
use crate::{context::Context, error::Result, tensor::TensorId};

/// Adds `root` and everything it depends on to `graph`.
///
/// Tensors are visited depth-first, `src0` before `src1`, and appended after
/// their operands, so every node follows the tensors it reads. Tensors already
/// in the graph are skipped, which also keeps shared operands from appearing
/// twice. The operand graph must be acyclic; operators can only reference
/// tensors that already exist, so a context never contains a cycle.
pub fn build_forward_expand(graph: &mut Graph, ctx: &Context, root: TensorId) -> Result<()> {
    let (n_nodes, n_leafs) = (graph.n_nodes(), graph.n_leafs());

    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        let tensor = ctx.tensor(id)?;

        if expanded {
            if !graph.mark(id) {
                continue;
            }
            if tensor.is_leaf() {
                graph.leafs.push(id);
            } else {
                graph.nodes.push(id);
            }
            continue;
        }

        if graph.contains(id) {
            continue;
        }
        stack.push((id, true));
        // pushed in reverse so src0 is visited first
        if let Some(src1) = tensor.src1() {
            stack.push((src1, false));
        }
        if let Some(src0) = tensor.src0() {
            stack.push((src0, false));
        }
    }

    debug!(
        root = root.index(),
        new_nodes = graph.n_nodes() - n_nodes,
        new_leafs = graph.n_leafs() - n_leafs,
        "expanded forward graph"
    );
    Ok(())
}
