//! Forward computation graphs.
//!
//! A [`Graph`] is a linear, dependency-respecting list of the tensors reachable
//! from one or more roots. It is filled by [`build_forward_expand`] and
//! evaluated by [`graph_compute`].

mod builder;
mod compute;

pub use builder::build_forward_expand;
pub use compute::graph_compute;

use std::collections::HashSet;

use crate::{
    error::{FerrographError, Result},
    tensor::TensorId,
};

/// An ordered set of tensors to evaluate.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Tensors with a producing operator, operands first.
    pub(crate) nodes: Vec<TensorId>,
    /// Tensors without a producing operator.
    pub(crate) leafs: Vec<TensorId>,
    pub(crate) threads_count: usize,
    visited: HashSet<TensorId>,
}

impl Graph {
    /// Creates an empty graph evaluated with `threads_count` workers.
    ///
    /// # Errors
    ///
    /// Returns an error if `threads_count` is zero.
    pub fn new(threads_count: usize) -> Result<Self> {
        if threads_count == 0 {
            return Err(FerrographError::invalid_input(
                "threads_count must be at least 1",
            ));
        }
        Ok(Self {
            nodes: Vec::new(),
            leafs: Vec::new(),
            threads_count,
            visited: HashSet::new(),
        })
    }

    /// Creates an empty graph that evaluates sequentially.
    pub fn sequential() -> Self {
        Self {
            nodes: Vec::new(),
            leafs: Vec::new(),
            threads_count: 1,
            visited: HashSet::new(),
        }
    }

    pub fn nodes(&self) -> &[TensorId] {
        &self.nodes
    }

    pub fn leafs(&self) -> &[TensorId] {
        &self.leafs
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leafs(&self) -> usize {
        self.leafs.len()
    }

    pub fn threads_count(&self) -> usize {
        self.threads_count
    }

    /// Returns `true` if `id` is already a node or leaf of this graph.
    pub fn contains(&self, id: TensorId) -> bool {
        self.visited.contains(&id)
    }

    /// Removes all nodes and leafs, keeping the thread count.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.leafs.clear();
        self.visited.clear();
    }

    /// Records `id` as visited. Returns `false` if it already was.
    pub(crate) fn mark(&mut self, id: TensorId) -> bool {
        self.visited.insert(id)
    }
}
