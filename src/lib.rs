//! A small lazy tensor engine.
//!
//! Operators are recorded as nodes of a computation graph instead of being
//! evaluated on the spot. A graph is linearized with
//! [`build_forward_expand`] and evaluated with [`graph_compute`], which splits
//! the work of every node across a configurable number of threads.
//!
//! ```
//! use ferrograph::{build_forward_expand, graph_compute, ops, Context, Graph};
//!
//! let mut ctx = Context::new();
//! let x = ctx.new_tensor_1d_with_data(3, &[1.0f32, 4.0, 9.0])?;
//! let y = ops::sqrt(&mut ctx, x)?;
//!
//! let mut graph = Graph::new(2)?;
//! build_forward_expand(&mut graph, &ctx, y)?;
//! graph_compute(&mut ctx, &graph)?;
//!
//! assert_eq!(ctx.data::<f32>(y)?, &[1.0, 2.0, 3.0]);
//! # Ok::<(), ferrograph::FerrographError>(())
//! ```

pub mod context;
pub mod dimension;
pub mod dtype;
pub mod error;
pub mod graph;
pub mod ops;
pub mod storage;
pub mod tensor;

pub use context::{Context, ContextConfig};
pub use dimension::Shape;
pub use dtype::{DType, Element, FloatElement};
pub use error::{FerrographError, Result};
pub use graph::{build_forward_expand, graph_compute, Graph};
pub use ops::Op;
pub use tensor::{Tensor, TensorId};
