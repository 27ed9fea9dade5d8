//! Representation of graphs as well as
//! functionalities to build them from
//! simple building blocks and to switch
//! to the immutable sparse representation
//! the canonical labelling works on.
use std::fmt;

mod internal_graph;
pub use internal_graph::{Graph, GraphState, Vertex};

mod sparse_graph;
pub use sparse_graph::SparseGraph;

pub type Colour = usize;
pub type VertexIndex = usize;

pub const DEFAULT_COLOR: Colour = usize::MAX;

/// Largest order accepted when it is only declared, as in the size
/// headers of encodings and text input. The vertex arrays are allocated
/// before a single edge is read.
pub const MAX_DECLARED_ORDER: usize = 1 << 24;

pub fn check_declared_order(order: usize) -> Result<usize, GraphError> {
    if order > MAX_DECLARED_ORDER {
        Err(GraphError::new(
            "order",
            format!(
                "declared order {} exceeds the maximum of {}",
                order, MAX_DECLARED_ORDER
            ),
        ))
    } else {
        Ok(order)
    }
}

/// Violation of one of the structural invariants of a graph.
/// `field` names the offending input array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphError {
    pub field: &'static str,
    pub reason: String,
}

impl GraphError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        GraphError {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GraphError {
    #[cfg(not(tarpaulin_include))]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}
