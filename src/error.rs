//! Defines the error types shared by the graph containers and algorithms.

use thiserror::Error;

/// Errors raised by graph mutation, query, and comparison.
///
/// Recoverable constraint rejections (duplicate edge, would-be cycle, name
/// collision) are reported as `Ok(false)` from the mutating call, not as a
/// `GraphError`. An error here means the caller asked for something the
/// receiving graph cannot answer at all: malformed input, an operation that
/// is meaningless for the graph variant, or an ambiguous query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge or query referenced a node that is not in this graph.
    #[error("node '{0}' is not in the graph")]
    NodeNotInGraph(String),

    /// `edge_between` was asked for "the" edge of a pair connected by more
    /// than one edge. Use `edges_between` on multi-edge graphs.
    #[error("multiple edges connect '{node1}' and '{node2}'; use edges_between")]
    AmbiguousEdge { node1: String, node2: String },

    /// The operation is meaningless for this graph variant and fails fast.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A copy/convert constructor was given a source graph that violates the
    /// target variant's invariants (e.g. a cycle when converting to a DAG).
    #[error("cannot convert graph: {0}")]
    Conversion(String),

    /// Error nodes are maintained automatically by the structural-equation
    /// wrapper and may not be mutated from outside.
    #[error("error node '{0}' is managed automatically and cannot be mutated directly")]
    ErrorNodeManaged(String),

    /// Graph comparison requires both graphs to cover the same node names.
    #[error("graphs have mismatched node sets: {0}")]
    NodeSetMismatch(String),
}
