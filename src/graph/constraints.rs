//! Pluggable structural constraints consulted by a graph before committing a
//! mutation. Violating any active constraint rejects the mutation.

use super::edge::Edge;
use super::node::{Node, NodeRole};
use super::storage::MixedGraph;
use std::fmt;

/// A structural predicate over proposed node/edge additions.
///
/// Constraints are held by the graph and checked on every mutation while
/// enabled; a `false` verdict rejects the mutation without committing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphConstraint {
    /// Only measured and latent nodes may be added.
    MeasuredLatentOnly,
    /// At most one edge may connect any unordered node pair.
    AtMostOneEdgePerPair,
    /// No edge may connect a node to itself.
    NoSelfLoops,
    /// Only tail/arrow (directed) edges may be added.
    DirectedEdgesOnly,
}

impl GraphConstraint {
    pub fn permits_node(&self, _graph: &MixedGraph, node: &Node) -> bool {
        match self {
            GraphConstraint::MeasuredLatentOnly => {
                matches!(node.role, NodeRole::Measured | NodeRole::Latent)
            }
            _ => true,
        }
    }

    pub fn permits_edge(&self, graph: &MixedGraph, edge: &Edge) -> bool {
        match self {
            GraphConstraint::MeasuredLatentOnly => true,
            GraphConstraint::AtMostOneEdgePerPair => {
                graph.edges_between(edge.node1(), edge.node2()).is_empty()
            }
            GraphConstraint::NoSelfLoops => edge.node1() != edge.node2(),
            GraphConstraint::DirectedEdgesOnly => edge.is_directed(),
        }
    }
}

impl fmt::Display for GraphConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraphConstraint::MeasuredLatentOnly => "nodes must be measured or latent",
            GraphConstraint::AtMostOneEdgePerPair => "at most one edge per node pair",
            GraphConstraint::NoSelfLoops => "no self-loop edges",
            GraphConstraint::DirectedEdgesOnly => "directed edges only",
        };
        write!(f, "{}", s)
    }
}
