//! Defines the `Edge` type: an unordered pair of nodes with an independently
//! typed endpoint at each end.

use super::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The marker at one end of an edge where it meets a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// A plain end (no mark).
    Tail,
    /// A causal head pointing into the adjacent node.
    Arrow,
    /// Orientation unknown.
    Circle,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Endpoint::Tail => "-",
            Endpoint::Arrow => ">",
            Endpoint::Circle => "o",
        };
        write!(f, "{}", s)
    }
}

/// An edge between two distinct nodes, with one endpoint proximal to each.
///
/// Edge identity is direction-sensitive but not direction-ordered:
/// `(a, b, e1, e2)` and `(b, a, e2, e1)` denote the same edge, and the
/// `PartialEq`/`Hash` implementations respect that symmetry. Node ids are
/// local to the issuing graph, so an `Edge` is not serialized; comparison
/// reports use name-keyed records instead.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    node1: NodeId,
    node2: NodeId,
    end1: Endpoint,
    end2: Endpoint,
}

impl Edge {
    pub fn new(node1: NodeId, node2: NodeId, end1: Endpoint, end2: Endpoint) -> Self {
        Self { node1, node2, end1, end2 }
    }

    /// `a --> b`: tail at `a`, arrow at `b`.
    pub fn directed(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Arrow)
    }

    /// `a <-> b`: arrowheads at both ends (correlated errors).
    pub fn bidirected(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Arrow, Endpoint::Arrow)
    }

    /// `a --- b`: tails at both ends.
    pub fn undirected(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// `a o-o b`: circles at both ends.
    pub fn nondirected(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    /// `a o-> b`: circle at `a`, arrow at `b`.
    pub fn partially_oriented(a: NodeId, b: NodeId) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Arrow)
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn node2(&self) -> NodeId {
        self.node2
    }

    pub fn endpoint1(&self) -> Endpoint {
        self.end1
    }

    pub fn endpoint2(&self) -> Endpoint {
        self.end2
    }

    /// The endpoint at `node`'s end of this edge, if `node` is an endpoint.
    pub fn proximal_endpoint(&self, node: NodeId) -> Option<Endpoint> {
        if node == self.node1 {
            Some(self.end1)
        } else if node == self.node2 {
            Some(self.end2)
        } else {
            None
        }
    }

    /// The endpoint at the far end of this edge, seen from `node`.
    pub fn distal_endpoint(&self, node: NodeId) -> Option<Endpoint> {
        if node == self.node1 {
            Some(self.end2)
        } else if node == self.node2 {
            Some(self.end1)
        } else {
            None
        }
    }

    /// The node at the far end of this edge, seen from `node`.
    pub fn traverse(&self, node: NodeId) -> Option<NodeId> {
        if node == self.node1 {
            Some(self.node2)
        } else if node == self.node2 {
            Some(self.node1)
        } else {
            None
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        node == self.node1 || node == self.node2
    }

    /// True iff one endpoint is a tail and the other an arrow.
    pub fn is_directed(&self) -> bool {
        matches!(
            (self.end1, self.end2),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    pub fn is_bidirected(&self) -> bool {
        self.end1 == Endpoint::Arrow && self.end2 == Endpoint::Arrow
    }

    /// True iff this edge has an arrowhead at `node`'s end.
    pub fn points_into(&self, node: NodeId) -> bool {
        self.proximal_endpoint(node) == Some(Endpoint::Arrow)
    }

    /// For a directed edge, the node at the tail end.
    pub fn tail(&self) -> Option<NodeId> {
        match (self.end1, self.end2) {
            (Endpoint::Tail, Endpoint::Arrow) => Some(self.node1),
            (Endpoint::Arrow, Endpoint::Tail) => Some(self.node2),
            _ => None,
        }
    }

    /// For a directed edge, the node at the arrow end.
    pub fn head(&self) -> Option<NodeId> {
        match (self.end1, self.end2) {
            (Endpoint::Tail, Endpoint::Arrow) => Some(self.node2),
            (Endpoint::Arrow, Endpoint::Tail) => Some(self.node1),
            _ => None,
        }
    }

    /// The edge with both ends swapped. Equal to `self` under edge identity.
    pub fn reversed(&self) -> Self {
        Self::new(self.node2, self.node1, self.end2, self.end1)
    }

    // The (node, endpoint) pairs in a canonical order, for Eq/Hash.
    fn canonical(&self) -> ((NodeId, Endpoint), (NodeId, Endpoint)) {
        let a = (self.node1, self.end1);
        let b = (self.node2, self.end2);
        if (self.node1.index(), self.end1 as u8) <= (self.node2.index(), self.end2 as u8) {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}
