//! Defines the `Node` type and its role tag, representing a single variable
//! in a causal graph.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique, stable identifier for a node within one graph instance.
///
/// This is a type alias for `petgraph::graph::NodeIndex` to abstract the
/// underlying graph implementation. Indices are stable across node removal
/// but are only meaningful for the graph that issued them; cross-graph
/// references go by node name.
pub type NodeId = NodeIndex;

/// The role a variable plays in the causal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// An observed variable.
    Measured,
    /// An unobserved variable hypothesized by the model.
    Latent,
    /// A synthetic error term attached to an endogenous variable by the
    /// structural-equation wrapper. Never created by external callers.
    Error,
}

/// A variable in a causal graph: a unique name, a role tag, and display
/// coordinates carried for external layout use (never read by algorithms).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub role: NodeRole,
    pub center_x: i32,
    pub center_y: i32,
}

impl Node {
    pub fn new(name: impl Into<String>, role: NodeRole) -> Self {
        Self { name: name.into(), role, center_x: 0, center_y: 0 }
    }

    pub fn measured(name: impl Into<String>) -> Self {
        Self::new(name, NodeRole::Measured)
    }

    pub fn latent(name: impl Into<String>) -> Self {
        Self::new(name, NodeRole::Latent)
    }

    pub(crate) fn error(name: impl Into<String>) -> Self {
        Self::new(name, NodeRole::Error)
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.center_x = x;
        self.center_y = y;
        self
    }

    pub fn is_error(&self) -> bool {
        self.role == NodeRole::Error
    }
}

// Node identity is (name, role); display coordinates do not participate.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.role == other.role
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.role.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            NodeRole::Latent => write!(f, "({})", self.name),
            _ => write!(f, "{}", self.name),
        }
    }
}
