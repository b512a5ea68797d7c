//! Defines the core data structures for causal graphs: nodes, endpoint-typed
//! edges, the general mixed graph, and its DAG / structural-equation
//! specializations.
pub mod constraints;
pub mod dag;
pub mod edge;
pub mod node;
pub mod sem;
pub mod storage;
pub mod triple;

// Re-export key types for convenient access
pub use constraints::GraphConstraint;
pub use dag::Dag;
pub use edge::{Edge, Endpoint};
pub use node::{Node, NodeId, NodeRole};
pub use sem::SemGraph;
pub use storage::{ChangeListener, GraphEvent, MixedGraph};
pub use triple::{NodePair, Triple};
