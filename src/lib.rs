//! Core data model and structural algorithms for causal graphs.
//!
//! A causal graph is a mixed graph over typed nodes (measured, latent,
//! error) whose edges carry an independently typed endpoint at each end
//! (tail, arrow, circle). This crate provides the shared data model used by
//! causal-structure-discovery procedures, the DAG and structural-equation
//! specializations with their invariant bookkeeping, and the path-search
//! and separation algorithms (d-connection, treks, tiers) those procedures
//! query, plus precision/recall metrics for scoring a learned graph
//! against ground truth.
//!
//! The crate is purely structural: no independence testing, scoring, or
//! parameter fitting lives here. Everything is single-threaded and
//! synchronous; one graph instance belongs to one search at a time.

pub mod analysis;
pub mod error;
pub mod graph;

pub use error::GraphError;
pub use graph::{
    ChangeListener, Dag, Edge, Endpoint, GraphConstraint, GraphEvent, MixedGraph, Node, NodeId,
    NodePair, NodeRole, SemGraph, Triple,
};
