//! Tier computation (topological layering) over general mixed graphs.
//!
//! The parent relation is derived per edge from its endpoints (tail at the
//! parent, arrow at the child), so this works on graphs that carry no
//! acyclicity guarantee. For DAG-backed graphs prefer `Dag::tiers`, which
//! never needs the fallback below.

use crate::graph::{MixedGraph, NodeId};
use std::collections::HashSet;

/// Layers the nodes so that every parent lies in a strictly earlier tier.
///
/// If a full pass over the remaining nodes places nothing (a cycle or a
/// latent dependency deadlock), one stuck node's unresolved parents and the
/// node itself are force-placed as a tier. That jumpstart is a heuristic
/// tie-break, not a formal guarantee of anything beyond termination: at
/// least one node is placed per round, so at most `node_count` rounds run.
pub fn tiers(graph: &MixedGraph) -> Vec<Vec<NodeId>> {
    let nodes = graph.nodes();
    let mut placed: HashSet<NodeId> = HashSet::new();
    let mut out: Vec<Vec<NodeId>> = Vec::new();
    while placed.len() < nodes.len() {
        let mut tier: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|n| !placed.contains(n))
            .filter(|n| graph.parents_of(*n).iter().all(|p| placed.contains(p)))
            .collect();
        if tier.is_empty() {
            let stuck = nodes.iter().copied().find(|n| !placed.contains(n)).unwrap();
            tier = graph
                .parents_of(stuck)
                .into_iter()
                .filter(|p| !placed.contains(p))
                .collect();
            tier.push(stuck);
        }
        placed.extend(tier.iter().copied());
        out.push(tier);
    }
    out
}

/// The tiers flattened into a single ordering.
pub fn tier_ordering(graph: &MixedGraph) -> Vec<NodeId> {
    tiers(graph).into_iter().flatten().collect()
}
