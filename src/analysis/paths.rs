//! Path search over the mixed graph: directed, semi-directed, and
//! unrestricted simple paths, and treks.
//!
//! All searches are explicit-stack depth-first, with an optional caller
//! supplied bound on path length (number of edges). Enumeration is
//! worst-case exponential on dense graphs; callers needing bounded work
//! must pass a depth limit.

use crate::graph::{Edge, MixedGraph, NodeId};
use std::collections::HashSet;

/// True iff a directed path (every edge tail-to-arrow in travel direction)
/// of length >= 1 runs from `from` to `to`. `from == to` detects cycles.
pub fn exists_directed_path(graph: &MixedGraph, from: NodeId, to: NodeId) -> bool {
    let mut stack = vec![from];
    let mut seen: HashSet<NodeId> = HashSet::new();
    while let Some(node) = stack.pop() {
        for child in graph.children_of(node) {
            if child == to {
                return true;
            }
            if seen.insert(child) {
                stack.push(child);
            }
        }
    }
    false
}

/// All simple directed paths from `from` to `to`.
pub fn directed_paths(
    graph: &MixedGraph,
    from: NodeId,
    to: NodeId,
    max_length: Option<usize>,
) -> Vec<Vec<NodeId>> {
    enumerate_paths(graph, from, to, max_length, |_prev, at, next| {
        next.is_directed() && next.tail() == Some(at)
    })
}

/// True iff a path with no arrowhead against the travel direction runs
/// from `from` to `to`.
pub fn exists_semi_directed_path(graph: &MixedGraph, from: NodeId, to: NodeId) -> bool {
    let mut stack = vec![from];
    let mut seen: HashSet<NodeId> = HashSet::new();
    while let Some(node) = stack.pop() {
        for edge in graph.incident_edges(node) {
            if edge.points_into(node) {
                continue;
            }
            let next = match edge.traverse(node) {
                Some(next) => next,
                None => continue,
            };
            if next == to {
                return true;
            }
            if seen.insert(next) {
                stack.push(next);
            }
        }
    }
    false
}

/// All simple semi-directed paths: each step leaves the current node over
/// an endpoint that is not an arrow.
pub fn semi_directed_paths(
    graph: &MixedGraph,
    from: NodeId,
    to: NodeId,
    max_length: Option<usize>,
) -> Vec<Vec<NodeId>> {
    enumerate_paths(graph, from, to, max_length, |_prev, at, next| {
        !next.points_into(at)
    })
}

/// All simple paths regardless of orientation.
pub fn all_paths(
    graph: &MixedGraph,
    from: NodeId,
    to: NodeId,
    max_length: Option<usize>,
) -> Vec<Vec<NodeId>> {
    enumerate_paths(graph, from, to, max_length, |_prev, _at, _next| true)
}

/// All treks from `from` to `to`: paths traversable in either direction
/// that never pass through a definite collider (both adjacent path edges
/// pointing into the node).
pub fn treks(
    graph: &MixedGraph,
    from: NodeId,
    to: NodeId,
    max_length: Option<usize>,
) -> Vec<Vec<NodeId>> {
    enumerate_paths(graph, from, to, max_length, |prev, at, next| match prev {
        None => true,
        Some(prev) => !(prev.points_into(at) && next.points_into(at)),
    })
}

/// Trek existence by memoized state search over (node, entered-by-arrow):
/// polynomial, unlike full enumeration.
pub fn exists_trek(graph: &MixedGraph, from: NodeId, to: NodeId) -> bool {
    if from == to {
        return false;
    }
    let mut stack: Vec<(NodeId, bool)> = Vec::new();
    let mut seen: HashSet<(NodeId, bool)> = HashSet::new();
    for edge in graph.incident_edges(from) {
        if let Some(next) = edge.traverse(from) {
            if next == to {
                return true;
            }
            let state = (next, edge.points_into(next));
            if seen.insert(state) {
                stack.push(state);
            }
        }
    }
    while let Some((node, entered_by_arrow)) = stack.pop() {
        for edge in graph.incident_edges(node) {
            if entered_by_arrow && edge.points_into(node) {
                continue; // definite collider
            }
            let next = match edge.traverse(node) {
                Some(next) => next,
                None => continue,
            };
            if next == to {
                return true;
            }
            let state = (next, edge.points_into(next));
            if seen.insert(state) {
                stack.push(state);
            }
        }
    }
    false
}

/// Simple-path enumeration by iterative backtracking.
///
/// `allowed(prev, at, next)` decides whether the path may leave `at` over
/// `next`, given the edge `prev` it arrived by (`None` at the source).
/// The passability of the terminal node is never consulted.
pub(crate) fn enumerate_paths<F>(
    graph: &MixedGraph,
    from: NodeId,
    to: NodeId,
    max_length: Option<usize>,
    mut allowed: F,
) -> Vec<Vec<NodeId>>
where
    F: FnMut(Option<&Edge>, NodeId, &Edge) -> bool,
{
    struct Frame {
        node: NodeId,
        candidates: std::vec::IntoIter<Edge>,
    }

    if !graph.contains_node(from) || !graph.contains_node(to) {
        return Vec::new();
    }

    let mut found: Vec<Vec<NodeId>> = Vec::new();
    let mut path_nodes: Vec<NodeId> = vec![from];
    let mut path_edges: Vec<Edge> = Vec::new();
    let mut in_path: HashSet<NodeId> = HashSet::from([from]);
    let mut stack = vec![Frame {
        node: from,
        candidates: graph.incident_edges(from).into_iter(),
    }];

    while let Some(frame) = stack.last_mut() {
        let at = frame.node;
        let edge = match frame.candidates.next() {
            Some(edge) => edge,
            None => {
                stack.pop();
                if path_edges.pop().is_some() {
                    let left = path_nodes.pop().unwrap();
                    in_path.remove(&left);
                }
                continue;
            }
        };
        let next = match edge.traverse(at) {
            Some(next) => next,
            None => continue,
        };
        if in_path.contains(&next) {
            continue;
        }
        if let Some(limit) = max_length {
            if path_edges.len() + 1 > limit {
                continue;
            }
        }
        if !allowed(path_edges.last(), at, &edge) {
            continue;
        }
        if next == to {
            let mut path = path_nodes.clone();
            path.push(to);
            found.push(path);
            continue;
        }
        path_nodes.push(next);
        path_edges.push(edge);
        in_path.insert(next);
        stack.push(Frame {
            node: next,
            candidates: graph.incident_edges(next).into_iter(),
        });
    }
    found
}
