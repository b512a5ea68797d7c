//! Graph-comparison metrics: adjacency and orientation errors of a learned
//! candidate graph against a ground-truth reference.

use crate::error::GraphError;
use crate::graph::{Edge, Endpoint, MixedGraph};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An edge described by node names, so it survives outside the graph that
/// issued the node ids. Names are kept in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeRecord {
    pub node1: String,
    pub node2: String,
    pub end1: Endpoint,
    pub end2: Endpoint,
}

impl EdgeRecord {
    fn from_edge(graph: &MixedGraph, edge: &Edge) -> Self {
        let node1 = graph.name_of(edge.node1()).unwrap().to_owned();
        let node2 = graph.name_of(edge.node2()).unwrap().to_owned();
        if node1 <= node2 {
            Self { node1, node2, end1: edge.endpoint1(), end2: edge.endpoint2() }
        } else {
            Self { node1: node2, node2: node1, end1: edge.endpoint2(), end2: edge.endpoint1() }
        }
    }

    fn pair(&self) -> (String, String) {
        (self.node1.clone(), self.node2.clone())
    }

    fn arrow_at(&self, name: &str) -> bool {
        (self.node1 == name && self.end1 == Endpoint::Arrow)
            || (self.node2 == name && self.end2 == Endpoint::Arrow)
    }
}

impl fmt::Display for EdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = match self.end1 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        };
        let right = match self.end2 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        };
        write!(f, "{} {}-{} {}", self.node1, left, right, self.node2)
    }
}

/// The outcome of scoring a candidate graph against a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphComparison {
    /// Reference adjacencies with no edge of any kind in the candidate.
    pub adjacency_false_negatives: usize,
    /// Candidate adjacencies absent from the reference.
    pub adjacency_false_positives: usize,
    /// Arrowheads in the reference missing from the candidate, counted per
    /// endpoint.
    pub arrowhead_false_negatives: usize,
    /// Arrowheads in the candidate absent from the reference, per endpoint.
    pub arrowhead_false_positives: usize,
    /// Candidate edges on pairs the reference does not connect.
    pub edges_added: Vec<EdgeRecord>,
    /// Reference edges on pairs the candidate does not connect.
    pub edges_removed: Vec<EdgeRecord>,
    /// Pairs connected in both graphs but with different endpoint types,
    /// as (reference, candidate).
    pub edges_reoriented: Vec<(EdgeRecord, EdgeRecord)>,
}

/// Scores `candidate` against `reference`, pairing nodes strictly by name.
///
/// The node-name sets must coincide exactly; comparison never proceeds on
/// partial data.
pub fn compare(
    candidate: &MixedGraph,
    reference: &MixedGraph,
) -> Result<GraphComparison, GraphError> {
    let cand_names: BTreeSet<String> =
        candidate.nodes().iter().map(|&n| candidate.name_of(n).unwrap().to_owned()).collect();
    let ref_names: BTreeSet<String> =
        reference.nodes().iter().map(|&n| reference.name_of(n).unwrap().to_owned()).collect();
    if cand_names != ref_names {
        let only_cand: Vec<&String> = cand_names.difference(&ref_names).collect();
        let only_ref: Vec<&String> = ref_names.difference(&cand_names).collect();
        return Err(GraphError::NodeSetMismatch(format!(
            "only in candidate: {:?}, only in reference: {:?}",
            only_cand, only_ref
        )));
    }

    let by_pair = |graph: &MixedGraph| -> BTreeMap<(String, String), BTreeSet<EdgeRecord>> {
        let mut map: BTreeMap<(String, String), BTreeSet<EdgeRecord>> = BTreeMap::new();
        for edge in graph.edges() {
            let record = EdgeRecord::from_edge(graph, &edge);
            map.entry(record.pair()).or_default().insert(record);
        }
        map
    };
    let cand_pairs = by_pair(candidate);
    let ref_pairs = by_pair(reference);

    let mut comparison = GraphComparison::default();

    for (pair, edges) in &cand_pairs {
        if !ref_pairs.contains_key(pair) {
            comparison.adjacency_false_positives += 1;
            comparison.edges_added.extend(edges.iter().cloned());
        }
    }
    for (pair, edges) in &ref_pairs {
        if !cand_pairs.contains_key(pair) {
            comparison.adjacency_false_negatives += 1;
            comparison.edges_removed.extend(edges.iter().cloned());
        }
    }

    // Pairs adjacent in both graphs but carrying different endpoint types
    // are reorientations, recorded as (before, after).
    for (pair, ref_edges) in &ref_pairs {
        if let Some(cand_edges) = cand_pairs.get(pair) {
            if ref_edges != cand_edges {
                let before = ref_edges.iter().find(|e| !cand_edges.contains(*e));
                let after = cand_edges.iter().find(|e| !ref_edges.contains(*e));
                if let (Some(before), Some(after)) = (before, after) {
                    comparison
                        .edges_reoriented
                        .push((before.clone(), after.clone()));
                }
            }
        }
    }

    // Arrowhead errors per endpoint: every (pair, node) slot where one
    // graph shows an arrowhead the other lacks. A missing adjacency misses
    // all of its arrowheads.
    let mut pairs: BTreeSet<(String, String)> = cand_pairs.keys().cloned().collect();
    pairs.extend(ref_pairs.keys().cloned());
    for pair in pairs {
        let empty = BTreeSet::new();
        let cand_edges = cand_pairs.get(&pair).unwrap_or(&empty);
        let ref_edges = ref_pairs.get(&pair).unwrap_or(&empty);
        for name in [&pair.0, &pair.1] {
            let in_ref = ref_edges.iter().any(|e| e.arrow_at(name));
            let in_cand = cand_edges.iter().any(|e| e.arrow_at(name));
            if in_ref && !in_cand {
                comparison.arrowhead_false_negatives += 1;
            }
            if in_cand && !in_ref {
                comparison.arrowhead_false_positives += 1;
            }
        }
    }

    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn graph_with(edges: &[(&str, &str)]) -> MixedGraph {
        let mut g = MixedGraph::new();
        for name in ["A", "B", "C"] {
            g.add_node(Node::measured(name)).unwrap();
        }
        for (from, to) in edges {
            let f = g.node_by_name(from).unwrap();
            let t = g.node_by_name(to).unwrap();
            g.add_edge(Edge::directed(f, t)).unwrap();
        }
        g
    }

    #[test]
    fn test_self_comparison_is_clean() {
        let g = graph_with(&[("A", "B"), ("B", "C")]);
        let comparison = compare(&g, &g).unwrap();
        assert_eq!(comparison, GraphComparison::default());
    }

    #[test]
    fn test_added_removed_and_arrowheads() {
        let reference = graph_with(&[("A", "B"), ("B", "C")]);
        let candidate = graph_with(&[("A", "B"), ("A", "C")]);

        let comparison = compare(&candidate, &reference).unwrap();
        assert_eq!(comparison.adjacency_false_positives, 1, "A-C is spurious");
        assert_eq!(comparison.adjacency_false_negatives, 1, "B-C is missed");
        assert_eq!(comparison.arrowhead_false_negatives, 1, "arrow at C on B-C");
        assert_eq!(comparison.arrowhead_false_positives, 1, "arrow at C on A-C");
        assert_eq!(comparison.edges_added.len(), 1);
        assert_eq!(comparison.edges_removed.len(), 1);
        assert!(comparison.edges_reoriented.is_empty());
        assert_eq!(comparison.edges_added[0].to_string(), "A --> C");
        assert_eq!(comparison.edges_removed[0].to_string(), "B --> C");
    }

    #[test]
    fn test_reorientation_recorded_as_before_after() {
        let reference = graph_with(&[("A", "B")]);
        let candidate = graph_with(&[("B", "A")]);

        let comparison = compare(&candidate, &reference).unwrap();
        assert_eq!(comparison.adjacency_false_positives, 0);
        assert_eq!(comparison.adjacency_false_negatives, 0);
        assert_eq!(comparison.edges_reoriented.len(), 1);
        let (before, after) = &comparison.edges_reoriented[0];
        assert_eq!(before.to_string(), "A --> B");
        assert_eq!(after.to_string(), "A <-- B");
        // One arrowhead moved: B lost one, A gained one.
        assert_eq!(comparison.arrowhead_false_negatives, 1);
        assert_eq!(comparison.arrowhead_false_positives, 1);
    }

    #[test]
    fn test_mismatched_node_sets_refused() {
        let reference = graph_with(&[("A", "B")]);
        let mut candidate = graph_with(&[("A", "B")]);
        candidate.add_node(Node::measured("D")).unwrap();

        assert!(matches!(
            compare(&candidate, &reference),
            Err(GraphError::NodeSetMismatch(_))
        ));
    }
}
