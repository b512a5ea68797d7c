//! storage.rs
//! The general mixed-endpoint graph: node/edge arena, adjacency queries,
//! structural constraints, and triple bookkeeping for orientation algorithms.

use super::constraints::GraphConstraint;
use super::edge::{Edge, Endpoint};
use super::node::{Node, NodeId};
use super::triple::Triple;
use crate::error::GraphError;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A structural-change notification. Carries the mutated element for
/// convenience; observers must not rely on any richer contract than
/// "the graph changed".
#[derive(Debug, Clone)]
pub enum GraphEvent {
    NodeAdded(String),
    NodeRemoved(String),
    EdgeAdded(Edge),
    EdgeRemoved(Edge),
}

pub type ChangeListener = Box<dyn FnMut(&GraphEvent)>;

/// A mutable mixed graph over typed nodes and endpoint-typed edges.
///
/// Storage is a `petgraph` stable arena (indices survive removals) with a
/// name index on top; an edge is stored once in arbitrary orientation and
/// all queries treat it as unordered. Structural constraints are consulted
/// before committing a mutation and can be globally disabled for bulk
/// construction.
pub struct MixedGraph {
    store: StableDiGraph<Node, (Endpoint, Endpoint)>,
    names: HashMap<String, NodeId>,
    allow_multiple_edges: bool,
    constraints: Vec<GraphConstraint>,
    constraints_enabled: bool,
    ambiguous_triples: HashSet<Triple>,
    underline_triples: HashSet<Triple>,
    dotted_underline_triples: HashSet<Triple>,
    listeners: Vec<ChangeListener>,
}

impl MixedGraph {
    /// An empty graph with the single-edge-per-pair policy.
    pub fn new() -> Self {
        Self::with_policy(false)
    }

    /// An empty graph permitting multiple edges per node pair.
    pub fn new_multi() -> Self {
        Self::with_policy(true)
    }

    fn with_policy(allow_multiple_edges: bool) -> Self {
        Self {
            store: StableDiGraph::default(),
            names: HashMap::new(),
            allow_multiple_edges,
            constraints: vec![GraphConstraint::NoSelfLoops],
            constraints_enabled: true,
            ambiguous_triples: HashSet::new(),
            underline_triples: HashSet::new(),
            dotted_underline_triples: HashSet::new(),
            listeners: Vec::new(),
        }
    }

    /// An empty single-edge graph over the given nodes. Fails on a
    /// duplicate node name rather than silently dropping the node.
    pub fn with_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            let name = node.name.clone();
            if graph.add_node(node)?.is_none() {
                return Err(GraphError::Conversion(format!(
                    "duplicate node name '{}'",
                    name
                )));
            }
        }
        Ok(graph)
    }

    /// Copy constructor: same nodes, edges, policy, and constraints.
    /// Listeners are not carried over.
    pub fn from_graph(other: &MixedGraph) -> Self {
        let mut graph = Self::with_policy(other.allow_multiple_edges);
        graph.constraints = other.constraints.clone();
        graph.constraints_enabled = false;
        for id in other.nodes() {
            let node = other.node(id).cloned().unwrap();
            graph.add_node(node).unwrap();
        }
        for edge in other.edges() {
            graph.add_edge(other.rekey(&graph, edge)).unwrap();
        }
        graph.constraints_enabled = other.constraints_enabled;
        graph
    }

    // Translate an edge of `self` into the id space of `target` by name.
    fn rekey(&self, target: &MixedGraph, edge: Edge) -> Edge {
        let n1 = target.node_by_name(&self.store[edge.node1()].name).unwrap();
        let n2 = target.node_by_name(&self.store[edge.node2()].name).unwrap();
        Edge::new(n1, n2, edge.endpoint1(), edge.endpoint2())
    }

    // --- Nodes ---

    /// Adds a node, returning its id, or `Ok(None)` if the mutation was
    /// rejected (duplicate name, or an active constraint said no).
    pub fn add_node(&mut self, node: Node) -> Result<Option<NodeId>, GraphError> {
        if self.names.contains_key(&node.name) {
            return Ok(None);
        }
        if self.constraints_enabled {
            for constraint in &self.constraints {
                if !constraint.permits_node(self, &node) {
                    return Ok(None);
                }
            }
        }
        let name = node.name.clone();
        let id = self.store.add_node(node);
        self.names.insert(name.clone(), id);
        self.notify(GraphEvent::NodeAdded(name));
        Ok(Some(id))
    }

    /// Removes a node and all incident edges. Returns false if absent.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if !self.store.contains_node(node) {
            return false;
        }
        let incident: Vec<Edge> = self.incident_edges(node);
        for edge in &incident {
            self.remove_edge(edge);
        }
        self.ambiguous_triples.retain(|t| !t.contains(node));
        self.underline_triples.retain(|t| !t.contains(node));
        self.dotted_underline_triples.retain(|t| !t.contains(node));
        let removed = self.store.remove_node(node).unwrap();
        self.names.remove(&removed.name);
        self.notify(GraphEvent::NodeRemoved(removed.name));
        true
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.store.contains_node(node)
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.store.node_weight(node)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, node: NodeId) -> Option<&str> {
        self.store.node_weight(node).map(|n| n.name.as_str())
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.store.node_indices().collect()
    }

    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    // --- Edges ---

    /// Adds an edge. Returns `Ok(false)` if an equal edge already exists,
    /// the pair is already connected under the single-edge policy, or an
    /// active constraint rejects it. Both endpoints must be in the graph.
    pub fn add_edge(&mut self, edge: Edge) -> Result<bool, GraphError> {
        self.require_node(edge.node1())?;
        self.require_node(edge.node2())?;
        if self.contains_edge(&edge) {
            return Ok(false);
        }
        if !self.allow_multiple_edges
            && edge.node1() != edge.node2()
            && !self.edges_between(edge.node1(), edge.node2()).is_empty()
        {
            return Ok(false);
        }
        if self.constraints_enabled {
            for constraint in &self.constraints {
                if !constraint.permits_edge(self, &edge) {
                    return Ok(false);
                }
            }
        }
        self.store
            .add_edge(edge.node1(), edge.node2(), (edge.endpoint1(), edge.endpoint2()));
        self.notify(GraphEvent::EdgeAdded(edge));
        Ok(true)
    }

    /// Removes the edge equal to `edge`. Returns false if absent.
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        let (a, b) = (edge.node1(), edge.node2());
        let mut found = None;
        for e in self.store.edges_connecting(a, b) {
            if Edge::new(a, b, e.weight().0, e.weight().1) == *edge {
                found = Some(e.id());
                break;
            }
        }
        if found.is_none() && a != b {
            for e in self.store.edges_connecting(b, a) {
                if Edge::new(b, a, e.weight().0, e.weight().1) == *edge {
                    found = Some(e.id());
                    break;
                }
            }
        }
        match found {
            Some(id) => {
                self.store.remove_edge(id);
                self.notify(GraphEvent::EdgeRemoved(*edge));
                true
            }
            None => false,
        }
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges_between(edge.node1(), edge.node2())
            .iter()
            .any(|e| e == edge)
    }

    /// All edges connecting the unordered pair `(a, b)`.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> SmallVec<[Edge; 2]> {
        let mut edges = SmallVec::new();
        for e in self.store.edges_connecting(a, b) {
            edges.push(Edge::new(a, b, e.weight().0, e.weight().1));
        }
        if a != b {
            for e in self.store.edges_connecting(b, a) {
                edges.push(Edge::new(b, a, e.weight().0, e.weight().1));
            }
        }
        edges
    }

    /// The single edge connecting `(a, b)`, if any. Fails on multi-edge
    /// pairs, which must be queried with [`edges_between`](Self::edges_between).
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Result<Option<Edge>, GraphError> {
        let edges = self.edges_between(a, b);
        match edges.len() {
            0 => Ok(None),
            1 => Ok(Some(edges[0])),
            _ => Err(GraphError::AmbiguousEdge {
                node1: self.display_name(a),
                node2: self.display_name(b),
            }),
        }
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.store
            .edge_references()
            .map(|e| Edge::new(e.source(), e.target(), e.weight().0, e.weight().1))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    /// All edges with `node` at either end.
    pub fn incident_edges(&self, node: NodeId) -> Vec<Edge> {
        let mut edges = Vec::new();
        for e in self.store.edges_directed(node, Direction::Outgoing) {
            edges.push(Edge::new(e.source(), e.target(), e.weight().0, e.weight().1));
        }
        for e in self.store.edges_directed(node, Direction::Incoming) {
            if e.source() != e.target() {
                edges.push(Edge::new(e.source(), e.target(), e.weight().0, e.weight().1));
            }
        }
        edges
    }

    // --- Adjacency / endpoint queries ---

    pub fn adjacent_to(&self, node: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.incident_edges(node)
            .into_iter()
            .filter_map(|e| e.traverse(node))
            .filter(|n| seen.insert(*n))
            .collect()
    }

    pub fn is_adjacent_to(&self, a: NodeId, b: NodeId) -> bool {
        !self.edges_between(a, b).is_empty()
    }

    /// Nodes `x` such that some edge has a tail at `x` and an arrow at
    /// `node`; parenthood is an endpoint pairing, not stored direction.
    pub fn parents_of(&self, node: NodeId) -> Vec<NodeId> {
        self.incident_edges(node)
            .into_iter()
            .filter(|e| {
                e.proximal_endpoint(node) == Some(Endpoint::Arrow)
                    && e.distal_endpoint(node) == Some(Endpoint::Tail)
            })
            .filter_map(|e| e.traverse(node))
            .collect()
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.incident_edges(node)
            .into_iter()
            .filter(|e| {
                e.proximal_endpoint(node) == Some(Endpoint::Tail)
                    && e.distal_endpoint(node) == Some(Endpoint::Arrow)
            })
            .filter_map(|e| e.traverse(node))
            .collect()
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.parents_of(node).len()
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.children_of(node).len()
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.incident_edges(node).len()
    }

    /// The maximum degree over all nodes.
    pub fn connectivity(&self) -> usize {
        self.nodes()
            .into_iter()
            .map(|n| self.degree(n))
            .max()
            .unwrap_or(0)
    }

    // --- Whole-graph rebuild operations ---
    //
    // These bypass per-edge constraints: they express "replace the edge set
    // wholesale", which variant wrappers (Dag) reject outright.

    /// Removes every edge, then connects every node pair with an edge
    /// carrying `endpoint` at both ends.
    pub fn fully_connect(&mut self, endpoint: Endpoint) {
        for edge in self.edges() {
            self.remove_edge(&edge);
        }
        let nodes = self.nodes();
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                self.store.add_edge(a, b, (endpoint, endpoint));
                self.notify(GraphEvent::EdgeAdded(Edge::new(a, b, endpoint, endpoint)));
            }
        }
    }

    /// Rewrites both endpoints of every edge to `endpoint`.
    pub fn reorient_all_with(&mut self, endpoint: Endpoint) {
        let ids: Vec<_> = self.store.edge_indices().collect();
        for id in ids {
            let (a, b) = self.store.edge_endpoints(id).unwrap();
            let old = *self.store.edge_weight(id).unwrap();
            if old == (endpoint, endpoint) {
                continue;
            }
            *self.store.edge_weight_mut(id).unwrap() = (endpoint, endpoint);
            self.notify(GraphEvent::EdgeRemoved(Edge::new(a, b, old.0, old.1)));
            self.notify(GraphEvent::EdgeAdded(Edge::new(a, b, endpoint, endpoint)));
        }
    }

    /// The subgraph induced by `nodes`: those nodes and every edge with
    /// both ends among them.
    pub fn subgraph(&self, nodes: &[NodeId]) -> MixedGraph {
        let keep: HashSet<NodeId> = nodes.iter().copied().collect();
        let mut sub = Self::with_policy(self.allow_multiple_edges);
        sub.constraints = self.constraints.clone();
        sub.constraints_enabled = false;
        for &id in nodes {
            if let Some(node) = self.node(id) {
                sub.add_node(node.clone()).unwrap();
            }
        }
        for edge in self.edges() {
            if keep.contains(&edge.node1()) && keep.contains(&edge.node2()) {
                sub.add_edge(self.rekey(&sub, edge)).unwrap();
            }
        }
        sub.constraints_enabled = self.constraints_enabled;
        sub
    }

    // --- Constraints ---

    pub fn add_constraint(&mut self, constraint: GraphConstraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn constraints(&self) -> &[GraphConstraint] {
        &self.constraints
    }

    /// Globally enables or disables constraint checking. Mutations made
    /// while disabled are not validated (bulk-construction mode).
    pub fn set_constraints_enabled(&mut self, enabled: bool) {
        self.constraints_enabled = enabled;
    }

    pub fn constraints_enabled(&self) -> bool {
        self.constraints_enabled
    }

    pub fn allows_multiple_edges(&self) -> bool {
        self.allow_multiple_edges
    }

    // --- Triple bookkeeping for orientation algorithms ---

    pub fn add_ambiguous_triple(&mut self, triple: Triple) {
        self.ambiguous_triples.insert(triple);
    }

    pub fn remove_ambiguous_triple(&mut self, triple: &Triple) -> bool {
        self.ambiguous_triples.remove(triple)
    }

    pub fn is_ambiguous_triple(&self, triple: &Triple) -> bool {
        self.ambiguous_triples.contains(triple)
    }

    pub fn ambiguous_triples(&self) -> &HashSet<Triple> {
        &self.ambiguous_triples
    }

    pub fn add_underline_triple(&mut self, triple: Triple) {
        self.underline_triples.insert(triple);
    }

    pub fn remove_underline_triple(&mut self, triple: &Triple) -> bool {
        self.underline_triples.remove(triple)
    }

    pub fn is_underline_triple(&self, triple: &Triple) -> bool {
        self.underline_triples.contains(triple)
    }

    pub fn underline_triples(&self) -> &HashSet<Triple> {
        &self.underline_triples
    }

    pub fn add_dotted_underline_triple(&mut self, triple: Triple) {
        self.dotted_underline_triples.insert(triple);
    }

    pub fn remove_dotted_underline_triple(&mut self, triple: &Triple) -> bool {
        self.dotted_underline_triples.remove(triple)
    }

    pub fn is_dotted_underline_triple(&self, triple: &Triple) -> bool {
        self.dotted_underline_triples.contains(triple)
    }

    pub fn dotted_underline_triples(&self) -> &HashSet<Triple> {
        &self.dotted_underline_triples
    }

    // --- Listeners ---

    /// Registers a structural-change observer. Observers fire after every
    /// committed mutation.
    pub fn add_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, event: GraphEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // --- Helpers ---

    fn require_node(&self, node: NodeId) -> Result<(), GraphError> {
        if self.store.contains_node(node) {
            Ok(())
        } else {
            Err(GraphError::NodeNotInGraph(format!("#{}", node.index())))
        }
    }

    fn display_name(&self, node: NodeId) -> String {
        self.name_of(node)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("#{}", node.index()))
    }

    /// Renders an edge with endpoint glyphs, e.g. `A --> B`, `A <-> B`.
    pub fn edge_to_string(&self, edge: &Edge) -> String {
        let left = match edge.endpoint1() {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        };
        let right = match edge.endpoint2() {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        };
        format!(
            "{} {}-{} {}",
            self.display_name(edge.node1()),
            left,
            right,
            self.display_name(edge.node2())
        )
    }
}

impl Default for MixedGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MixedGraph {
    fn clone(&self) -> Self {
        let copy = Self::from_graph(self);
        // Node ids are re-issued by the copy, so recorded triples must be
        // translated through the name index.
        let remap = |triples: &HashSet<Triple>| -> HashSet<Triple> {
            triples
                .iter()
                .map(|t| {
                    let m = |id: NodeId| copy.node_by_name(&self.store[id].name).unwrap();
                    Triple::new(m(t.x()), m(t.y()), m(t.z()))
                })
                .collect()
        };
        let ambiguous = remap(&self.ambiguous_triples);
        let underline = remap(&self.underline_triples);
        let dotted = remap(&self.dotted_underline_triples);
        let mut copy = copy;
        copy.ambiguous_triples = ambiguous;
        copy.underline_triples = underline;
        copy.dotted_underline_triples = dotted;
        copy
    }
}

impl fmt::Debug for MixedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixedGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("allow_multiple_edges", &self.allow_multiple_edges)
            .finish()
    }
}

impl fmt::Display for MixedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.edges().iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, self.edge_to_string(edge))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn three_nodes() -> (MixedGraph, NodeId, NodeId, NodeId) {
        let mut g = MixedGraph::new();
        let x = g.add_node(Node::measured("X")).unwrap().unwrap();
        let y = g.add_node(Node::measured("Y")).unwrap().unwrap();
        let z = g.add_node(Node::measured("Z")).unwrap().unwrap();
        (g, x, y, z)
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut g = MixedGraph::new();
        assert!(g.add_node(Node::measured("X")).unwrap().is_some());
        assert!(g.add_node(Node::latent("X")).unwrap().is_none());
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_add_and_remove_edge() {
        let (mut g, x, y, _) = three_nodes();
        let e = Edge::directed(x, y);
        assert!(g.add_edge(e).unwrap());
        assert!(!g.add_edge(e).unwrap(), "equal edge must be rejected");
        assert!(g.contains_edge(&e.reversed()));

        assert!(g.remove_edge(&e));
        assert!(!g.remove_edge(&e));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_single_edge_policy() {
        let (mut g, x, y, _) = three_nodes();
        assert!(g.add_edge(Edge::directed(x, y)).unwrap());
        assert!(!g.add_edge(Edge::bidirected(x, y)).unwrap());

        let mut multi = MixedGraph::new_multi();
        let a = multi.add_node(Node::measured("A")).unwrap().unwrap();
        let b = multi.add_node(Node::measured("B")).unwrap().unwrap();
        assert!(multi.add_edge(Edge::directed(a, b)).unwrap());
        assert!(multi.add_edge(Edge::bidirected(a, b)).unwrap());
        assert_eq!(multi.edges_between(a, b).len(), 2);
    }

    #[test]
    fn test_edge_between_ambiguity() {
        let mut g = MixedGraph::new_multi();
        let a = g.add_node(Node::measured("A")).unwrap().unwrap();
        let b = g.add_node(Node::measured("B")).unwrap().unwrap();
        g.add_edge(Edge::directed(a, b)).unwrap();
        assert_eq!(g.edge_between(a, b).unwrap(), Some(Edge::directed(a, b)));

        g.add_edge(Edge::bidirected(a, b)).unwrap();
        assert!(matches!(
            g.edge_between(a, b),
            Err(GraphError::AmbiguousEdge { .. })
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        let (mut g, x, _, _) = three_nodes();
        assert!(!g.add_edge(Edge::directed(x, x)).unwrap());
    }

    #[test]
    fn test_edge_to_missing_node_is_error() {
        let (mut g, x, _, z) = three_nodes();
        g.remove_node(z);
        assert!(matches!(
            g.add_edge(Edge::directed(x, z)),
            Err(GraphError::NodeNotInGraph(_))
        ));
    }

    #[test]
    fn test_parents_children_degrees() {
        let (mut g, x, y, z) = three_nodes();
        g.add_edge(Edge::directed(x, y)).unwrap();
        g.add_edge(Edge::directed(z, y)).unwrap();

        assert_eq!(g.children_of(x), vec![y]);
        let mut parents = g.parents_of(y);
        parents.sort();
        let mut expected = vec![x, z];
        expected.sort();
        assert_eq!(parents, expected);
        assert_eq!(g.in_degree(y), 2);
        assert_eq!(g.out_degree(y), 0);
        assert_eq!(g.degree(y), 2);
        assert_eq!(g.connectivity(), 2);
    }

    #[test]
    fn test_bidirected_edge_is_not_parenthood() {
        let (mut g, x, y, _) = three_nodes();
        g.add_edge(Edge::bidirected(x, y)).unwrap();
        assert!(g.parents_of(y).is_empty());
        assert!(g.children_of(x).is_empty());
        assert!(g.is_adjacent_to(x, y));
    }

    #[test]
    fn test_remove_node_cascades() {
        let (mut g, x, y, z) = three_nodes();
        g.add_edge(Edge::directed(x, y)).unwrap();
        g.add_edge(Edge::directed(y, z)).unwrap();
        g.add_ambiguous_triple(Triple::new(x, y, z));

        assert!(g.remove_node(y));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert!(g.ambiguous_triples().is_empty());
        assert!(g.node_by_name("Y").is_none());
    }

    #[test]
    fn test_constraint_toggle() {
        let mut g = MixedGraph::new();
        g.add_constraint(GraphConstraint::DirectedEdgesOnly);
        let a = g.add_node(Node::measured("A")).unwrap().unwrap();
        let b = g.add_node(Node::measured("B")).unwrap().unwrap();

        assert!(!g.add_edge(Edge::bidirected(a, b)).unwrap());
        g.set_constraints_enabled(false);
        assert!(g.add_edge(Edge::bidirected(a, b)).unwrap());
        g.set_constraints_enabled(true);
        assert!(!g.add_edge(Edge::nondirected(a, b)).unwrap());
    }

    #[test]
    fn test_fully_connect_and_reorient() {
        let (mut g, x, y, z) = three_nodes();
        g.add_edge(Edge::directed(x, y)).unwrap();
        g.fully_connect(Endpoint::Circle);
        assert_eq!(g.edge_count(), 3);
        for edge in g.edges() {
            assert_eq!(edge.endpoint1(), Endpoint::Circle);
            assert_eq!(edge.endpoint2(), Endpoint::Circle);
        }

        g.reorient_all_with(Endpoint::Tail);
        assert!(g.edges().iter().all(|e| {
            e.endpoint1() == Endpoint::Tail && e.endpoint2() == Endpoint::Tail
        }));
        let _ = z;
    }

    #[test]
    fn test_subgraph_is_induced() {
        let (mut g, x, y, z) = three_nodes();
        g.add_edge(Edge::directed(x, y)).unwrap();
        g.add_edge(Edge::directed(y, z)).unwrap();

        let sub = g.subgraph(&[x, y]);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        let sx = sub.node_by_name("X").unwrap();
        let sy = sub.node_by_name("Y").unwrap();
        assert!(sub.contains_edge(&Edge::directed(sx, sy)));
    }

    #[test]
    fn test_listener_fires_on_mutation() {
        let (mut g, x, y, _) = three_nodes();
        let count = Rc::new(RefCell::new(0usize));
        let seen = count.clone();
        g.add_listener(Box::new(move |_event| {
            *seen.borrow_mut() += 1;
        }));

        g.add_edge(Edge::directed(x, y)).unwrap();
        g.remove_edge(&Edge::directed(x, y));
        g.remove_node(x);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_copy_constructor_preserves_structure() {
        let (mut g, x, y, z) = three_nodes();
        g.add_edge(Edge::directed(x, y)).unwrap();
        g.add_edge(Edge::bidirected(y, z)).unwrap();

        let copy = MixedGraph::from_graph(&g);
        assert_eq!(copy.node_count(), 3);
        assert_eq!(copy.edge_count(), 2);
        let cy = copy.node_by_name("Y").unwrap();
        let cz = copy.node_by_name("Z").unwrap();
        assert!(copy.contains_edge(&Edge::bidirected(cy, cz)));
    }
}
