//! sem.rs
//! The structural-equation specialization: wraps a multi-edge `MixedGraph`,
//! permits only directed and bidirected edges, and keeps a synthetic error
//! parent attached to every endogenous node as edges come and go.

use super::edge::Edge;
use super::node::{Node, NodeId};
use super::storage::{ChangeListener, MixedGraph};
use crate::error::GraphError;
use std::collections::HashMap;

/// A graph for structural-equation models.
///
/// Error nodes are pure derived structure: they are created, renamed, and
/// removed only as a side effect of directed-edge mutation on their owner
/// node, and external callers may not touch them directly. Bidirected
/// (correlated-error) edges are kept attached to each endpoint's exogenous
/// representative: the node itself while error terms are hidden or the node
/// is exogenous, its error node otherwise.
pub struct SemGraph {
    graph: MixedGraph,
    // owner node -> its error node, and the reverse.
    error_nodes: HashMap<NodeId, NodeId>,
    owners: HashMap<NodeId, NodeId>,
    shows_error_terms: bool,
    // Error-node display positions survive show/hide toggles.
    remembered_positions: HashMap<String, (i32, i32)>,
}

impl SemGraph {
    pub fn new() -> Self {
        Self {
            graph: MixedGraph::new_multi(),
            error_nodes: HashMap::new(),
            owners: HashMap::new(),
            shows_error_terms: false,
            remembered_positions: HashMap::new(),
        }
    }

    /// A SemGraph over the given nodes and no edges. Fails on a duplicate
    /// node name rather than silently dropping the node.
    pub fn with_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let mut sem = Self::new();
        for node in nodes {
            let name = node.name.clone();
            if sem.add_node(node)?.is_none() {
                return Err(GraphError::Conversion(format!(
                    "duplicate node name '{}'",
                    name
                )));
            }
        }
        Ok(sem)
    }

    /// Converts a general graph. Fails if the source holds an edge kind a
    /// SEM graph cannot represent.
    pub fn try_from_graph(source: &MixedGraph) -> Result<Self, GraphError> {
        let mut sem = Self::new();
        for id in source.nodes() {
            let node = source.node(id).cloned().unwrap();
            if node.is_error() {
                return Err(GraphError::Conversion(format!(
                    "source carries an error node '{}'",
                    node.name
                )));
            }
            sem.add_node(node)?;
        }
        for edge in source.edges() {
            if !edge.is_directed() && !edge.is_bidirected() {
                return Err(GraphError::Conversion(format!(
                    "edge {} is neither directed nor bidirected",
                    source.edge_to_string(&edge)
                )));
            }
            let n1 = sem.node_by_name(source.name_of(edge.node1()).unwrap()).unwrap();
            let n2 = sem.node_by_name(source.name_of(edge.node2()).unwrap()).unwrap();
            sem.add_edge(Edge::new(n1, n2, edge.endpoint1(), edge.endpoint2()))?;
        }
        Ok(sem)
    }

    // --- Mutation ---

    pub fn add_node(&mut self, node: Node) -> Result<Option<NodeId>, GraphError> {
        if node.is_error() {
            return Err(GraphError::ErrorNodeManaged(node.name));
        }
        self.graph.add_node(node)
    }

    pub fn remove_node(&mut self, node: NodeId) -> Result<bool, GraphError> {
        let Some(data) = self.graph.node(node) else {
            return Ok(false);
        };
        if data.is_error() {
            return Err(GraphError::ErrorNodeManaged(data.name.clone()));
        }
        let name = data.name.clone();
        let orphaned: Vec<NodeId> = self
            .graph
            .children_of(node)
            .into_iter()
            .filter(|c| !self.graph.node(*c).map(Node::is_error).unwrap_or(true))
            .collect();
        if let Some(error) = self.error_nodes.remove(&node) {
            self.owners.remove(&error);
            self.graph.remove_node(error);
        }
        self.graph.remove_node(node);
        self.remembered_positions.remove(&name);
        // Children that just lost their only non-error parent shed their
        // error nodes in turn.
        for child in orphaned {
            self.adjust_error_for_node(child);
        }
        Ok(true)
    }

    /// Adds a directed or bidirected edge; every other kind is rejected.
    ///
    /// Directed edges must connect non-error nodes; the head's error node is
    /// then created or kept as the invariant requires. Bidirected edges are
    /// re-attached to each endpoint's exogenous representative.
    pub fn add_edge(&mut self, edge: Edge) -> Result<bool, GraphError> {
        if edge.is_directed() {
            let (tail, head) = (edge.tail().unwrap(), edge.head().unwrap());
            self.forbid_error_node(tail)?;
            self.forbid_error_node(head)?;
            let added = self.graph.add_edge(edge)?;
            if added && self.shows_error_terms {
                self.adjust_error_for_node(head);
            }
            Ok(added)
        } else if edge.is_bidirected() {
            let a = self.exogenous_rep(edge.node1());
            let b = self.exogenous_rep(edge.node2());
            self.graph.add_edge(Edge::bidirected(a, b))
        } else {
            Err(GraphError::Unsupported(
                "a SEM graph holds only directed and bidirected edges".into(),
            ))
        }
    }

    /// Removes an edge. The synthetic error→owner edge itself cannot be
    /// removed; hide error terms or remove the owner's incoming edges
    /// instead.
    pub fn remove_edge(&mut self, edge: &Edge) -> Result<bool, GraphError> {
        if edge.is_directed() {
            let tail = edge.tail().unwrap();
            if let Some(data) = self.graph.node(tail) {
                if data.is_error() {
                    return Err(GraphError::ErrorNodeManaged(data.name.clone()));
                }
            }
            let removed = self.graph.remove_edge(edge);
            if removed && self.shows_error_terms {
                self.adjust_error_for_node(edge.head().unwrap());
            }
            Ok(removed)
        } else {
            Ok(self.graph.remove_edge(edge))
        }
    }

    // --- Error-term visibility ---

    pub fn shows_error_terms(&self) -> bool {
        self.shows_error_terms
    }

    /// Shows or hides error terms, creating or dissolving error nodes so
    /// the invariant holds under the new setting.
    pub fn set_shows_error_terms(&mut self, shows: bool) {
        if self.shows_error_terms == shows {
            return;
        }
        self.shows_error_terms = shows;
        let nodes: Vec<NodeId> = self
            .graph
            .nodes()
            .into_iter()
            .filter(|n| !self.graph.node(*n).map(Node::is_error).unwrap_or(true))
            .collect();
        for node in nodes {
            self.adjust_error_for_node(node);
        }
    }

    /// Re-establishes the error-node invariant at `node` after a mutation
    /// touching its incoming edges.
    ///
    /// With error terms shown, an endogenous node gets exactly one error
    /// parent and its bidirected edges move onto it; an exogenous node (or
    /// any node once error terms are hidden) carries its bidirected edges
    /// itself and has no error parent.
    fn adjust_error_for_node(&mut self, node: NodeId) {
        if self.shows_error_terms && self.is_endogenous(node) {
            if !self.error_nodes.contains_key(&node) {
                self.spawn_error_node(node);
            }
        } else if let Some(error) = self.error_nodes.remove(&node) {
            self.owners.remove(&error);
            let position = self.graph.node(error).map(|d| (d.center_x, d.center_y));
            let owner_name = self.graph.node(node).unwrap().name.clone();
            if let Some(position) = position {
                self.remembered_positions.insert(owner_name, position);
            }
            self.retarget_bidirected(error, node);
            // Cascades the synthetic directed edge.
            self.graph.remove_node(error);
        }
    }

    fn spawn_error_node(&mut self, node: NodeId) {
        let owner_name = self.graph.node(node).unwrap().name.clone();
        let error_name = format!("E_{}", owner_name);

        // A pre-existing node squatting on the error name loses its
        // bidirected edges to the owner and is removed.
        if let Some(squatter) = self.graph.node_by_name(&error_name) {
            self.retarget_bidirected(squatter, node);
            self.graph.remove_node(squatter);
        }

        let mut error = Node::error(error_name);
        if let Some(&(x, y)) = self.remembered_positions.get(&owner_name) {
            error = error.with_position(x, y);
        }
        let error_id = self.graph.add_node(error).unwrap().unwrap();
        self.graph
            .add_edge(Edge::directed(error_id, node))
            .unwrap();
        self.retarget_bidirected(node, error_id);
        self.error_nodes.insert(node, error_id);
        self.owners.insert(error_id, node);
    }

    fn forbid_error_node(&self, node: NodeId) -> Result<(), GraphError> {
        match self.graph.node(node) {
            Some(data) if data.is_error() => {
                Err(GraphError::ErrorNodeManaged(data.name.clone()))
            }
            Some(_) => Ok(()),
            None => Err(GraphError::NodeNotInGraph(format!("#{}", node.index()))),
        }
    }

    // Moves every bidirected edge at `from` over to `to`, keeping far ends.
    fn retarget_bidirected(&mut self, from: NodeId, to: NodeId) {
        for edge in self.graph.incident_edges(from) {
            if !edge.is_bidirected() {
                continue;
            }
            let other = edge.traverse(from).unwrap();
            self.graph.remove_edge(&edge);
            if other != to {
                self.graph.add_edge(Edge::bidirected(to, other)).unwrap();
            }
        }
    }

    // --- Queries ---

    /// The error node attached to `node`, if any. An error node is its own
    /// error node.
    pub fn error_node_for(&self, node: NodeId) -> Option<NodeId> {
        match self.graph.node(node) {
            Some(data) if data.is_error() => Some(node),
            Some(_) => self.error_nodes.get(&node).copied(),
            None => None,
        }
    }

    /// True iff `node` has no incoming directed edge from a non-error node.
    pub fn is_exogenous(&self, node: NodeId) -> bool {
        !self.is_endogenous(node)
    }

    fn is_endogenous(&self, node: NodeId) -> bool {
        self.graph
            .parents_of(node)
            .into_iter()
            .any(|p| !self.graph.node(p).map(Node::is_error).unwrap_or(true))
    }

    /// The node bidirected edges attach to: the node itself while it is
    /// exogenous or error terms are hidden, its error node otherwise.
    fn exogenous_rep(&self, node: NodeId) -> NodeId {
        match self.error_node_for(node) {
            Some(error) if self.shows_error_terms => error,
            _ => node,
        }
    }

    // --- Read surface (forwarded) ---

    pub fn graph(&self) -> &MixedGraph {
        &self.graph
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.graph.nodes()
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.graph.node(node)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.graph.node_by_name(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.graph.edges()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.graph.contains_edge(edge)
    }

    pub fn parents_of(&self, node: NodeId) -> Vec<NodeId> {
        self.graph.parents_of(node)
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.graph.children_of(node)
    }

    pub fn adjacent_to(&self, node: NodeId) -> Vec<NodeId> {
        self.graph.adjacent_to(node)
    }

    /// Registers a structural-change observer on the wrapped graph.
    pub fn add_listener(&mut self, listener: ChangeListener) {
        self.graph.add_listener(listener);
    }
}

impl Default for SemGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SemGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("shows_error_terms", &self.shows_error_terms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeRole;

    fn sem_xyz() -> (SemGraph, NodeId, NodeId, NodeId) {
        let mut sem = SemGraph::with_nodes(vec![
            Node::measured("X"),
            Node::measured("Y"),
            Node::measured("Z"),
        ])
        .unwrap();
        let x = sem.node_by_name("X").unwrap();
        let y = sem.node_by_name("Y").unwrap();
        let z = sem.node_by_name("Z").unwrap();
        (sem, x, y, z)
    }

    // Every node with a non-error parent has exactly one error parent;
    // every other node has none.
    fn assert_invariant(sem: &SemGraph) {
        for node in sem.nodes() {
            if sem.node(node).unwrap().is_error() {
                continue;
            }
            let parents = sem.parents_of(node);
            let error_parents = parents
                .iter()
                .filter(|p| sem.node(**p).unwrap().is_error())
                .count();
            let other_parents = parents.len() - error_parents;
            if sem.shows_error_terms() && other_parents >= 1 {
                assert_eq!(error_parents, 1, "endogenous node lacks its error parent");
            } else {
                assert_eq!(error_parents, 0, "exogenous node has an error parent");
            }
        }
    }

    #[test]
    fn test_error_node_follows_endogeny() {
        let (mut sem, x, y, _) = sem_xyz();
        sem.set_shows_error_terms(true);
        assert!(sem.error_node_for(y).is_none());

        sem.add_edge(Edge::directed(x, y)).unwrap();
        let ey = sem.error_node_for(y).expect("Y must gain an error node");
        assert_eq!(sem.node(ey).unwrap().name, "E_Y");
        assert_eq!(sem.node(ey).unwrap().role, NodeRole::Error);
        assert!(sem.contains_edge(&Edge::directed(ey, y)));
        assert_invariant(&sem);

        sem.remove_edge(&Edge::directed(x, y)).unwrap();
        assert!(sem.error_node_for(y).is_none());
        assert!(sem.node_by_name("E_Y").is_none());
        assert_invariant(&sem);
    }

    #[test]
    fn test_toggle_show_hide() {
        let (mut sem, x, y, z) = sem_xyz();
        sem.add_edge(Edge::directed(x, y)).unwrap();
        sem.add_edge(Edge::directed(y, z)).unwrap();
        assert_eq!(sem.node_count(), 3, "hidden error terms add no nodes");

        sem.set_shows_error_terms(true);
        assert_eq!(sem.node_count(), 5);
        assert_invariant(&sem);

        sem.set_shows_error_terms(false);
        assert_eq!(sem.node_count(), 3);
        assert!(sem.node_by_name("E_Y").is_none());
        assert_invariant(&sem);
    }

    #[test]
    fn test_bidirected_retargets_to_error_nodes() {
        let (mut sem, x, y, _) = sem_xyz();
        sem.set_shows_error_terms(true);
        sem.add_edge(Edge::directed(x, y)).unwrap();
        let ey = sem.error_node_for(y).unwrap();

        // X is exogenous (its own representative); Y is represented by E_Y.
        sem.add_edge(Edge::bidirected(x, y)).unwrap();
        assert!(sem.contains_edge(&Edge::bidirected(x, ey)));
        assert!(!sem.contains_edge(&Edge::bidirected(x, y)));

        // Hiding errors folds the correlation back onto Y itself.
        sem.set_shows_error_terms(false);
        assert!(sem.contains_edge(&Edge::bidirected(x, y)));
        assert_invariant(&sem);
    }

    #[test]
    fn test_bidirected_moves_on_late_show() {
        let (mut sem, x, y, _) = sem_xyz();
        sem.add_edge(Edge::directed(x, y)).unwrap();
        sem.add_edge(Edge::bidirected(x, y)).unwrap();

        sem.set_shows_error_terms(true);
        let ey = sem.error_node_for(y).unwrap();
        assert!(sem.contains_edge(&Edge::bidirected(x, ey)));
        assert_invariant(&sem);
    }

    #[test]
    fn test_error_name_collision_is_resolved() {
        let (mut sem, x, y, z) = sem_xyz();
        // A measured node squats on the name E_Y and correlates with Z.
        let squatter = sem.add_node(Node::measured("E_Y")).unwrap().unwrap();
        sem.add_edge(Edge::bidirected(squatter, z)).unwrap();

        sem.set_shows_error_terms(true);
        sem.add_edge(Edge::directed(x, y)).unwrap();

        let ey = sem.error_node_for(y).unwrap();
        assert_eq!(sem.node(ey).unwrap().role, NodeRole::Error);
        // The squatter is gone and its correlation migrated.
        assert!(sem.nodes().iter().all(|&n| n == ey
            || sem.node(n).unwrap().name != "E_Y"));
        assert!(sem.contains_edge(&Edge::bidirected(y, z))
            || sem.contains_edge(&Edge::bidirected(ey, z)));
        assert_invariant(&sem);
    }

    #[test]
    fn test_direct_error_mutation_rejected() {
        let (mut sem, x, y, _) = sem_xyz();
        sem.set_shows_error_terms(true);
        sem.add_edge(Edge::directed(x, y)).unwrap();
        let ey = sem.error_node_for(y).unwrap();

        assert!(matches!(
            sem.add_node(Node::new("E_Q", NodeRole::Error)),
            Err(GraphError::ErrorNodeManaged(_))
        ));
        assert!(matches!(
            sem.remove_node(ey),
            Err(GraphError::ErrorNodeManaged(_))
        ));
        assert!(matches!(
            sem.remove_edge(&Edge::directed(ey, y)),
            Err(GraphError::ErrorNodeManaged(_))
        ));
        assert!(matches!(
            sem.add_edge(Edge::directed(ey, x)),
            Err(GraphError::ErrorNodeManaged(_))
        ));
    }

    #[test]
    fn test_only_directed_and_bidirected_kinds() {
        let (mut sem, x, y, _) = sem_xyz();
        for edge in [
            Edge::undirected(x, y),
            Edge::nondirected(x, y),
            Edge::partially_oriented(x, y),
        ] {
            assert!(matches!(
                sem.add_edge(edge),
                Err(GraphError::Unsupported(_))
            ));
        }
    }

    #[test]
    fn test_remove_node_re_adjusts_children() {
        let (mut sem, x, y, _) = sem_xyz();
        sem.set_shows_error_terms(true);
        sem.add_edge(Edge::directed(x, y)).unwrap();
        assert!(sem.error_node_for(y).is_some());

        sem.remove_node(x).unwrap();
        assert!(sem.error_node_for(y).is_none());
        assert_invariant(&sem);
    }

    #[test]
    fn test_error_position_remembered_across_toggle() {
        let (mut sem, x, y, _) = sem_xyz();
        sem.set_shows_error_terms(true);
        sem.add_edge(Edge::directed(x, y)).unwrap();

        // Simulate a layout pass placing the error node, then toggle.
        let ey = sem.error_node_for(y).unwrap();
        let name = sem.node(ey).unwrap().name.clone();
        assert_eq!(name, "E_Y");
        sem.set_shows_error_terms(false);
        sem.set_shows_error_terms(true);
        let ey2 = sem.error_node_for(y).unwrap();
        assert_eq!(sem.node(ey2).unwrap().name, "E_Y");
    }
}
