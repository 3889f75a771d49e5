//! The graph value type and its pure structural transformations
//!
//! A [`Graph`] is immutable once constructed: every transformation returns
//! a new value and never touches the original. Node indices are contiguous
//! and stable only within one value; the node and edge *names* are the
//! identifiers that survive renumbering.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

use super::traverse::NeighborQuery;

/// Errors that can occur when constructing or transforming a graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("edge endpoint out of range: {0}")]
    EndpointOutOfRange(usize),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// A single edge: named, indexed endpoints, optional weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRec {
    /// Identifier, unique among edges; carried verbatim across transformations
    pub name: String,
    /// Source node index
    pub source: usize,
    /// Target node index
    pub target: usize,
    /// Optional weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EdgeRec {
    /// Create an unnamed, unweighted edge; `Graph::new` assigns a name
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            name: String::new(),
            source,
            target,
            weight: None,
        }
    }

    /// Create a named edge
    pub fn named(name: impl Into<String>, source: usize, target: usize) -> Self {
        Self {
            name: name.into(),
            source,
            target,
            weight: None,
        }
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// How an edge-induced subgraph treats nodes no surviving edge touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeInduceMode {
    /// Keep only nodes touched by a surviving edge
    TouchedNodes,
    /// Keep every original node
    AllNodes,
}

/// An immutable graph: named nodes, named edges, direction flag
///
/// Invariants: edge endpoints always index existing nodes; node names and
/// edge names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    nodes: Vec<String>,
    edges: Vec<EdgeRec>,
}

impl Graph {
    /// Construct a graph, validating endpoints and identifier uniqueness
    ///
    /// Edges with an empty name are assigned `e0, e1, …` by position; all
    /// names are preserved verbatim by every later transformation.
    pub fn new(directed: bool, nodes: Vec<String>, mut edges: Vec<EdgeRec>) -> GraphResult<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in &nodes {
            if !seen.insert(name) {
                return Err(GraphError::DuplicateIdentifier(name.clone()));
            }
        }

        for (i, edge) in edges.iter_mut().enumerate() {
            if edge.name.is_empty() {
                edge.name = format!("e{}", i);
            }
            if edge.source >= nodes.len() {
                return Err(GraphError::EndpointOutOfRange(edge.source));
            }
            if edge.target >= nodes.len() {
                return Err(GraphError::EndpointOutOfRange(edge.target));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for edge in &edges {
            if !seen.insert(&edge.name) {
                return Err(GraphError::DuplicateIdentifier(edge.name.clone()));
            }
        }

        Ok(Self {
            directed,
            nodes,
            edges,
        })
    }

    /// Whether edges are directed
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Node names, position = node index
    pub fn node_names(&self) -> &[String] {
        &self.nodes
    }

    /// Name of the node at `index`
    pub fn node_name(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|s| s.as_str())
    }

    /// All edges in order
    pub fn edges(&self) -> &[EdgeRec] {
        &self.edges
    }

    /// Edge names, position = edge index
    pub fn edge_names(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.name.as_str()).collect()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Index of the node with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == name)
    }

    /// Check if a node with the given name exists
    pub fn has_node_named(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Check if an edge between the endpoints exists
    ///
    /// Undirected graphs match either orientation.
    pub fn contains_edge(&self, source: usize, target: usize) -> bool {
        self.edges.iter().any(|e| {
            (e.source == source && e.target == target)
                || (!self.directed && e.source == target && e.target == source)
        })
    }

    /// Degree of a node; a self-loop counts twice
    ///
    /// Direction is ignored: in- and out-edges both count.
    pub fn degree(&self, node: usize) -> usize {
        self.edges
            .iter()
            .map(|e| (e.source == node) as usize + (e.target == node) as usize)
            .sum()
    }

    /// Degrees of all nodes in index order
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.source] += 1;
            degrees[edge.target] += 1;
        }
        degrees
    }

    /// Nodes reachable from `origin` within `max_distance` hops
    ///
    /// Breadth-first expansion ignoring edge direction. `max_distance == 0`
    /// yields `{origin}` when `include_center`, else the empty set.
    pub fn neighbors(
        &self,
        origin: usize,
        max_distance: usize,
        include_center: bool,
    ) -> BTreeSet<usize> {
        NeighborQuery::from(origin)
            .distance(max_distance)
            .include_center(include_center)
            .execute(self)
    }

    /// New graph with the given nodes and all incident edges removed
    ///
    /// Survivors are renumbered contiguously; their names are carried.
    pub fn delete_nodes(&self, ids: &[usize]) -> Graph {
        let doomed: HashSet<usize> = ids.iter().copied().collect();
        let keep: Vec<usize> = (0..self.nodes.len())
            .filter(|i| !doomed.contains(i))
            .collect();
        self.restrict_to(&keep, None)
    }

    /// New graph with the given edges removed
    pub fn delete_edges(&self, ids: &[usize]) -> Graph {
        let doomed: HashSet<usize> = ids.iter().copied().collect();
        let edges = self
            .edges
            .iter()
            .enumerate()
            .filter(|(i, _)| !doomed.contains(i))
            .map(|(_, e)| e.clone())
            .collect();
        Graph {
            directed: self.directed,
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// New graph with parallel edges and/or self-loops removed
    ///
    /// For parallel edges the first occurrence wins; undirected graphs
    /// treat `(a, b)` and `(b, a)` as parallel.
    pub fn simplify(&self, remove_multiple: bool, remove_loops: bool) -> Graph {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let edges = self
            .edges
            .iter()
            .filter(|e| {
                if remove_loops && e.source == e.target {
                    return false;
                }
                if remove_multiple {
                    let key = if self.directed || e.source <= e.target {
                        (e.source, e.target)
                    } else {
                        (e.target, e.source)
                    };
                    return seen.insert(key);
                }
                true
            })
            .cloned()
            .collect();
        Graph {
            directed: self.directed,
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// New graph with all degree-0 nodes removed
    pub fn delete_isolates(&self) -> Graph {
        let degrees = self.degrees();
        let keep: Vec<usize> = (0..self.nodes.len()).filter(|&i| degrees[i] > 0).collect();
        self.restrict_to(&keep, None)
    }

    /// New graph induced on the given nodes
    ///
    /// Keeps the listed nodes (in original index order) and every edge
    /// whose both endpoints survive.
    pub fn induce_subgraph(&self, ids: &[usize]) -> Graph {
        let wanted: HashSet<usize> = ids.iter().copied().collect();
        let keep: Vec<usize> = (0..self.nodes.len())
            .filter(|i| wanted.contains(i))
            .collect();
        self.restrict_to(&keep, None)
    }

    /// New graph induced on the given edges
    ///
    /// Keeps the listed edges; `mode` decides whether untouched nodes
    /// survive.
    pub fn induce_subgraph_by_edges(&self, edge_ids: &[usize], mode: EdgeInduceMode) -> Graph {
        let wanted: HashSet<usize> = edge_ids.iter().copied().collect();
        let keep_nodes: Vec<usize> = match mode {
            EdgeInduceMode::AllNodes => (0..self.nodes.len()).collect(),
            EdgeInduceMode::TouchedNodes => {
                let mut touched: HashSet<usize> = HashSet::new();
                for (i, edge) in self.edges.iter().enumerate() {
                    if wanted.contains(&i) {
                        touched.insert(edge.source);
                        touched.insert(edge.target);
                    }
                }
                (0..self.nodes.len())
                    .filter(|i| touched.contains(i))
                    .collect()
            }
        };
        self.restrict_to(&keep_nodes, Some(&wanted))
    }

    /// Restrict to the given nodes (ascending original indices), remapping
    /// edge endpoints; `edge_filter` additionally restricts by edge index.
    fn restrict_to(&self, keep_nodes: &[usize], edge_filter: Option<&HashSet<usize>>) -> Graph {
        let remap: HashMap<usize, usize> = keep_nodes
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect();
        let nodes = keep_nodes
            .iter()
            .map(|&i| self.nodes[i].clone())
            .collect();
        let edges = self
            .edges
            .iter()
            .enumerate()
            .filter(|(i, _)| edge_filter.map_or(true, |f| f.contains(i)))
            .filter_map(|(_, e)| {
                let source = *remap.get(&e.source)?;
                let target = *remap.get(&e.target)?;
                Some(EdgeRec {
                    name: e.name.clone(),
                    source,
                    target,
                    weight: e.weight,
                })
            })
            .collect();
        Graph {
            directed: self.directed,
            nodes,
            edges,
        }
    }
}

/// Builder for constructing graphs from named endpoints
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    directed: bool,
    nodes: Vec<String>,
    edges: Vec<(String, String, Option<String>, Option<f64>)>,
}

impl GraphBuilder {
    /// Create a new undirected builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direction flag
    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Add a node
    pub fn node(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(name.into());
        self
    }

    /// Add several nodes
    pub fn nodes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add an edge between named nodes
    pub fn edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push((source.into(), target.into(), None, None));
        self
    }

    /// Add a weighted edge between named nodes
    pub fn weighted_edge(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.edges
            .push((source.into(), target.into(), None, Some(weight)));
        self
    }

    /// Add an edge with an explicit identifier
    pub fn named_edge(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges
            .push((source.into(), target.into(), Some(name.into()), None));
        self
    }

    /// Resolve endpoint names and build the graph
    ///
    /// Fails with `NodeNotFound` for an edge endpoint naming no node.
    pub fn build(self) -> GraphResult<Graph> {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();
        let mut edges = Vec::with_capacity(self.edges.len());
        for (source, target, name, weight) in &self.edges {
            let &source = index
                .get(source.as_str())
                .ok_or_else(|| GraphError::NodeNotFound(source.clone()))?;
            let &target = index
                .get(target.as_str())
                .ok_or_else(|| GraphError::NodeNotFound(target.clone()))?;
            edges.push(EdgeRec {
                name: name.clone().unwrap_or_default(),
                source,
                target,
                weight: *weight,
            });
        }
        Graph::new(self.directed, self.nodes, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        // A - B - C - D
        GraphBuilder::new()
            .nodes(["A", "B", "C", "D"])
            .edge("A", "B")
            .edge("B", "C")
            .edge("C", "D")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_resolves_endpoints() {
        let graph = path_graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_edge(0, 1));
        assert!(graph.contains_edge(1, 0)); // undirected
        assert!(!graph.contains_edge(0, 3));
    }

    #[test]
    fn test_build_unknown_endpoint() {
        let result = GraphBuilder::new().node("A").edge("A", "Z").build();
        assert!(matches!(result, Err(GraphError::NodeNotFound(n)) if n == "Z"));
    }

    #[test]
    fn test_new_rejects_duplicate_node_names() {
        let result = Graph::new(false, vec!["A".into(), "A".into()], vec![]);
        assert!(matches!(result, Err(GraphError::DuplicateIdentifier(_))));
    }

    #[test]
    fn test_new_rejects_out_of_range_endpoint() {
        let result = Graph::new(false, vec!["A".into()], vec![EdgeRec::new(0, 5)]);
        assert!(matches!(result, Err(GraphError::EndpointOutOfRange(5))));
    }

    #[test]
    fn test_new_synthesizes_edge_names() {
        let graph = path_graph();
        assert_eq!(graph.edge_names(), vec!["e0", "e1", "e2"]);
    }

    #[test]
    fn test_degrees() {
        let graph = path_graph();
        assert_eq!(graph.degrees(), vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_self_loop_counts_twice() {
        let graph = GraphBuilder::new()
            .nodes(["A", "B"])
            .edge("A", "A")
            .edge("A", "B")
            .build()
            .unwrap();
        assert_eq!(graph.degree(0), 3);
        assert_eq!(graph.degree(1), 1);
    }

    #[test]
    fn test_delete_nodes_renumbers_and_keeps_names() {
        let graph = path_graph();
        let b = graph.index_of("B").unwrap();
        let next = graph.delete_nodes(&[b]);

        assert_eq!(next.node_names(), &["A", "C", "D"]);
        assert_eq!(next.edge_count(), 1); // only C - D survives
        assert_eq!(next.edges()[0].name, "e2");
        assert_eq!(next.degrees(), vec![0, 1, 1]);
        // original untouched
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_delete_edges() {
        let graph = path_graph();
        let next = graph.delete_edges(&[0, 2]);
        assert_eq!(next.node_count(), 4);
        assert_eq!(next.edge_names(), vec!["e1"]);
    }

    #[test]
    fn test_simplify_removes_loops_and_parallels() {
        let graph = GraphBuilder::new()
            .nodes(["A", "B"])
            .edge("A", "B")
            .edge("B", "A")
            .edge("A", "A")
            .build()
            .unwrap();

        let simple = graph.simplify(true, true);
        assert_eq!(simple.edge_count(), 1);
        assert_eq!(simple.edges()[0].name, "e0"); // first occurrence wins

        let loops_only = graph.simplify(false, true);
        assert_eq!(loops_only.edge_count(), 2);
    }

    #[test]
    fn test_simplify_directed_keeps_antiparallel() {
        let graph = GraphBuilder::new()
            .directed(true)
            .nodes(["A", "B"])
            .edge("A", "B")
            .edge("B", "A")
            .build()
            .unwrap();
        let simple = graph.simplify(true, true);
        assert_eq!(simple.edge_count(), 2);
    }

    #[test]
    fn test_delete_isolates() {
        let graph = GraphBuilder::new()
            .nodes(["A", "B", "C"])
            .edge("A", "B")
            .build()
            .unwrap();
        let next = graph.delete_isolates();
        assert_eq!(next.node_names(), &["A", "B"]);
    }

    #[test]
    fn test_induce_subgraph() {
        let graph = path_graph();
        let sub = graph.induce_subgraph(&[1, 2, 3]);
        assert_eq!(sub.node_names(), &["B", "C", "D"]);
        assert_eq!(sub.edge_names(), vec!["e1", "e2"]);
    }

    #[test]
    fn test_induce_by_edges_touched_nodes() {
        let graph = path_graph();
        let sub = graph.induce_subgraph_by_edges(&[0], EdgeInduceMode::TouchedNodes);
        assert_eq!(sub.node_names(), &["A", "B"]);
        assert_eq!(sub.edge_count(), 1);
    }

    #[test]
    fn test_induce_by_edges_all_nodes() {
        let graph = path_graph();
        let sub = graph.induce_subgraph_by_edges(&[0], EdgeInduceMode::AllNodes);
        assert_eq!(sub.node_count(), 4);
        assert_eq!(sub.edge_count(), 1);
    }

    #[test]
    fn test_graph_roundtrip() {
        let graph = GraphBuilder::new()
            .directed(true)
            .nodes(["A", "B"])
            .weighted_edge("A", "B", 2.5)
            .build()
            .unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, back);
    }
}
