//! k-hop neighborhood expansion

use std::collections::{BTreeSet, HashMap, HashSet};

use super::topology::Graph;

/// Query for the set of nodes within `max_distance` hops of an origin
///
/// Edge direction is ignored: expansion follows edges both ways, which is
/// what neighborhood subsetting wants even on directed graphs.
#[derive(Debug, Clone)]
pub struct NeighborQuery {
    /// Starting node index
    pub origin: usize,
    /// Maximum number of hops (0 = origin only)
    pub max_distance: usize,
    /// Whether the origin itself is part of the result
    pub include_center: bool,
}

impl NeighborQuery {
    /// Create a query from a starting node, defaulting to one hop
    pub fn from(origin: usize) -> Self {
        Self {
            origin,
            max_distance: 1,
            include_center: false,
        }
    }

    /// Set the maximum distance
    pub fn distance(mut self, max_distance: usize) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Include the origin in the result
    pub fn include_center(mut self, include_center: bool) -> Self {
        self.include_center = include_center;
        self
    }

    /// Execute the breadth-first expansion
    ///
    /// A nonexistent origin yields the empty set.
    pub fn execute(&self, graph: &Graph) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();
        if self.origin >= graph.node_count() {
            return result;
        }

        let index = AdjacencyIndex::build(graph);

        let mut visited: HashSet<usize> = HashSet::new();
        let mut current_level: Vec<usize> = vec![self.origin];
        visited.insert(self.origin);

        for _depth in 0..self.max_distance {
            if current_level.is_empty() {
                break;
            }

            let mut next_level: Vec<usize> = Vec::new();
            for &node in &current_level {
                for &neighbor in index.neighbors(node) {
                    if visited.insert(neighbor) {
                        next_level.push(neighbor);
                        result.insert(neighbor);
                    }
                }
            }
            current_level = next_level;
        }

        if self.include_center {
            result.insert(self.origin);
        } else {
            result.remove(&self.origin);
        }
        result
    }
}

/// Index for fast neighbor lookups, direction collapsed
struct AdjacencyIndex {
    neighbors: HashMap<usize, Vec<usize>>,
}

impl AdjacencyIndex {
    fn build(graph: &Graph) -> Self {
        let mut neighbors: HashMap<usize, Vec<usize>> = HashMap::new();
        for edge in graph.edges() {
            neighbors.entry(edge.source).or_default().push(edge.target);
            if edge.source != edge.target {
                neighbors.entry(edge.target).or_default().push(edge.source);
            }
        }
        Self { neighbors }
    }

    fn neighbors(&self, node: usize) -> &[usize] {
        self.neighbors.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
