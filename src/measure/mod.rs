//! Derived attribute measures
//!
//! A measure is a pure function from the current graph to one attribute
//! value per node (or per edge). Measures are registered by name at
//! network construction and re-run against the new topology on every
//! membership-changing mutation.

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::graph::Graph;
use crate::table::AttrValue;

/// Errors that can occur during measure recomputation
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("derived measure '{name}' failed")]
    Measure {
        name: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("derived measure '{name}' produced {actual} values for {expected} entities")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for registry operations
pub type MeasureResult<T> = Result<T, MeasureError>;

/// What a single measure function returns
pub type MeasureOutput = Result<Vec<AttrValue>, Box<dyn std::error::Error + Send + Sync>>;

/// A function from graph topology to a value sequence aligned with entity order
///
/// Implementations must be deterministic given the topology; that is a
/// caller responsibility, not enforced here. Any closure
/// `Fn(&Graph) -> MeasureOutput + Send + Sync` is a measure.
pub trait Measure: Send + Sync {
    /// Compute one value per entity of the measure's kind
    fn compute(&self, graph: &Graph) -> MeasureOutput;
}

impl<F> Measure for F
where
    F: Fn(&Graph) -> MeasureOutput + Send + Sync,
{
    fn compute(&self, graph: &Graph) -> MeasureOutput {
        self(graph)
    }
}

/// Named measures, partitioned by entity kind
///
/// Cloning shares the registered functions; a registry survives into every
/// network derived from the one that carries it. Recompute order is the
/// lexicographic order of measure names, so derived columns land in a
/// stable position.
#[derive(Clone, Default)]
pub struct MeasureRegistry {
    node: BTreeMap<String, Arc<dyn Measure>>,
    edge: BTreeMap<String, Arc<dyn Measure>>,
}

impl MeasureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node measure under the given column name
    pub fn register_node(&mut self, name: impl Into<String>, measure: impl Measure + 'static) {
        self.node.insert(name.into(), Arc::new(measure));
    }

    /// Register an edge measure under the given column name
    pub fn register_edge(&mut self, name: impl Into<String>, measure: impl Measure + 'static) {
        self.edge.insert(name.into(), Arc::new(measure));
    }

    /// Names of registered node measures
    pub fn node_names(&self) -> Vec<&str> {
        self.node.keys().map(|s| s.as_str()).collect()
    }

    /// Names of registered edge measures
    pub fn edge_names(&self) -> Vec<&str> {
        self.edge.keys().map(|s| s.as_str()).collect()
    }

    /// Whether no measures are registered
    pub fn is_empty(&self) -> bool {
        self.node.is_empty() && self.edge.is_empty()
    }

    /// Recompute all node measures against a graph
    ///
    /// All-or-nothing: the first failing measure aborts the whole pass and
    /// nothing is returned, so a caller can never observe a partial update.
    pub fn recompute_nodes(&self, graph: &Graph) -> MeasureResult<Vec<(String, Vec<AttrValue>)>> {
        Self::recompute(&self.node, graph, graph.node_count())
    }

    /// Recompute all edge measures against a graph
    pub fn recompute_edges(&self, graph: &Graph) -> MeasureResult<Vec<(String, Vec<AttrValue>)>> {
        Self::recompute(&self.edge, graph, graph.edge_count())
    }

    fn recompute(
        measures: &BTreeMap<String, Arc<dyn Measure>>,
        graph: &Graph,
        expected: usize,
    ) -> MeasureResult<Vec<(String, Vec<AttrValue>)>> {
        let mut columns = Vec::with_capacity(measures.len());
        for (name, measure) in measures {
            let values = measure.compute(graph).map_err(|cause| MeasureError::Measure {
                name: name.clone(),
                cause,
            })?;
            if values.len() != expected {
                return Err(MeasureError::LengthMismatch {
                    name: name.clone(),
                    expected,
                    actual: values.len(),
                });
            }
            columns.push((name.clone(), values));
        }
        Ok(columns)
    }
}

impl std::fmt::Debug for MeasureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureRegistry")
            .field("node", &self.node_names())
            .field("edge", &self.edge_names())
            .finish()
    }
}
