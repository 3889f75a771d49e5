//! The network façade: one graph, two attribute tables, one registry
//!
//! A [`Network`] composes a [`Graph`] with synchronized node and edge
//! [`AttrTable`]s. Reads never mutate; every structural operation returns
//! a new, independent instance and leaves the original untouched. After
//! any public operation returns, node table rows equal graph nodes and
//! edge table rows equal graph edges.


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::{EdgeInduceMode, Graph, GraphError};
use crate::measure::{MeasureError, MeasureRegistry};
use crate::query::{self, FilterOutcome, QueryError};
use crate::table::{AttrTable, AttrValue, Column, TableError, NAME_COLUMN};

/// Errors surfaced by network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Which attribute table an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Edge,
}

/// Metadata about a network instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkMetadata {
    /// When this instance was created
    pub created_at: Option<DateTime<Utc>>,
    /// Operation that produced this instance, if derived from another
    pub derived_from: Option<String>,
}

impl NetworkMetadata {
    fn stamped(operation: Option<&str>) -> Self {
        Self {
            created_at: Some(Utc::now()),
            derived_from: operation.map(String::from),
        }
    }
}

/// A graph with synchronized, partly derived attribute tables
///
/// Derived columns come from the registered measures and are recomputed
/// against the new topology on every membership-changing operation.
/// Static columns (added via [`annotate`](Network::annotate) or supplied
/// at construction) are carried verbatim by `name`-matched rows; because
/// they have no refresh source, each carrying mutation emits a
/// warning-level event naming them.
///
/// Measures are not serialized; a deserialized snapshot has an empty
/// registry, so its former derived columns behave as static from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    graph: Graph,
    node_attrs: AttrTable,
    edge_attrs: AttrTable,
    #[serde(skip)]
    measures: MeasureRegistry,
    metadata: NetworkMetadata,
}

impl Network {
    /// Build a network from a graph and a measure registry
    ///
    /// Derived columns are computed immediately; fails if identifiers are
    /// not unique or a measure misbehaves.
    pub fn new(graph: Graph, measures: MeasureRegistry) -> NetworkResult<Self> {
        Self::assemble(graph, measures, Vec::new(), Vec::new(), None)
    }

    /// Build a network with pre-existing static annotation columns
    pub fn with_annotations(
        graph: Graph,
        measures: MeasureRegistry,
        node_columns: Vec<Column>,
        edge_columns: Vec<Column>,
    ) -> NetworkResult<Self> {
        Self::assemble(graph, measures, node_columns, edge_columns, None)
    }

    // --- Reads ---

    /// The node attribute table
    pub fn node_attributes(&self) -> &AttrTable {
        &self.node_attrs
    }

    /// The edge attribute table
    pub fn edge_attributes(&self) -> &AttrTable {
        &self.edge_attrs
    }

    /// The underlying graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The measure registry
    pub fn measures(&self) -> &MeasureRegistry {
        &self.measures
    }

    /// Instance metadata
    pub fn metadata(&self) -> &NetworkMetadata {
        &self.metadata
    }

    /// Whether edges are directed
    pub fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }

    /// A node attribute column
    pub fn nodes(&self, column: &str) -> NetworkResult<&[AttrValue]> {
        Ok(self.node_attrs.get(column)?)
    }

    /// An edge attribute column
    pub fn edges(&self, column: &str) -> NetworkResult<&[AttrValue]> {
        Ok(self.edge_attrs.get(column)?)
    }

    /// Row indices matching a predicate, or a projected column of them
    pub fn filter_nodes(
        &self,
        predicate: &str,
        project: Option<&str>,
    ) -> NetworkResult<FilterOutcome> {
        Self::filter_table(&self.node_attrs, predicate, project)
    }

    /// Edge-table analogue of [`filter_nodes`](Network::filter_nodes)
    pub fn filter_edges(
        &self,
        predicate: &str,
        project: Option<&str>,
    ) -> NetworkResult<FilterOutcome> {
        Self::filter_table(&self.edge_attrs, predicate, project)
    }

    /// Names of nodes within `max_distance` hops of the queried nodes
    ///
    /// `values` are resolved through `lookup_column` of the node table.
    /// Pure query; the result is in node index order.
    pub fn neighbors(
        &self,
        values: &[AttrValue],
        lookup_column: &str,
        max_distance: usize,
        include_center: bool,
    ) -> NetworkResult<Vec<String>> {
        let hood = query::neighbors_by_label(
            &self.graph,
            &self.node_attrs,
            values,
            lookup_column,
            max_distance,
            include_center,
        )?;
        Ok(hood
            .into_iter()
            .filter_map(|i| self.graph.node_name(i))
            .map(String::from)
            .collect())
    }

    // --- Copy-producing transformations ---

    /// New network with a static column added
    pub fn annotate(
        &self,
        kind: EntityKind,
        column: impl Into<String>,
        values: Vec<AttrValue>,
    ) -> NetworkResult<Self> {
        let mut next = self.clone();
        match kind {
            EntityKind::Node => next.node_attrs.add_column(column, values)?,
            EntityKind::Edge => next.edge_attrs.add_column(column, values)?,
        }
        next.metadata = NetworkMetadata::stamped(Some("annotate"));
        Ok(next)
    }

    /// New network with an existing static column replaced
    ///
    /// Explicit re-annotation; fails with `UnknownColumn` if the column
    /// does not exist.
    pub fn annotate_replace(
        &self,
        kind: EntityKind,
        column: &str,
        values: Vec<AttrValue>,
    ) -> NetworkResult<Self> {
        let mut next = self.clone();
        match kind {
            EntityKind::Node => next.node_attrs.replace_column(column, values)?,
            EntityKind::Edge => next.edge_attrs.replace_column(column, values)?,
        }
        next.metadata = NetworkMetadata::stamped(Some("annotate"));
        Ok(next)
    }

    /// New network with the resolved nodes (and incident edges) deleted
    pub fn delete_nodes_by_attribute(
        &self,
        values: &[AttrValue],
        lookup_column: &str,
    ) -> NetworkResult<Self> {
        let ids = query::resolve_labels(&self.node_attrs, values, lookup_column)?;
        self.rebuild(self.graph.delete_nodes(&ids), "delete_nodes")
    }

    /// New network with the resolved edges deleted
    pub fn delete_edges_by_attribute(
        &self,
        values: &[AttrValue],
        lookup_column: &str,
    ) -> NetworkResult<Self> {
        let ids = query::resolve_labels(&self.edge_attrs, values, lookup_column)?;
        self.rebuild(self.graph.delete_edges(&ids), "delete_edges")
    }

    /// New network induced on the k-hop neighborhood of the queried nodes
    pub fn subset_nodes(
        &self,
        values: &[AttrValue],
        lookup_column: &str,
        max_distance: usize,
        include_center: bool,
    ) -> NetworkResult<Self> {
        let hood = query::neighbors_by_label(
            &self.graph,
            &self.node_attrs,
            values,
            lookup_column,
            max_distance,
            include_center,
        )?;
        let ids: Vec<usize> = hood.into_iter().collect();
        self.rebuild(self.graph.induce_subgraph(&ids), "subset_nodes")
    }

    /// New network induced on the resolved edges
    pub fn subset_edges(
        &self,
        values: &[AttrValue],
        lookup_column: &str,
        mode: EdgeInduceMode,
    ) -> NetworkResult<Self> {
        let ids = query::resolve_labels(&self.edge_attrs, values, lookup_column)?;
        self.rebuild(
            self.graph.induce_subgraph_by_edges(&ids, mode),
            "subset_edges",
        )
    }

    /// New network induced on edges by row index (as returned by
    /// [`filter_edges`](Network::filter_edges))
    pub fn subset_edges_by_index(
        &self,
        ids: &[usize],
        mode: EdgeInduceMode,
    ) -> NetworkResult<Self> {
        self.rebuild(
            self.graph.induce_subgraph_by_edges(ids, mode),
            "subset_edges",
        )
    }

    /// New network with parallel edges and/or self-loops removed
    pub fn simplify(&self, remove_multiple: bool, remove_loops: bool) -> NetworkResult<Self> {
        self.rebuild(self.graph.simplify(remove_multiple, remove_loops), "simplify")
    }

    /// New network with degree-0 nodes removed
    pub fn delete_isolates(&self) -> NetworkResult<Self> {
        self.rebuild(self.graph.delete_isolates(), "delete_isolates")
    }

    // --- Internals ---

    fn filter_table(
        table: &AttrTable,
        predicate: &str,
        project: Option<&str>,
    ) -> NetworkResult<FilterOutcome> {
        let indices = query::filter(table, predicate)?;
        match project {
            Some(column) => Ok(FilterOutcome::Values(query::project(
                table, &indices, column,
            )?)),
            None => Ok(FilterOutcome::Indices(indices)),
        }
    }

    /// Rebuild pipeline shared by every structural mutation: fresh tables
    /// seeded with the carried `name` columns, derived columns recomputed
    /// atomically, static columns reconciled by `name`-matched rows.
    fn rebuild(&self, graph: Graph, operation: &str) -> NetworkResult<Self> {
        let node_names = graph.node_names().to_vec();
        let edge_names: Vec<String> = graph.edge_names().iter().map(|s| s.to_string()).collect();

        let node_static =
            Self::carry_static(&self.node_attrs, &self.measures.node_names(), &node_names)?;
        let edge_static =
            Self::carry_static(&self.edge_attrs, &self.measures.edge_names(), &edge_names)?;

        let carried: Vec<&str> = node_static
            .iter()
            .chain(edge_static.iter())
            .map(|c| c.name.as_str())
            .collect();
        if !carried.is_empty() {
            warn!(
                operation,
                columns = ?carried,
                "static columns carried without a refresh source; values may be stale"
            );
        }
        debug!(
            operation,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "rebuilding attribute tables"
        );

        Self::assemble(
            graph,
            self.measures.clone(),
            node_static,
            edge_static,
            Some(operation),
        )
    }

    /// Static columns of `old` (everything but `name` and the derived
    /// columns), re-rowed to match `new_names`
    fn carry_static(
        old: &AttrTable,
        derived: &[&str],
        new_names: &[String],
    ) -> NetworkResult<Vec<Column>> {
        let row_of: HashMap<&str, usize> = old
            .names()
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_str().map(|s| (s, i)))
            .collect();
        let rows: Vec<usize> = new_names
            .iter()
            .filter_map(|n| row_of.get(n.as_str()).copied())
            .collect();
        debug_assert_eq!(rows.len(), new_names.len());

        let re_rowed = old.rows(&rows);
        let mut columns = Vec::new();
        for name in old.column_names() {
            if name == NAME_COLUMN || derived.contains(&name) {
                continue;
            }
            columns.push(Column::new(name, re_rowed.get(name)?.to_vec()));
        }
        Ok(columns)
    }

    fn assemble(
        graph: Graph,
        measures: MeasureRegistry,
        node_static: Vec<Column>,
        edge_static: Vec<Column>,
        derived_from: Option<&str>,
    ) -> NetworkResult<Self> {
        let mut node_attrs = AttrTable::from_names(graph.node_names().to_vec())?;
        let mut edge_attrs =
            AttrTable::from_names(graph.edge_names().iter().map(|s| s.to_string()).collect())?;

        for (name, values) in measures.recompute_nodes(&graph)? {
            node_attrs.add_column(name, values)?;
        }
        for (name, values) in measures.recompute_edges(&graph)? {
            edge_attrs.add_column(name, values)?;
        }
        for column in node_static {
            node_attrs.add_column(column.name, column.values)?;
        }
        for column in edge_static {
            edge_attrs.add_column(column.name, column.values)?;
        }

        debug_assert_eq!(node_attrs.row_count(), graph.node_count());
        debug_assert_eq!(edge_attrs.row_count(), graph.edge_count());

        Ok(Self {
            graph,
            node_attrs,
            edge_attrs,
            measures,
            metadata: NetworkMetadata::stamped(derived_from),
        })
    }
}
