//! Reticula: attribute-synchronized network graph layer
//!
//! Wraps a graph (nodes, edges, optional direction and weights) together
//! with per-node and per-edge attribute tables that stay consistent with
//! the topology across every structural mutation. Some columns are
//! *derived*: recomputed from registered functions over the current graph
//! whenever membership changes.
//!
//! # Core concepts
//!
//! - **Graph**: an immutable topology value; transformations return new values
//! - **Attribute tables**: typed column stores, one row per entity, with a
//!   unique `name` column as the only cross-snapshot-stable handle
//! - **Measures**: named functions from topology to value sequences,
//!   refreshed atomically on every structural change
//! - **Network**: the façade composing the three, with copy-on-write
//!   semantics for every mutation
//!
//! # Example
//!
//! ```
//! use reticula::{AttrValue, GraphBuilder, MeasureRegistry, Network};
//!
//! let graph = GraphBuilder::new()
//!     .nodes(["A", "B", "C", "D"])
//!     .edge("A", "B")
//!     .edge("B", "C")
//!     .edge("C", "D")
//!     .build()
//!     .unwrap();
//!
//! let mut measures = MeasureRegistry::new();
//! measures.register_node("degree", |g: &reticula::Graph| -> reticula::MeasureOutput {
//!     Ok(g.degrees().into_iter().map(AttrValue::from).collect())
//! });
//!
//! let network = Network::new(graph, measures).unwrap();
//! let hubs = network.filter_nodes("degree >= 2", Some("name")).unwrap();
//! assert_eq!(hubs.values().unwrap().len(), 2);
//!
//! // mutation returns a new network; the original is untouched
//! let smaller = network
//!     .delete_nodes_by_attribute(&["B".into()], "name")
//!     .unwrap();
//! assert_eq!(smaller.graph().node_count(), 3);
//! assert_eq!(network.graph().node_count(), 4);
//! ```

pub mod graph;
pub mod measure;
pub mod network;
pub mod query;
pub mod table;

pub use graph::{
    EdgeInduceMode, EdgeRec, Graph, GraphBuilder, GraphError, GraphResult, NeighborQuery,
};
pub use measure::{Measure, MeasureError, MeasureOutput, MeasureRegistry, MeasureResult};
pub use network::{EntityKind, Network, NetworkError, NetworkMetadata, NetworkResult};
pub use query::{CmpOp, Expr, FilterOutcome, Operand, QueryError, QueryResult};
pub use table::{AttrTable, AttrValue, Column, TableError, TableResult, NAME_COLUMN};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
