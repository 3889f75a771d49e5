//! Graph topology and structural operations

mod topology;
mod traverse;

pub use topology::{EdgeInduceMode, EdgeRec, Graph, GraphBuilder, GraphError, GraphResult};
pub use traverse::NeighborQuery;
