//! Predicate filtering, projection, and label resolution
//!
//! Predicates are boolean expressions over attribute column names
//! (`"degree >= 8 & color == \"red\""`), parsed by [`parse`] and evaluated
//! row-wise against an [`AttrTable`](crate::table::AttrTable).

mod expr;
mod filter;

pub use expr::{parse, CmpOp, Expr, Operand};
pub use filter::{filter, neighbors_by_label, project, resolve_labels, FilterOutcome};

use crate::table::TableError;
use thiserror::Error;

/// Errors that can occur while parsing or evaluating queries
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to parse predicate: {0}")]
    Parse(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("cannot compare {lhs} {op} {rhs}")]
    TypeMismatch {
        lhs: &'static str,
        op: CmpOp,
        rhs: &'static str,
    },

    #[error("label '{label}' matches {count} rows in column '{column}'")]
    AmbiguousLabel {
        label: String,
        column: String,
        count: usize,
    },

    #[error("label '{label}' not found in column '{column}'")]
    NotFound { label: String, column: String },
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
