//! Row-wise predicate evaluation against attribute tables

use std::collections::BTreeSet;

use super::expr::{parse, CmpOp, Expr, Operand};
use super::{QueryError, QueryResult};
use crate::graph::Graph;
use crate::table::{AttrTable, AttrValue};

/// What a façade-level filter call hands back
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Matching row indices
    Indices(Vec<usize>),
    /// A projected column of the matching rows
    Values(Vec<AttrValue>),
}

impl FilterOutcome {
    /// The matching indices, if no projection was requested
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            FilterOutcome::Indices(ids) => Some(ids),
            FilterOutcome::Values(_) => None,
        }
    }

    /// The projected values, if a projection was requested
    pub fn values(&self) -> Option<&[AttrValue]> {
        match self {
            FilterOutcome::Indices(_) => None,
            FilterOutcome::Values(values) => Some(values),
        }
    }
}

/// Row indices for which the predicate evaluates to true
pub fn filter(table: &AttrTable, predicate: &str) -> QueryResult<Vec<usize>> {
    let expr = parse(predicate)?;
    let mut hits = Vec::new();
    for row in 0..table.row_count() {
        if eval(&expr, table, row)? {
            hits.push(row);
        }
    }
    Ok(hits)
}

/// A single named column of the given rows
pub fn project(table: &AttrTable, indices: &[usize], column: &str) -> QueryResult<Vec<AttrValue>> {
    let values = table.get(column)?;
    Ok(indices.iter().map(|&i| values[i].clone()).collect())
}

/// Resolve attribute values to row indices through a lookup column
///
/// Each queried value must match exactly one row: zero matches fail with
/// `NotFound`, several with `AmbiguousLabel`.
pub fn resolve_labels(
    table: &AttrTable,
    values: &[AttrValue],
    lookup_column: &str,
) -> QueryResult<Vec<usize>> {
    let mut ids = Vec::with_capacity(values.len());
    for value in values {
        let hits = table.positions_of(lookup_column, value)?;
        match hits.len() {
            0 => {
                return Err(QueryError::NotFound {
                    label: value.to_string(),
                    column: lookup_column.to_string(),
                })
            }
            1 => ids.push(hits[0]),
            count => {
                return Err(QueryError::AmbiguousLabel {
                    label: value.to_string(),
                    column: lookup_column.to_string(),
                    count,
                })
            }
        }
    }
    Ok(ids)
}

/// k-hop neighborhood of the rows resolved through a lookup column
///
/// The neighborhoods of all queried labels are unioned.
pub fn neighbors_by_label(
    graph: &Graph,
    table: &AttrTable,
    values: &[AttrValue],
    lookup_column: &str,
    max_distance: usize,
    include_center: bool,
) -> QueryResult<BTreeSet<usize>> {
    let origins = resolve_labels(table, values, lookup_column)?;
    let mut hood = BTreeSet::new();
    for origin in origins {
        hood.extend(graph.neighbors(origin, max_distance, include_center));
    }
    Ok(hood)
}

/// Evaluate an expression against one row
///
/// Both sides of `&` and `|` are evaluated, so a type mismatch surfaces
/// regardless of the other side's value.
fn eval(expr: &Expr, table: &AttrTable, row: usize) -> QueryResult<bool> {
    match expr {
        Expr::Not(inner) => Ok(!eval(inner, table, row)?),
        Expr::And(lhs, rhs) => {
            let lhs = eval(lhs, table, row)?;
            let rhs = eval(rhs, table, row)?;
            Ok(lhs && rhs)
        }
        Expr::Or(lhs, rhs) => {
            let lhs = eval(lhs, table, row)?;
            let rhs = eval(rhs, table, row)?;
            Ok(lhs || rhs)
        }
        Expr::Cmp { lhs, op, rhs } => {
            let lhs = operand_value(lhs, table, row)?;
            let rhs = operand_value(rhs, table, row)?;
            compare(&lhs, *op, &rhs)
        }
    }
}

fn operand_value(operand: &Operand, table: &AttrTable, row: usize) -> QueryResult<AttrValue> {
    match operand {
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Column(name) => Ok(table.get(name)?[row].clone()),
    }
}

fn compare(lhs: &AttrValue, op: CmpOp, rhs: &AttrValue) -> QueryResult<bool> {
    match (lhs, rhs) {
        (AttrValue::Num(a), AttrValue::Num(b)) => Ok(match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }),
        (AttrValue::Str(a), AttrValue::Str(b)) => Ok(match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }),
        // Booleans only support equality
        (AttrValue::Bool(a), AttrValue::Bool(b)) => match op {
            CmpOp::Eq => Ok(a == b),
            CmpOp::Ne => Ok(a != b),
            _ => Err(QueryError::TypeMismatch {
                lhs: lhs.type_name(),
                op,
                rhs: rhs.type_name(),
            }),
        },
        _ => Err(QueryError::TypeMismatch {
            lhs: lhs.type_name(),
            op,
            rhs: rhs.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableError;

    fn degree_table() -> AttrTable {
        let names = (0..10).map(|i| format!("n{}", i)).collect();
        let mut table = AttrTable::from_names(names).unwrap();
        let degrees = [2.0, 9.0, 8.0, 1.0, 0.0, 5.0, 8.0, 3.0, 10.0, 4.0];
        table
            .add_column("degree", degrees.iter().map(|&d| d.into()).collect())
            .unwrap();
        table
            .add_column(
                "color",
                ["red", "blue", "red", "red", "blue", "red", "blue", "red", "red", "blue"]
                    .iter()
                    .map(|&c| c.into())
                    .collect(),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_filter_matches_exact_indices() {
        let table = degree_table();
        let hits = filter(&table, "degree >= 8").unwrap();
        assert_eq!(hits, vec![1, 2, 6, 8]);
    }

    #[test]
    fn test_filter_combines_predicates() {
        let table = degree_table();
        let hits = filter(&table, "degree >= 8 & color == \"red\"").unwrap();
        assert_eq!(hits, vec![2, 8]);

        let hits = filter(&table, "degree < 1 | degree > 9").unwrap();
        assert_eq!(hits, vec![4, 8]);

        let hits = filter(&table, "!(color == \"blue\")").unwrap();
        assert_eq!(hits, vec![0, 2, 3, 5, 7, 8]);
    }

    #[test]
    fn test_filter_column_to_column() {
        let names = vec!["a".into(), "b".into()];
        let mut table = AttrTable::from_names(names).unwrap();
        table
            .add_column("x", vec![1.0.into(), 5.0.into()])
            .unwrap();
        table
            .add_column("y", vec![2.0.into(), 4.0.into()])
            .unwrap();

        let hits = filter(&table, "x < y").unwrap();
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_filter_unknown_column() {
        let table = degree_table();
        let err = filter(&table, "betweenness > 0.5").unwrap_err();
        assert!(matches!(
            err,
            QueryError::Table(TableError::UnknownColumn(c)) if c == "betweenness"
        ));
    }

    #[test]
    fn test_filter_type_mismatch() {
        let table = degree_table();
        let err = filter(&table, "degree == \"eight\"").unwrap_err();
        assert!(matches!(
            err,
            QueryError::TypeMismatch { lhs: "number", rhs: "string", .. }
        ));
    }

    #[test]
    fn test_bool_ordering_is_type_mismatch() {
        let mut table = AttrTable::from_names(vec!["a".into()]).unwrap();
        table.add_column("flag", vec![true.into()]).unwrap();

        assert_eq!(filter(&table, "flag == true").unwrap(), vec![0]);
        assert!(matches!(
            filter(&table, "flag < true"),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_project() {
        let table = degree_table();
        let hits = filter(&table, "degree >= 8").unwrap();
        let colors = project(&table, &hits, "color").unwrap();
        let expected: Vec<AttrValue> = vec!["blue".into(), "red".into(), "blue".into(), "red".into()];
        assert_eq!(colors, expected);
    }

    #[test]
    fn test_resolve_labels() {
        let table = degree_table();
        let ids = resolve_labels(&table, &["n3".into(), "n0".into()], "name").unwrap();
        assert_eq!(ids, vec![3, 0]);
    }

    #[test]
    fn test_resolve_labels_not_found() {
        let table = degree_table();
        let err = resolve_labels(&table, &["zz".into()], "name").unwrap_err();
        assert!(matches!(err, QueryError::NotFound { label, .. } if label == "zz"));
    }

    #[test]
    fn test_resolve_labels_ambiguous() {
        let table = degree_table();
        let err = resolve_labels(&table, &["red".into()], "color").unwrap_err();
        assert!(matches!(
            err,
            QueryError::AmbiguousLabel { count: 6, .. }
        ));
    }
}
