//! Predicate expression AST and parser
//!
//! Grammar, loosest-binding first:
//!
//! ```text
//! expr       := and ( '|' and )*
//! and        := unary ( '&' unary )*
//! unary      := '!' unary | '(' expr ')' | comparison
//! comparison := operand ('==' | '!=' | '<=' | '>=' | '<' | '>') operand
//! operand    := identifier | "string" | number | true | false
//! ```
//!
//! Identifiers reference attribute columns; everything else is a literal.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, none_of},
    combinator::{map, recognize, value},
    multi::many0,
    number::complete::double,
    sequence::{delimited, pair, preceded, tuple},
    Finish, IResult,
};

use super::{QueryError, QueryResult};
use crate::table::AttrValue;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", symbol)
    }
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Reference to an attribute column
    Column(String),
    /// Literal value
    Literal(AttrValue),
}

/// A parsed predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Cmp {
        lhs: Operand,
        op: CmpOp,
        rhs: Operand,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

type ParseResult<'a, T> = IResult<&'a str, T>;

/// Parse a predicate expression
///
/// Fails with `QueryError::Parse` on malformed or trailing input.
pub fn parse(input: &str) -> QueryResult<Expr> {
    match or_expr(input).finish() {
        Ok((rest, expr)) if rest.trim().is_empty() => Ok(expr),
        Ok((rest, _)) => Err(QueryError::Parse(format!(
            "unexpected trailing input: {:?}",
            rest.trim()
        ))),
        Err(e) => Err(QueryError::Parse(format!("{:?}", e))),
    }
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn or_expr(input: &str) -> ParseResult<'_, Expr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(char('|')), and_expr))(input)?;
    Ok((
        input,
        rest.into_iter()
            .fold(first, |acc, e| Expr::Or(Box::new(acc), Box::new(e))),
    ))
}

fn and_expr(input: &str) -> ParseResult<'_, Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(ws(char('&')), unary))(input)?;
    Ok((
        input,
        rest.into_iter()
            .fold(first, |acc, e| Expr::And(Box::new(acc), Box::new(e))),
    ))
}

fn unary(input: &str) -> ParseResult<'_, Expr> {
    alt((
        map(preceded(ws(char('!')), unary), |e| Expr::Not(Box::new(e))),
        delimited(ws(char('(')), or_expr, ws(char(')'))),
        comparison,
    ))(input)
}

fn comparison(input: &str) -> ParseResult<'_, Expr> {
    map(
        tuple((ws(operand), cmp_op, ws(operand))),
        |(lhs, op, rhs)| Expr::Cmp { lhs, op, rhs },
    )(input)
}

fn cmp_op(input: &str) -> ParseResult<'_, CmpOp> {
    alt((
        value(CmpOp::Le, tag("<=")),
        value(CmpOp::Ge, tag(">=")),
        value(CmpOp::Eq, tag("==")),
        value(CmpOp::Ne, tag("!=")),
        value(CmpOp::Lt, tag("<")),
        value(CmpOp::Gt, tag(">")),
    ))(input)
}

fn operand(input: &str) -> ParseResult<'_, Operand> {
    // identifiers before numbers: `double` would otherwise eat the "inf"
    // prefix of a column like `inf_rate`
    alt((
        map(string_literal, |s| Operand::Literal(AttrValue::Str(s))),
        map(identifier, |id| match id {
            "true" => Operand::Literal(AttrValue::Bool(true)),
            "false" => Operand::Literal(AttrValue::Bool(false)),
            _ => Operand::Column(id.to_string()),
        }),
        map(double, |n| Operand::Literal(AttrValue::Num(n))),
    ))(input)
}

fn identifier(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// Double-quoted string with `\"` and `\\` escapes
fn string_literal(input: &str) -> ParseResult<'_, String> {
    delimited(
        char('"'),
        map(
            many0(alt((
                value('"', tag("\\\"")),
                value('\\', tag("\\\\")),
                none_of("\"\\"),
            ))),
            |chars| chars.into_iter().collect(),
        ),
        char('"'),
    )(input)
}
