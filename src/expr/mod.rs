//! Guard expressions for conditional directives.
//!
//! Guards are small boolean expressions over symbols, e.g. `DEV && MODE != 'test'`.
//! Parsing can fail; evaluation cannot. Unknown symbols evaluate to
//! `Value::Undefined`, which is falsy.

pub mod lexer;
pub mod parser;

use crate::env::{SymbolTable, Value};
use std::cmp::Ordering;
use thiserror::Error;

pub use parser::parse;

/// Error produced while parsing a guard expression
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at column {}", .column + 1)]
pub struct ExprError {
    pub message: String,
    /// Byte offset into the guard text (0-based)
    pub column: usize,
}

impl ExprError {
    pub fn new(message: impl Into<String>, column: usize) -> Self {
        Self {
            message: message.into(),
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Parsed guard expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    Defined(String),
    Unary(UnaryOp, Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate to a value against the given symbols
    pub fn eval(&self, symbols: &dyn SymbolTable) -> Value {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Ident(name) => symbols.lookup(name),
            Expr::Defined(name) => Value::Bool(symbols.lookup(name).is_defined()),
            Expr::Unary(UnaryOp::Not, inner) => Value::Bool(!inner.eval(symbols).truthy()),
            Expr::Unary(UnaryOp::Neg, inner) => match inner.eval(symbols) {
                Value::Number(n) => Value::Number(-n),
                Value::Bool(b) => Value::Number(if b { -1.0 } else { 0.0 }),
                Value::String(s) => Value::Number(s.trim().parse::<f64>().map(|n| -n).unwrap_or(f64::NAN)),
                _ => Value::Number(f64::NAN),
            },
            Expr::Binary { op: BinaryOp::And, lhs, rhs } => {
                Value::Bool(lhs.eval(symbols).truthy() && rhs.eval(symbols).truthy())
            }
            Expr::Binary { op: BinaryOp::Or, lhs, rhs } => {
                Value::Bool(lhs.eval(symbols).truthy() || rhs.eval(symbols).truthy())
            }
            Expr::Binary { op, lhs, rhs } => {
                let (a, b) = (lhs.eval(symbols), rhs.eval(symbols));
                let result = match op {
                    BinaryOp::Eq => a.loose_eq(&b),
                    BinaryOp::Ne => !a.loose_eq(&b),
                    BinaryOp::Lt => a.loose_cmp(&b) == Some(Ordering::Less),
                    BinaryOp::Le => matches!(a.loose_cmp(&b), Some(Ordering::Less | Ordering::Equal)),
                    BinaryOp::Gt => a.loose_cmp(&b) == Some(Ordering::Greater),
                    BinaryOp::Ge => matches!(a.loose_cmp(&b), Some(Ordering::Greater | Ordering::Equal)),
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                };
                Value::Bool(result)
            }
        }
    }

    /// Evaluate as a guard condition
    pub fn test(&self, symbols: &dyn SymbolTable) -> bool {
        self.eval(symbols).truthy()
    }
}
