//! Error types for the crate.
//!
//! Every fallible operation returns `Result<_, Error>`. Nothing panics on malformed input, and an
//! operation that fails leaves any tree it was given untouched.

use crate::gp::expr::Kind;
use thiserror::Error;

/// Reasons an RPN string does not describe exactly one tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Malformed {
    /// The input contained no tokens.
    #[error("no tokens")]
    Empty,
    /// An operator token was reached with too few operands on the stack.
    #[error("operator `{operator}` at token {position} expects {arity} operands, found {found}")]
    MissingOperands {
        operator: String,
        position: usize,
        arity: u32,
        found: usize,
    },
    /// More than one subtree remained once all tokens were consumed.
    #[error("{0} operands left on the stack")]
    LeftoverOperands(usize),
}

/// The error type shared by all expression operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// The RPN text could not be parsed into a tree.
    #[error("malformed RPN input: {0}")]
    MalformedInput(#[from] Malformed),
    /// A value given in place of a tree does not satisfy the tree invariants.
    #[error("invalid expression tree: {0}")]
    InvalidTree(String),
    /// A variable in the tree has no numeric binding.
    #[error("unbound variable: {0}")]
    UnboundVariable(String),
    /// The label generator did not produce a label for the requested kind.
    #[error("label generator produced nothing for {0:?}")]
    InvalidGenerator(Kind),
    /// The symbol is not in the operator registry.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    /// A compiled function was called with the wrong number of arguments.
    #[error("expected {expected} arguments, found {found}")]
    ArgumentCount { expected: usize, found: usize },
}
