//! Conversion between expression trees and whitespace delimited RPN text.
//!
//! A token is either a registered operator symbol, a finite floating-point literal (optionally
//! signed) or, failing both, a variable name. There is no unary minus: `-42` is a single
//! literal token while a standalone `-` is always the binary operator.

use crate::error::{Error, Malformed};
use crate::gp::expr::{self, Arg, DiGraph, Expr, Kind, Label, Node, NodeIndex};
use crate::gp::ops;
use log::debug;

/// Interpret a token as a numeric literal.
///
/// Only finite values are literals. Tokens such as `inf` or `NaN` are names.
pub fn parse_literal(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classify a single non-operator token as a leaf node.
pub fn leaf(token: &str) -> Node {
    match parse_literal(token) {
        Some(value) => Node::number(value),
        None => Node::variable(token),
    }
}

/// Parse a tree from RPN text.
///
/// Operands are collected on a stack. An operator pops exactly `arity` subtrees and becomes
/// their parent, keeping them in their original left-to-right order. Exactly one subtree must
/// remain once all tokens are consumed.
pub fn parse(rpn: &str) -> Result<Expr, Error> {
    let mut graph = DiGraph::default();
    let mut stack: Vec<NodeIndex> = vec![];

    for (position, token) in rpn.split_whitespace().enumerate() {
        if let Ok(op) = ops::lookup(token) {
            let arity = op.arity as usize;
            if stack.len() < arity {
                let err = Malformed::MissingOperands {
                    operator: token.to_string(),
                    position,
                    arity: op.arity,
                    found: stack.len(),
                };
                debug!("rejecting {:?}: {}", rpn, err);
                return Err(err.into());
            }
            let operands = stack.split_off(stack.len() - arity);
            let nx = graph.add_node(Node::function(op));
            for (arg, child) in operands.into_iter().enumerate() {
                graph.add_edge(child, nx, arg as Arg);
            }
            stack.push(nx);
        } else {
            stack.push(graph.add_node(leaf(token)));
        }
    }

    match stack.len() {
        0 => Err(Malformed::Empty.into()),
        // Re-layout so the root is at index `0`.
        1 => Ok(expr::clone_subtree(&graph, stack[0])),
        n => {
            let err = Malformed::LeftoverOperands(n);
            debug!("rejecting {:?}: {}", rpn, err);
            Err(err.into())
        }
    }
}

/// Serialize a tree as RPN text.
///
/// Each function emits its operands in order followed by its own symbol. A leaf emits its
/// label.
pub fn serialize(expr: &Expr) -> String {
    let mut tokens = Vec::with_capacity(expr.len());
    write_tokens(expr, expr.root(), &mut tokens);
    tokens.join(" ")
}

fn write_tokens(expr: &Expr, nx: NodeIndex, tokens: &mut Vec<String>) {
    let node = expr.node(nx);
    if node.kind == Kind::Function {
        for child in expr.children(nx) {
            write_tokens(expr, child, tokens);
        }
    }
    tokens.push(match node.label {
        Label::Symbol(ref s) => s.clone(),
        Label::Value(v) => v.to_string(),
    });
}
