//! Functions for generating random expression trees.
//!
//! Function nodes are drawn uniformly from the operator registry. Terminals are requested from
//! the caller's label generator as either `Kind::Number` or `Kind::Variable`, chosen at random.

use crate::error::Error;
use crate::gp::expr::{self, Arg, DiGraph, Expr, Kind, Label, Node, NodeIndex};
use crate::gp::ops::{self, Operator};
use rand::Rng;
use std::mem;

/// Generate a random expression.
///
/// This function will randomly choose between using `full` and `grow`.
pub fn tree<R, P>(rng: &mut R, depth: u32, pick: P) -> Result<Expr, Error>
where
    R: Rng,
    P: FnMut(Kind) -> Option<Label>,
{
    match rng.gen_range(0, 2) {
        0 => full(rng, depth, pick),
        _ => grow(rng, depth, pick),
    }
}

/// Generate an expression tree using the "full" approach.
///
/// All branches will end with terminals at the given `depth`, while all other nodes will be
/// functions.
pub fn full<R, P>(rng: &mut R, depth: u32, pick: P) -> Result<Expr, Error>
where
    R: Rng,
    P: FnMut(Kind) -> Option<Label>,
{
    generate(rng, depth, pick, |_, _| false)
}

/// Generate an expression tree using the "grow" approach.
///
/// The tree will be "grown" by randomly generating functions and terminals for each node
/// until the maximum depth is reached, where only terminals are generated.
pub fn grow<R, P>(rng: &mut R, depth: u32, pick: P) -> Result<Expr, Error>
where
    R: Rng,
    P: FnMut(Kind) -> Option<Label>,
{
    generate(rng, depth, pick, |rng, levels_left| rng.gen_range(0, levels_left) == 0)
}

/// Generate a random terminal node.
pub fn terminal<R, P>(rng: &mut R, pick: &mut P) -> Result<Node, Error>
where
    R: Rng,
    P: FnMut(Kind) -> Option<Label>,
{
    let kind = match rng.gen_range(0, 2) {
        0 => Kind::Number,
        _ => Kind::Variable,
    };
    let label = pick(kind).ok_or(Error::InvalidGenerator(kind))?;
    Ok(Node { kind, label })
}

/// Select a random operator from the registry.
pub fn operator<R>(rng: &mut R) -> &'static Operator
where
    R: Rng,
{
    &ops::OPERATORS[rng.gen_range(0, ops::OPERATORS.len())]
}

// Fill each depth level one at a time, breadth-first, so the root lands at index `0`.
//
// `stop` decides whether an operand above the final level becomes a terminal, given the number
// of levels left below the current one.
fn generate<R, P, F>(rng: &mut R, depth: u32, mut pick: P, mut stop: F) -> Result<Expr, Error>
where
    R: Rng,
    P: FnMut(Kind) -> Option<Label>,
    F: FnMut(&mut R, u32) -> bool,
{
    if depth <= 1 {
        return terminal(rng, &mut pick).map(Expr::leaf);
    }

    let mut graph = DiGraph::default();
    let root = operator(rng);
    let mut curr: Vec<(NodeIndex, u32)> = vec![(graph.add_node(Node::function(root)), root.arity)];
    let mut next = vec![];
    for d in 1..depth {
        for (a, arity) in curr.drain(..) {
            for arg in 0..arity {
                let b = if d + 1 == depth || stop(rng, depth - d) {
                    graph.add_node(terminal(rng, &mut pick)?)
                } else {
                    let op = operator(rng);
                    let b = graph.add_node(Node::function(op));
                    next.push((b, op.arity));
                    b
                };
                graph.add_edge(b, a, arg as Arg);
            }
        }
        mem::swap(&mut curr, &mut next);
    }

    Ok(expr::clone_subtree(&graph, NodeIndex::new(0)))
}
