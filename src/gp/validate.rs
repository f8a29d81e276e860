//! Structural well-formedness checks.

use crate::error::Error;
use crate::gp::expr::{DiGraph, Kind, NodeIndex, Source};
use crate::gp::rpn;
use fnv::FnvHashSet;
use petgraph::visit::EdgeRef;
use petgraph::{Incoming, Outgoing};

/// Whether the input describes a well-formed expression tree.
///
/// RPN text is valid if and only if it parses. Trees are checked with `check_graph`.
pub fn is_expression_tree<'a, S>(source: S) -> bool
where
    S: Into<Source<'a>>,
{
    match source.into() {
        Source::Rpn(rpn) => rpn::parse(rpn).is_ok(),
        Source::Tree(expr) => is_graph_expression_tree(expr.graph(), expr.root()),
    }
}

/// Whether the graph holds a well-formed tree rooted at `root`.
pub fn is_graph_expression_tree(graph: &DiGraph, root: NodeIndex) -> bool {
    check_graph(graph, root).is_ok()
}

/// Check every tree invariant of the graph rooted at `root`.
///
/// - The root exists and has no parent.
/// - Each child has exactly one parent link, and it leads to the node listing it as an operand.
/// - Operand positions of a node are exactly `0..n`.
/// - Functions name a registered operator and have as many operands as its arity.
/// - Numbers and variables have no operands.
/// - Every node in the graph is reachable from the root exactly once.
pub fn check_graph(graph: &DiGraph, root: NodeIndex) -> Result<(), Error> {
    fn invalid(msg: String) -> Result<(), Error> {
        Err(Error::InvalidTree(msg))
    }

    if root.index() >= graph.node_count() {
        return invalid(format!("root {:?} is not in the graph", root));
    }
    if graph.edges_directed(root, Outgoing).next().is_some() {
        return invalid(format!("root {:?} has a parent", root));
    }

    let mut visited = FnvHashSet::default();
    let mut stack = vec![root];
    while let Some(nx) = stack.pop() {
        if !visited.insert(nx) {
            return invalid(format!("node {:?} is reachable more than once", nx));
        }

        let mut operands = graph
            .edges_directed(nx, Incoming)
            .map(|e| (*e.weight(), e.source()))
            .collect::<Vec<_>>();
        operands.sort_by_key(|&(arg, _)| arg);
        for (i, &(arg, _)) in operands.iter().enumerate() {
            if arg as usize != i {
                return invalid(format!("node {:?} has operand positions out of order", nx));
            }
        }

        let node = &graph[nx];
        match node.kind {
            Kind::Function => {
                let op = match node.operator() {
                    Ok(op) => op,
                    Err(_) => return invalid(format!("node {:?} names no operator: {}", nx, node.label)),
                };
                if op.arity as usize != operands.len() {
                    return invalid(format!(
                        "`{}` at {:?} expects {} operands, found {}",
                        op.symbol,
                        nx,
                        op.arity,
                        operands.len()
                    ));
                }
            }
            Kind::Number | Kind::Variable => {
                if !operands.is_empty() {
                    return invalid(format!("leaf {:?} has operands", nx));
                }
            }
        }

        for &(_, child) in &operands {
            if graph.edges_directed(child, Outgoing).count() != 1 {
                return invalid(format!("node {:?} does not have exactly one parent", child));
            }
            stack.push(child);
        }
    }

    if visited.len() != graph.node_count() {
        return invalid(format!(
            "{} nodes are unreachable from the root",
            graph.node_count() - visited.len()
        ));
    }
    Ok(())
}
