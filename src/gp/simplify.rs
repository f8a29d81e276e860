//! Constant folding, variable substitution and evaluation.

use crate::error::Error;
use crate::gp::expr::{Expr, Kind, Node, NodeIndex, Source};
use fnv::FnvHashMap;
use petgraph::visit::{EdgeRef, Topo};
use petgraph::Incoming;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// A source of numeric values for named variables.
pub trait Bindings {
    /// The value bound to the given variable name, if any.
    fn get(&self, name: &str) -> Option<f64>;
}

/// No bindings at all.
impl Bindings for () {
    fn get(&self, _name: &str) -> Option<f64> {
        None
    }
}

impl<K, S> Bindings for HashMap<K, f64, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn get(&self, name: &str) -> Option<f64> {
        HashMap::get(self, name).cloned()
    }
}

impl<K> Bindings for BTreeMap<K, f64>
where
    K: Borrow<str> + Ord,
{
    fn get(&self, name: &str) -> Option<f64> {
        BTreeMap::get(self, name).cloned()
    }
}

impl<'a, B> Bindings for &'a B
where
    B: Bindings + ?Sized,
{
    fn get(&self, name: &str) -> Option<f64> {
        (**self).get(name)
    }
}

impl Expr {
    /// Fold constants in place, first substituting any bound variables.
    ///
    /// Nodes are visited children first. A function whose operands are all numbers becomes a
    /// number holding the result, and its former operands are detached. Functions with any
    /// remaining non-numeric operand keep their kind along with whatever operands did fold.
    pub fn simplify<B>(&mut self, bindings: &B) -> &mut Self
    where
        B: Bindings + ?Sized,
    {
        let mut topo = Topo::new(self.graph());
        while let Some(nx) = topo.next(self.graph()) {
            if let Some(folded) = self.fold(nx, bindings) {
                self.sever_children(nx);
                *self.node_mut(nx) = folded;
            }
        }
        self.compact();
        self
    }

    /// Fold constants only. Equivalent to `simplify` with no bindings.
    pub fn reduce(&mut self) -> &mut Self {
        self.simplify(&())
    }

    // The number the node at `nx` collapses to, given its operands have been visited.
    fn fold<B>(&self, nx: NodeIndex, bindings: &B) -> Option<Node>
    where
        B: Bindings + ?Sized,
    {
        let node = self.node(nx);
        match node.kind {
            Kind::Function => {
                let args = self
                    .children(nx)
                    .into_iter()
                    .map(|c| {
                        let child = self.node(c);
                        match child.kind {
                            Kind::Number => child.label.value(),
                            _ => None,
                        }
                    })
                    .collect::<Option<Vec<f64>>>()?;
                let op = node.operator().ok()?;
                Some(Node::number(op.apply(&args)))
            }
            Kind::Variable => bindings.get(&node.label.to_string()).map(Node::number),
            Kind::Number => None,
        }
    }
}

/// Evaluate the tree given a value for each of its variables.
///
/// Every variable must be bound, otherwise `Error::UnboundVariable` names the first one found
/// breadth-first. The tree itself is never modified.
pub fn compute<'a, S, B>(source: S, bindings: &B) -> Result<f64, Error>
where
    S: Into<Source<'a>>,
    B: Bindings + ?Sized,
{
    let expr = source.into().expr()?;

    // Are all vars there?
    for (nx, _) in expr.bfs() {
        let node = expr.node(nx);
        if node.kind == Kind::Variable {
            let name = node.label.to_string();
            if bindings.get(&name).is_none() {
                return Err(Error::UnboundVariable(name));
            }
        }
    }

    let graph = expr.graph();
    let mut topo = Topo::new(graph);
    let mut evaluated = FnvHashMap::with_capacity_and_hasher(graph.node_count(), Default::default());
    while let Some(nx) = topo.next(graph) {
        let node = &graph[nx];
        let value = match node.kind {
            Kind::Number => node.label.value().ok_or_else(|| {
                Error::InvalidTree(format!("number {:?} holds non-numeric label {}", nx, node.label))
            })?,
            Kind::Variable => bindings
                .get(&node.label.to_string())
                .ok_or_else(|| Error::UnboundVariable(node.label.to_string()))?,
            Kind::Function => {
                let mut inputs = graph
                    .edges_directed(nx, Incoming)
                    .map(|e| (*e.weight(), evaluated[&e.source()]))
                    .collect::<Vec<_>>();
                inputs.sort_by_key(|&(arg, _)| arg);
                let inputs = inputs.into_iter().map(|(_, v)| v).collect::<Vec<f64>>();
                node.operator()?.apply(&inputs)
            }
        };
        evaluated.insert(nx, value);
    }
    Ok(evaluated[&expr.root()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnv::FnvHashMap;

    fn bind(pairs: &[(&str, f64)]) -> FnvHashMap<String, f64> {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn partial_bindings_fold_bound_branches() {
        let mut expr = Expr::from_rpn("y y * x x * + sqrt").unwrap();
        assert_eq!(expr.simplify(&bind(&[("t", 1.0)])).to_rpn(), "y y * x x * + sqrt");
        assert_eq!(expr.simplify(&bind(&[("x", 1.0)])).to_rpn(), "y y * 1 + sqrt");
        assert_eq!(expr.len(), 6);
        assert_eq!(expr.simplify(&bind(&[("x", 1.0), ("y", 0.0)])).to_rpn(), "1");
        assert_eq!(expr.len(), 1);
    }

    #[test]
    fn reduce_folds_literals_only() {
        let mut expr = Expr::from_rpn("7 -6 * x +").unwrap();
        assert_eq!(expr.reduce().to_rpn(), "-42 x +");
        let mut expr = Expr::from_rpn("7 -7 * 7 +").unwrap();
        assert_eq!(expr.reduce().to_rpn(), "-42");
    }

    #[test]
    fn compute_requires_every_variable() {
        assert_eq!(compute("7 -7 * 7 +", &()), Ok(-42.0));
        assert_eq!(compute("7 -7 * x +", &bind(&[("x", 7.0)])), Ok(-42.0));
        assert_eq!(
            compute("7 -7 * x +", &()),
            Err(Error::UnboundVariable("x".to_string()))
        );
    }

    #[test]
    fn compute_leaves_the_tree_alone() {
        let expr = Expr::from_rpn("x 2 * 1 -").unwrap();
        let mut vars = BTreeMap::new();
        vars.insert("x", 4.0);
        assert_eq!(compute(&expr, &vars), Ok(7.0));
        assert_eq!(expr.to_rpn(), "x 2 * 1 -");
    }
}
