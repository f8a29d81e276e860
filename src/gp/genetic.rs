//! Genetic operators: point mutation, single-tree crossover and two-tree reproduction.
//!
//! All operators select nodes uniformly at random via `sample::reservoir` over a breadth-first
//! walk, using the given random number generator.

use crate::error::Error;
use crate::gp::expr::{Expr, Kind, Label, NodeIndex, Source};
use crate::gp::{ops, sample};
use log::{debug, trace};
use rand::Rng;

/// Replace the label of one randomly selected node.
///
/// A function node receives a random operator of the same arity, so the shape of the tree never
/// changes. Any other node receives a label from `pick`, requested as either `Kind::Number` or
/// `Kind::Variable` at random. The node's `kind` itself is left as it was.
///
/// Returns `Error::InvalidGenerator` if `pick` yields no label, in which case the tree is left
/// untouched.
pub fn mutate<R, P>(rng: &mut R, expr: &mut Expr, mut pick: P) -> Result<(), Error>
where
    R: Rng,
    P: FnMut(Kind) -> Option<Label>,
{
    let selected = sample::reservoir(rng, expr.bfs().map(|(nx, _)| nx)).unwrap_or(expr.root());
    let label = match expr.node(selected).kind {
        Kind::Function => {
            let arity = expr.node(selected).operator()?.arity;
            let pool = ops::with_arity(arity).collect::<Vec<_>>();
            let op = pool[rng.gen_range(0, pool.len())];
            Label::Symbol(op.symbol.to_string())
        }
        Kind::Number | Kind::Variable => {
            let kind = match rng.gen_range(0, 2) {
                0 => Kind::Number,
                _ => Kind::Variable,
            };
            pick(kind).ok_or(Error::InvalidGenerator(kind))?
        }
    };
    trace!("mutating {:?}: {} -> {}", selected, expr.node(selected).label, label);
    expr.node_mut(selected).label = label;
    Ok(())
}

/// Swap two randomly selected subtrees within the same tree.
///
/// The first node is chosen among all non-root nodes, the second among non-root nodes that are
/// neither an ancestor nor a descendant of the first. Returns the swapped pair, or `None` if no
/// second node qualifies, in which case the tree is unchanged.
pub fn crossover<R>(rng: &mut R, expr: &mut Expr) -> Option<(NodeIndex, NodeIndex)>
where
    R: Rng,
{
    let a = sample::reservoir(rng, expr.bfs().filter(|&(_, p)| p.is_some()).map(|(nx, _)| nx))?;
    let b = {
        let candidates = expr
            .bfs()
            .filter(|&(_, p)| p.is_some())
            .map(|(nx, _)| nx)
            .filter(|&nx| !expr.is_ancestor(nx, a) && !expr.is_ancestor(a, nx));
        sample::reservoir(rng, candidates)
    };
    let b = match b {
        Some(b) => b,
        None => {
            debug!("crossover of {} found no partner for {:?}", expr, a);
            return None;
        }
    };
    trace!("crossover swapping {:?} and {:?}", a, b);
    expr.swap_subtrees(a, b);
    Some((a, b))
}

/// Produce a child of `sup` carrying a random subtree of `sub`.
///
/// `sup` is copied (or parsed) first so the caller's tree is never modified. A random non-root
/// node of the copy is replaced by a copy of a random node of `sub`, root included. If `sup`
/// consists of a single node, the copy is returned unchanged.
pub fn reproduce<'a, 'b, R, A, B>(rng: &mut R, sup: A, sub: B) -> Result<Expr, Error>
where
    R: Rng,
    A: Into<Source<'a>>,
    B: Into<Source<'b>>,
{
    let mut child = sup.into().to_expr()?;
    let sub = sub.into().expr()?;

    let pivot = sample::reservoir(rng, child.bfs().filter(|&(_, p)| p.is_some()).map(|(nx, _)| nx));
    let given = sample::reservoir(rng, sub.bfs().map(|(nx, _)| nx));
    match (pivot, given) {
        (Some(pivot), Some(given)) => {
            trace!("grafting {:?} of {} onto {:?} of {}", given, sub, pivot, child);
            let transferred = sub.clone_subtree(given);
            child.replace_subtree(pivot, &transferred);
        }
        _ => debug!("reproduction of {} has no pivot, returning it unchanged", child),
    }
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::validate::is_expression_tree;
    use rand::prng::XorShiftRng;
    use rand::SeedableRng;

    fn pick(kind: Kind) -> Option<Label> {
        match kind {
            Kind::Number => Some(Label::Value(2.5)),
            Kind::Variable => Some(Label::Symbol("z".to_string())),
            Kind::Function => None,
        }
    }

    #[test]
    fn mutate_keeps_arity() {
        let mut rng = XorShiftRng::from_seed([3; 16]);
        let mut expr = Expr::from_rpn("x abs y -").unwrap();
        for _ in 0..50 {
            mutate(&mut rng, &mut expr, pick).unwrap();
            assert!(is_expression_tree(&expr));
            assert_eq!(expr.len(), 4);
            let root = expr.node(expr.root()).operator().unwrap();
            assert_eq!(root.arity, 2);
        }
    }

    #[test]
    fn mutate_without_a_label_fails_cleanly() {
        let mut rng = XorShiftRng::from_seed([3; 16]);
        let mut expr = Expr::from_rpn("x").unwrap();
        let err = mutate(&mut rng, &mut expr, |_| None).unwrap_err();
        match err {
            Error::InvalidGenerator(Kind::Number) | Error::InvalidGenerator(Kind::Variable) => (),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(expr.to_rpn(), "x");
    }

    #[test]
    fn crossover_swaps_siblings() {
        let mut rng = XorShiftRng::from_seed([9; 16]);
        let mut expr = Expr::from_rpn("1 2 +").unwrap();
        assert!(crossover(&mut rng, &mut expr).is_some());
        assert_eq!(expr.to_rpn(), "2 1 +");
    }

    #[test]
    fn crossover_without_partner() {
        let mut rng = XorShiftRng::from_seed([9; 16]);
        let mut expr = Expr::from_rpn("x abs").unwrap();
        assert_eq!(crossover(&mut rng, &mut expr), None);
        assert_eq!(expr.to_rpn(), "x abs");
        let mut expr = Expr::from_rpn("x").unwrap();
        assert_eq!(crossover(&mut rng, &mut expr), None);
    }

    #[test]
    fn reproduce_grafts_into_a_copy() {
        let mut rng = XorShiftRng::from_seed([5; 16]);
        let sup = Expr::from_rpn("1 2 +").unwrap();
        let child = reproduce(&mut rng, &sup, "x").unwrap();
        let rpn = child.to_rpn();
        assert!(rpn == "x 2 +" || rpn == "1 x +", "unexpected child {}", rpn);
        assert_eq!(sup.to_rpn(), "1 2 +");
    }

    #[test]
    fn reproduce_single_node_recipient() {
        let mut rng = XorShiftRng::from_seed([5; 16]);
        let child = reproduce(&mut rng, "x", "y y *").unwrap();
        assert_eq!(child.to_rpn(), "x");
        assert!(reproduce(&mut rng, "x +", "y").is_err());
    }
}
