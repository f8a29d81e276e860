extern crate fnv;
extern crate proptest;
extern crate rand;
extern crate rpn_gp;

use fnv::FnvHashMap;
use proptest::prelude::*;
use rand::prng::XorShiftRng;
use rand::SeedableRng;
use rpn_gp::gp::compile::to_function;
use rpn_gp::gp::expr::{copy, Expr, Kind, Label};
use rpn_gp::gp::genetic::{crossover, mutate, reproduce};
use rpn_gp::gp::simplify::compute;
use rpn_gp::gp::validate::is_expression_tree;
use rpn_gp::gp::gen;

// Cycles through a handful of constants and the variables `a`, `b` and `c`.
fn cycling_pick() -> impl FnMut(Kind) -> Option<Label> {
    let mut n = 0usize;
    move |kind| {
        n += 1;
        match kind {
            Kind::Number => Some(Label::Value([0.5, 2.0, 3.0, -1.25, 7.0][n % 5])),
            Kind::Variable => Some(Label::Symbol(["a", "b", "c"][n % 3].to_string())),
            Kind::Function => None,
        }
    }
}

fn random_tree(seed: [u8; 16], depth: u32) -> (XorShiftRng, Expr) {
    let mut rng = XorShiftRng::from_seed(seed);
    let expr = gen::tree(&mut rng, depth, cycling_pick()).unwrap();
    (rng, expr)
}

fn bindings() -> FnvHashMap<String, f64> {
    let mut vars = FnvHashMap::default();
    vars.insert("a".to_string(), 1.5);
    vars.insert("b".to_string(), -2.25);
    vars.insert("c".to_string(), 0.75);
    vars
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    #[test]
    fn rpn_round_trips(seed in any::<[u8; 16]>(), depth in 1u32..7) {
        let (_, expr) = random_tree(seed, depth);
        let rpn = expr.to_rpn();
        let parsed = Expr::from_rpn(&rpn).unwrap();
        prop_assert!(is_expression_tree(&parsed));
        prop_assert_eq!(parsed.to_rpn(), rpn);
    }

    #[test]
    fn mutation_preserves_shape(seed in any::<[u8; 16]>(), depth in 1u32..7) {
        let (mut rng, mut expr) = random_tree(seed, depth);
        let shape = |e: &Expr| e.bfs().map(|(nx, _)| e.children(nx).len()).collect::<Vec<_>>();
        let before = shape(&expr);
        mutate(&mut rng, &mut expr, cycling_pick()).unwrap();
        prop_assert!(is_expression_tree(&expr));
        prop_assert_eq!(shape(&expr), before);
    }

    #[test]
    fn crossover_swaps_unrelated_subtrees(seed in any::<[u8; 16]>(), depth in 1u32..7) {
        let (mut rng, mut expr) = random_tree(seed, depth);
        let before = expr.clone();
        if let Some((a, b)) = crossover(&mut rng, &mut expr) {
            prop_assert!(a != expr.root() && b != expr.root());
            prop_assert!(!before.is_ancestor(a, b));
            prop_assert!(!before.is_ancestor(b, a));
        }
        prop_assert!(is_expression_tree(&expr));
        prop_assert_eq!(expr.len(), before.len());
    }

    #[test]
    fn reproduction_leaves_parents_alone(
        seed in any::<[u8; 16]>(),
        sup_depth in 1u32..6,
        sub_depth in 1u32..6,
    ) {
        let (mut rng, sup) = random_tree(seed, sup_depth);
        let sub = gen::tree(&mut rng, sub_depth, cycling_pick()).unwrap();
        let (sup_rpn, sub_rpn) = (sup.to_rpn(), sub.to_rpn());
        let child = reproduce(&mut rng, &sup, &sub).unwrap();
        prop_assert!(is_expression_tree(&child));
        prop_assert_eq!(sup.to_rpn(), sup_rpn);
        prop_assert_eq!(sub.to_rpn(), sub_rpn);
    }

    #[test]
    fn copies_do_not_alias(seed in any::<[u8; 16]>(), depth in 1u32..7) {
        let (mut rng, expr) = random_tree(seed, depth);
        let rpn = expr.to_rpn();
        let mut clone = copy(&expr).unwrap();
        prop_assert_eq!(clone.to_rpn(), rpn.clone());
        mutate(&mut rng, &mut clone, cycling_pick()).unwrap();
        crossover(&mut rng, &mut clone);
        clone.simplify(&bindings());
        prop_assert_eq!(expr.to_rpn(), rpn);
    }

    #[test]
    fn compiled_matches_computed(seed in any::<[u8; 16]>(), depth in 1u32..7) {
        let (_, expr) = random_tree(seed, depth);
        let vars = bindings();
        let computed = compute(&expr, &vars).unwrap();
        let compiled = to_function(&expr, &[]).unwrap().call_with(&vars).unwrap();
        prop_assert!(same(computed, compiled), "{} vs {} for {}", computed, compiled, expr);

        let mut folded = expr.clone();
        folded.simplify(&vars);
        prop_assert_eq!(folded.len(), 1);
        let value = folded.node(folded.root()).label.value();
        prop_assert!(value.map_or(false, |v| same(v, computed)));
    }
}
