//! Common items related to Genetic Programming.
//!
//! Expressions are trees of nodes with some level of arity - aka the number of inputs. Branches
//! are `Function`s drawn from the operator registry in `ops`, leaves are `Number` constants or
//! named `Variable`s.
//!
//! - `rpn`: parse and serialize the postfix text format.
//! - `validate`: structural well-formedness checks.
//! - `simplify`: constant folding, variable substitution and full evaluation.
//! - `genetic`: point mutation, single-tree crossover and two-tree reproduction.
//! - `gen`: random tree generation (full and grow).
//! - `compile`: compile a tree into a callable function.

pub mod compile;
pub mod expr;
pub mod gen;
pub mod genetic;
pub mod ops;
pub mod rpn;
pub mod sample;
pub mod simplify;
pub mod validate;
