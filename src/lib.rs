//! Expression trees for symbolic regression and genetic programming.
//!
//! Formulas are written as whitespace delimited RPN strings (e.g. `"y y * x x * + sqrt"`) or
//! held as `gp::expr::Expr` trees. See the `gp` module for parsing, evaluation, the genetic
//! operators and compilation into callable functions.

pub mod error;
pub mod gp;

pub use error::{Error, Malformed};
