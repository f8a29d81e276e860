//! The fixed operator registry.
//!
//! Each operator has a symbol (its RPN token), an arity and an infix template with positional
//! slots (`{0}`, `{1}`) used when synthesizing code for a tree.

use crate::error::Error;

/// How an operator combines its operand values.
#[derive(Copy, Clone)]
pub enum Eval {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

/// A registered operator.
#[derive(Copy, Clone)]
pub struct Operator {
    /// The token that names the operator in RPN text.
    pub symbol: &'static str,
    /// The number of operands consumed.
    pub arity: u32,
    /// Infix template with positional operand slots.
    pub template: &'static str,
    eval: Eval,
}

/// All registered operators.
pub static OPERATORS: [Operator; 14] = [
    Operator { symbol: "-", arity: 2, template: "(({0})-({1}))", eval: Eval::Binary(sub) },
    Operator { symbol: "*", arity: 2, template: "(({0})*({1}))", eval: Eval::Binary(mul) },
    Operator { symbol: "+", arity: 2, template: "(({0})+({1}))", eval: Eval::Binary(add) },
    Operator { symbol: "%", arity: 2, template: "(({0})%({1}))", eval: Eval::Binary(rem) },
    Operator { symbol: "abs", arity: 1, template: "abs({0})", eval: Eval::Unary(f64::abs) },
    Operator { symbol: "floor", arity: 1, template: "floor({0})", eval: Eval::Unary(f64::floor) },
    Operator { symbol: "min", arity: 2, template: "min({0}, {1})", eval: Eval::Binary(min) },
    Operator { symbol: "max", arity: 2, template: "max({0}, {1})", eval: Eval::Binary(max) },
    Operator { symbol: "sqrt", arity: 1, template: "sqrt({0})", eval: Eval::Unary(f64::sqrt) },
    Operator { symbol: "cbrt", arity: 1, template: "cbrt({0})", eval: Eval::Unary(f64::cbrt) },
    Operator { symbol: "cos", arity: 1, template: "cos({0})", eval: Eval::Unary(f64::cos) },
    Operator { symbol: "sin", arity: 1, template: "sin({0})", eval: Eval::Unary(f64::sin) },
    Operator { symbol: "tan", arity: 1, template: "tan({0})", eval: Eval::Unary(f64::tan) },
    Operator { symbol: "atan2", arity: 2, template: "atan2({0}, {1})", eval: Eval::Binary(f64::atan2) },
];

fn sub(a: f64, b: f64) -> f64 {
    a - b
}

fn mul(a: f64, b: f64) -> f64 {
    a * b
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

// Truncated remainder, the result takes the sign of the dividend.
fn rem(a: f64, b: f64) -> f64 {
    a % b
}

// Unlike `f64::min`, a NaN operand poisons the result.
fn min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        ::std::f64::NAN
    } else {
        a.min(b)
    }
}

fn max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        ::std::f64::NAN
    } else {
        a.max(b)
    }
}

/// Find the operator registered under the given symbol.
pub fn lookup(symbol: &str) -> Result<&'static Operator, Error> {
    OPERATORS
        .iter()
        .find(|op| op.symbol == symbol)
        .ok_or_else(|| Error::UnknownOperator(symbol.to_string()))
}

/// Whether or not the token names a registered operator.
pub fn is_operator(symbol: &str) -> bool {
    OPERATORS.iter().any(|op| op.symbol == symbol)
}

/// All operators with the given arity, in registry order.
pub fn with_arity(arity: u32) -> impl Iterator<Item = &'static Operator> {
    OPERATORS.iter().filter(move |op| op.arity == arity)
}

impl Operator {
    /// Apply the operator to its operand values.
    ///
    /// `args.len()` must equal `self.arity`.
    pub fn apply(&self, args: &[f64]) -> f64 {
        match self.eval {
            Eval::Unary(f) => f(args[0]),
            Eval::Binary(f) => f(args[0], args[1]),
        }
    }

    /// The evaluation function of the operator.
    pub fn eval(&self) -> Eval {
        self.eval
    }

    /// Substitute the given operand fragments into the infix template.
    pub fn infix<S>(&self, args: &[S]) -> String
    where
        S: AsRef<str>,
    {
        let mut code = self.template.to_string();
        for (i, arg) in args.iter().enumerate() {
            code = code.replace(&format!("{{{}}}", i), arg.as_ref());
        }
        code
    }
}

impl ::std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("arity", &self.arity)
            .field("template", &self.template)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup("atan2").unwrap().arity, 2);
        assert_eq!(lookup("cbrt").unwrap().arity, 1);
        assert_eq!(lookup("/").unwrap_err(), Error::UnknownOperator("/".to_string()));
        assert!(!is_operator("x"));
    }

    #[test]
    fn arity_pools_partition_the_registry() {
        let unary = with_arity(1).count();
        let binary = with_arity(2).count();
        assert_eq!(unary, 7);
        assert_eq!(binary, 7);
        assert_eq!(unary + binary, OPERATORS.len());
    }

    #[test]
    fn apply_and_infix() {
        assert_eq!(lookup("%").unwrap().apply(&[-7.0, 3.0]), -1.0);
        assert!(lookup("min").unwrap().apply(&[::std::f64::NAN, 1.0]).is_nan());
        assert_eq!(lookup("max").unwrap().apply(&[2.0, 5.0]), 5.0);
        assert_eq!(lookup("-").unwrap().infix(&["x", "1"]), "((x)-(1))");
        assert_eq!(lookup("sqrt").unwrap().infix(&["((a)+(b))"]), "sqrt(((a)+(b)))");
    }
}
