//! Compile an expression tree into a callable function.
//!
//! Compilation produces a tree of closures which is walked on each call, alongside the infix
//! text the operator templates describe.

use crate::error::Error;
use crate::gp::expr::{Expr, Kind, NodeIndex, Source};
use crate::gp::ops::Eval;
use crate::gp::simplify::Bindings;
use fnv::FnvHashMap;
use std::fmt;

type Code = Box<dyn Fn(&[f64]) -> f64>;

/// A compiled expression.
///
/// Arguments are passed positionally, in the order given by `params`.
pub struct Function {
    params: Vec<String>,
    infix: String,
    code: Code,
}

impl Function {
    /// The parameter names, sorted.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The infix form of the expression.
    pub fn infix(&self) -> &str {
        &self.infix
    }

    /// Invoke the function with one argument per parameter.
    pub fn call(&self, args: &[f64]) -> Result<f64, Error> {
        if args.len() != self.params.len() {
            return Err(Error::ArgumentCount { expected: self.params.len(), found: args.len() });
        }
        Ok((self.code)(args))
    }

    /// Invoke the function, looking each parameter up by name.
    pub fn call_with<B>(&self, bindings: &B) -> Result<f64, Error>
    where
        B: Bindings + ?Sized,
    {
        let args = self
            .params
            .iter()
            .map(|p| bindings.get(p).ok_or_else(|| Error::UnboundVariable(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        self.call(&args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("infix", &self.infix)
            .finish()
    }
}

/// Compile the tree into a function.
///
/// The parameter list is the sorted union of `extra_args` and every variable in the tree.
/// Parameters the tree does not reference are accepted but have no effect on the result.
pub fn to_function<'a, S>(source: S, extra_args: &[&str]) -> Result<Function, Error>
where
    S: Into<Source<'a>>,
{
    let expr = source.into().expr()?;

    let mut vars = vec![];
    let infix = express(&expr, expr.root(), &mut vars)?;

    let mut params = extra_args.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    for var in vars {
        if !params.contains(&var) {
            params.push(var);
        }
    }
    params.sort();
    params.dedup();

    let indices = params
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect::<FnvHashMap<_, _>>();
    let code = lower(&expr, expr.root(), &indices)?;

    Ok(Function { params, infix, code })
}

// Build the infix text of the subtree at `nx`, recording variables in traversal order.
fn express(expr: &Expr, nx: NodeIndex, vars: &mut Vec<String>) -> Result<String, Error> {
    let node = expr.node(nx);
    match node.kind {
        Kind::Function => {
            let args = expr
                .children(nx)
                .into_iter()
                .map(|c| express(expr, c, vars))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(node.operator()?.infix(&args))
        }
        Kind::Variable => {
            let name = node.label.to_string();
            if !vars.contains(&name) {
                vars.push(name.clone());
            }
            Ok(name)
        }
        Kind::Number => Ok(node.label.to_string()),
    }
}

// Build the closure tree of the subtree at `nx`.
fn lower(expr: &Expr, nx: NodeIndex, indices: &FnvHashMap<&str, usize>) -> Result<Code, Error> {
    let node = expr.node(nx);
    let code: Code = match node.kind {
        Kind::Number => {
            let value = node.label.value().ok_or_else(|| {
                Error::InvalidTree(format!("number {:?} holds non-numeric label {}", nx, node.label))
            })?;
            Box::new(move |_: &[f64]| value)
        }
        Kind::Variable => {
            let name = node.label.to_string();
            let ix = *indices.get(name.as_str()).ok_or(Error::UnboundVariable(name))?;
            Box::new(move |args: &[f64]| args[ix])
        }
        Kind::Function => {
            let mut operands = expr
                .children(nx)
                .into_iter()
                .map(|c| lower(expr, c, indices))
                .collect::<Result<Vec<_>, _>>()?;
            match node.operator()?.eval() {
                Eval::Unary(f) => {
                    let a = operands.remove(0);
                    Box::new(move |args: &[f64]| f(a(args)))
                }
                Eval::Binary(f) => {
                    let b = operands.remove(1);
                    let a = operands.remove(0);
                    Box::new(move |args: &[f64]| f(a(args), b(args)))
                }
            }
        }
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::simplify::compute;
    use fnv::FnvHashMap;

    #[test]
    fn params_are_sorted_and_deduplicated() {
        let f = to_function("y x * x +", &[]).unwrap();
        assert_eq!(f.params(), ["x", "y"]);
        assert_eq!(f.infix(), "((((y)*(x)))+(x))");
        assert_eq!(f.call(&[2.0, 3.0]), Ok(8.0));
    }

    #[test]
    fn extra_params_are_ignored_by_the_body() {
        let f = to_function("x 1 +", &["b", "x"]).unwrap();
        assert_eq!(f.params(), ["b", "x"]);
        assert_eq!(f.call(&[100.0, 1.0]), Ok(2.0));
        assert_eq!(f.call(&[1.0]), Err(Error::ArgumentCount { expected: 2, found: 1 }));
    }

    #[test]
    fn agrees_with_compute() {
        let rpn = "y y * x x * + sqrt x y atan2 -";
        let mut vars = FnvHashMap::default();
        vars.insert("x".to_string(), 3.0);
        vars.insert("y".to_string(), 4.0);
        let f = to_function(rpn, &[]).unwrap();
        assert_eq!(f.call_with(&vars), compute(rpn, &vars));
    }

    #[test]
    fn constant_functions_take_no_arguments() {
        let f = to_function("2 sqrt floor", &[]).unwrap();
        assert!(f.params().is_empty());
        assert_eq!(f.call(&[]), Ok(1.0));
    }
}
