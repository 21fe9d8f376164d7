//! Symbolic cardinality expressions.
//!
//! A `Cardinality` is a small AST over naturals. Expressions are kept in a
//! canonical form by [`Cardinality::simplify`]; the arithmetic operators and
//! the `pow`/`log` builders simplify on construction, so expressions built
//! through them are always canonical.

use crate::error::{CardError, CardResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul};

/// Value substituted for variables that have no explicit binding.
pub const DEFAULT_BINDING: u64 = 100;

/// Symbolic size of a domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Constant(u64),
    Variable(String),
    Sum(Box<Cardinality>, Box<Cardinality>),
    Product(Box<Cardinality>, Box<Cardinality>),
    Power(Box<Cardinality>, Box<Cardinality>),
    /// Base-2 logarithm, floored.
    Logarithm(Box<Cardinality>),
    Infinite,
}

/// Result of evaluating an expression under variable bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Magnitude {
    Finite(u64),
    /// The computation exceeded `u64::MAX`. Treated exactly like `Infinite`.
    Saturated,
    Infinite,
}

impl Magnitude {
    /// True for `Saturated` and `Infinite`.
    pub fn is_unbounded(self) -> bool {
        !matches!(self, Magnitude::Finite(_))
    }

    pub fn finite(self) -> Option<u64> {
        match self {
            Magnitude::Finite(n) => Some(n),
            Magnitude::Saturated | Magnitude::Infinite => None,
        }
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Finite(n) => write!(f, "{}", n),
            Magnitude::Saturated => write!(f, ">{}", u64::MAX),
            Magnitude::Infinite => write!(f, "∞"),
        }
    }
}

/// Variable assignments used by [`Cardinality::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, u64>,
    default: Option<u64>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl Bindings {
    /// Bindings where every unbound variable evaluates to [`DEFAULT_BINDING`].
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            default: Some(DEFAULT_BINDING),
        }
    }

    /// Bindings that reject unbound variables.
    pub fn strict() -> Self {
        Self {
            values: BTreeMap::new(),
            default: None,
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: u64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with_default(mut self, default: Option<u64>) -> Self {
        self.default = default;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied().or(self.default)
    }
}

// === Constructors ===

impl Cardinality {
    pub fn zero() -> Self {
        Cardinality::Constant(0)
    }

    pub fn one() -> Self {
        Cardinality::Constant(1)
    }

    pub fn constant(n: u64) -> Self {
        Cardinality::Constant(n)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Cardinality::Variable(name.into())
    }

    /// Unsimplified sum node.
    pub fn sum(left: Cardinality, right: Cardinality) -> Self {
        Cardinality::Sum(Box::new(left), Box::new(right))
    }

    /// Unsimplified product node.
    pub fn product(left: Cardinality, right: Cardinality) -> Self {
        Cardinality::Product(Box::new(left), Box::new(right))
    }

    /// Unsimplified power node.
    pub fn power(base: Cardinality, exponent: Cardinality) -> Self {
        Cardinality::Power(Box::new(base), Box::new(exponent))
    }

    /// Unsimplified logarithm node.
    pub fn logarithm(expr: Cardinality) -> Self {
        Cardinality::Logarithm(Box::new(expr))
    }

    /// `self ^ exponent`, simplified.
    pub fn pow(self, exponent: Cardinality) -> Self {
        Cardinality::power(self, exponent).simplify()
    }

    /// `log2(self)`, simplified.
    pub fn log(self) -> Self {
        Cardinality::logarithm(self).simplify()
    }

    /// Sum of an iterator of expressions, simplified. Empty sums are zero.
    pub fn sum_all(items: impl IntoIterator<Item = Cardinality>) -> Self {
        items
            .into_iter()
            .fold(Cardinality::zero(), |acc, item| acc + item)
    }

    /// Product of an iterator of expressions, simplified. Empty products are one.
    pub fn product_all(items: impl IntoIterator<Item = Cardinality>) -> Self {
        items
            .into_iter()
            .fold(Cardinality::one(), |acc, item| acc * item)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Cardinality::Infinite)
    }

    pub fn as_constant(&self) -> Option<u64> {
        match self {
            Cardinality::Constant(n) => Some(*n),
            _ => None,
        }
    }
}

impl Add for Cardinality {
    type Output = Cardinality;

    fn add(self, rhs: Cardinality) -> Cardinality {
        Cardinality::sum(self, rhs).simplify()
    }
}

impl Mul for Cardinality {
    type Output = Cardinality;

    fn mul(self, rhs: Cardinality) -> Cardinality {
        Cardinality::product(self, rhs).simplify()
    }
}

// === Simplification ===

impl Cardinality {
    /// Rewrite into canonical form.
    ///
    /// Rules: constant folding, `x+0=x`, `x*1=x`, `x*0=0`, `x^0=1`, `x^1=x`,
    /// `0^x=0`, `1^x=1`, `log(1)=0`. `Infinite` absorbs sums, products and
    /// powers (after the zero/one rules). Constant folds that overflow `u64`
    /// become `Infinite`.
    pub fn simplify(&self) -> Cardinality {
        match self {
            Cardinality::Constant(_) | Cardinality::Variable(_) | Cardinality::Infinite => {
                self.clone()
            }
            Cardinality::Sum(left, right) => simplify_sum(left.simplify(), right.simplify()),
            Cardinality::Product(left, right) => {
                simplify_product(left.simplify(), right.simplify())
            }
            Cardinality::Power(base, exponent) => {
                simplify_power(base.simplify(), exponent.simplify())
            }
            Cardinality::Logarithm(expr) => simplify_log(expr.simplify()),
        }
    }
}

fn simplify_sum(left: Cardinality, right: Cardinality) -> Cardinality {
    use Cardinality::*;
    match (left, right) {
        (Infinite, _) | (_, Infinite) => Infinite,
        (Constant(0), other) | (other, Constant(0)) => other,
        (Constant(a), Constant(b)) => a.checked_add(b).map_or(Infinite, Constant),
        (left, right) => Cardinality::sum(left, right),
    }
}

fn simplify_product(left: Cardinality, right: Cardinality) -> Cardinality {
    use Cardinality::*;
    match (left, right) {
        (Constant(0), _) | (_, Constant(0)) => Constant(0),
        (Constant(1), other) | (other, Constant(1)) => other,
        (Infinite, _) | (_, Infinite) => Infinite,
        (Constant(a), Constant(b)) => a.checked_mul(b).map_or(Infinite, Constant),
        (left, right) => Cardinality::product(left, right),
    }
}

fn simplify_power(base: Cardinality, exponent: Cardinality) -> Cardinality {
    use Cardinality::*;
    match (base, exponent) {
        (_, Constant(0)) => Constant(1),
        (base, Constant(1)) => base,
        (Constant(0), _) => Constant(0),
        (Constant(1), _) => Constant(1),
        (Infinite, _) | (_, Infinite) => Infinite,
        (Constant(a), Constant(b)) => u32::try_from(b)
            .ok()
            .and_then(|b| a.checked_pow(b))
            .map_or(Infinite, Constant),
        (base, exponent) => Cardinality::power(base, exponent),
    }
}

fn simplify_log(expr: Cardinality) -> Cardinality {
    use Cardinality::*;
    match expr {
        Infinite => Infinite,
        Constant(0) | Constant(1) => Constant(0),
        Constant(n) => Constant(u64::from(n.ilog2())),
        expr => Cardinality::logarithm(expr),
    }
}

// === Evaluation ===

impl Cardinality {
    /// Evaluate with variables substituted from `bindings`.
    ///
    /// Arithmetic saturates: any intermediate result past `u64::MAX` yields
    /// [`Magnitude::Saturated`], which then propagates like `Infinite`.
    pub fn evaluate(&self, bindings: &Bindings) -> CardResult<Magnitude> {
        use Magnitude::*;
        Ok(match self {
            Cardinality::Constant(n) => Finite(*n),
            Cardinality::Infinite => Infinite,
            Cardinality::Variable(name) => match bindings.get(name) {
                Some(n) => Finite(n),
                None => {
                    return Err(CardError::UnboundVariable { name: name.clone() });
                }
            },
            Cardinality::Sum(left, right) => {
                match (left.evaluate(bindings)?, right.evaluate(bindings)?) {
                    (Infinite, _) | (_, Infinite) => Infinite,
                    (Saturated, _) | (_, Saturated) => Saturated,
                    (Finite(a), Finite(b)) => a.checked_add(b).map_or(Saturated, Finite),
                }
            }
            Cardinality::Product(left, right) => {
                match (left.evaluate(bindings)?, right.evaluate(bindings)?) {
                    (Finite(0), _) | (_, Finite(0)) => Finite(0),
                    (Infinite, _) | (_, Infinite) => Infinite,
                    (Saturated, _) | (_, Saturated) => Saturated,
                    (Finite(a), Finite(b)) => a.checked_mul(b).map_or(Saturated, Finite),
                }
            }
            Cardinality::Power(base, exponent) => {
                match (base.evaluate(bindings)?, exponent.evaluate(bindings)?) {
                    (_, Finite(0)) => Finite(1),
                    (Finite(0), _) => Finite(0),
                    (Finite(1), _) => Finite(1),
                    (Infinite, _) | (_, Infinite) => Infinite,
                    (Saturated, _) | (_, Saturated) => Saturated,
                    (Finite(a), Finite(b)) => u32::try_from(b)
                        .ok()
                        .and_then(|b| a.checked_pow(b))
                        .map_or(Saturated, Finite),
                }
            }
            Cardinality::Logarithm(expr) => match expr.evaluate(bindings)? {
                Finite(0) | Finite(1) => Finite(0),
                Finite(n) => Finite(u64::from(n.ilog2())),
                other => other,
            },
        })
    }

    /// Names of all variables occurring in the expression.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Cardinality::Variable(name) => {
                out.insert(name.clone());
            }
            Cardinality::Sum(a, b) | Cardinality::Product(a, b) | Cardinality::Power(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Cardinality::Logarithm(e) => e.collect_variables(out),
            Cardinality::Constant(_) | Cardinality::Infinite => {}
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Constant(n) => write!(f, "{}", n),
            Cardinality::Variable(name) => write!(f, "{}", name),
            Cardinality::Sum(a, b) => write!(f, "({} + {})", a, b),
            Cardinality::Product(a, b) => write!(f, "({} * {})", a, b),
            Cardinality::Power(a, b) => {
                let wrap = |e: &Cardinality| match e {
                    Cardinality::Power(..) => format!("({})", e),
                    _ => e.to_string(),
                };
                write!(f, "{}^{}", wrap(a), wrap(b))
            }
            Cardinality::Logarithm(e) => write!(f, "log({})", e),
            Cardinality::Infinite => write!(f, "∞"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Cardinality {
        Cardinality::var("n")
    }

    #[test]
    fn test_identity_rules() {
        let x = n();
        assert_eq!(Cardinality::sum(x.clone(), Cardinality::zero()).simplify(), x);
        assert_eq!(Cardinality::product(x.clone(), Cardinality::one()).simplify(), x);
        assert_eq!(
            Cardinality::product(x.clone(), Cardinality::zero()).simplify(),
            Cardinality::zero()
        );
        assert_eq!(
            Cardinality::power(x.clone(), Cardinality::zero()).simplify(),
            Cardinality::one()
        );
        assert_eq!(Cardinality::power(x.clone(), Cardinality::one()).simplify(), x);
    }

    #[test]
    fn test_nested_identity() {
        // x * 1 + 0 == x
        let e = Cardinality::sum(
            Cardinality::product(n(), Cardinality::one()),
            Cardinality::zero(),
        );
        assert_eq!(e.simplify(), n().simplify());
    }

    #[test]
    fn test_constant_folding() {
        let e = Cardinality::product(
            Cardinality::sum(Cardinality::constant(2), Cardinality::constant(3)),
            Cardinality::power(Cardinality::constant(2), Cardinality::constant(10)),
        );
        assert_eq!(e.simplify(), Cardinality::constant(5 * 1024));
        assert_eq!(Cardinality::constant(1024).log(), Cardinality::constant(10));
        assert_eq!(Cardinality::constant(1).log(), Cardinality::zero());
    }

    #[test]
    fn test_fold_overflow_is_infinite() {
        let e = Cardinality::constant(2).pow(Cardinality::constant(64));
        assert_eq!(e, Cardinality::Infinite);
        let e = Cardinality::constant(u64::MAX) + Cardinality::one();
        assert_eq!(e, Cardinality::Infinite);
    }

    #[test]
    fn test_infinite_poisons() {
        assert!((n() + Cardinality::Infinite).is_infinite());
        assert!((Cardinality::Infinite * n()).is_infinite());
        assert!(Cardinality::Infinite.pow(n()).is_infinite());
        assert!(Cardinality::constant(3).pow(Cardinality::Infinite).is_infinite());
        // zero and one rules win
        assert_eq!(Cardinality::Infinite * Cardinality::zero(), Cardinality::zero());
        assert_eq!(
            Cardinality::Infinite.pow(Cardinality::zero()),
            Cardinality::one()
        );
    }

    #[test]
    fn test_evaluate_with_bindings() {
        let e = Cardinality::sum(Cardinality::power(n(), Cardinality::constant(2)), Cardinality::var("m"));
        let b = Bindings::new().with("n", 7).with("m", 1);
        assert_eq!(e.evaluate(&b).unwrap(), Magnitude::Finite(50));
        // default binding for m
        let b = Bindings::new().with("n", 2);
        assert_eq!(e.evaluate(&b).unwrap(), Magnitude::Finite(4 + DEFAULT_BINDING));
    }

    #[test]
    fn test_evaluate_unbound_strict() {
        let err = n().evaluate(&Bindings::strict()).unwrap_err();
        assert!(matches!(err, CardError::UnboundVariable { ref name } if name == "n"));
    }

    #[test]
    fn test_evaluate_saturates() {
        let e = Cardinality::power(n(), n());
        let b = Bindings::new().with("n", 100);
        assert_eq!(e.evaluate(&b).unwrap(), Magnitude::Saturated);
        let e = Cardinality::sum(e, Cardinality::one());
        assert!(e.evaluate(&b).unwrap().is_unbounded());
        let e = Cardinality::product(Cardinality::power(n(), n()), Cardinality::zero());
        assert_eq!(e.evaluate(&b).unwrap(), Magnitude::Finite(0));
    }

    #[test]
    fn test_variables() {
        let e = Cardinality::sum(n(), Cardinality::logarithm(Cardinality::var("size")));
        let vars: Vec<_> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["n".to_string(), "size".to_string()]);
    }

    #[test]
    fn test_display() {
        let e = Cardinality::sum(n(), Cardinality::constant(5));
        assert_eq!(e.to_string(), "(n + 5)");
        let e = Cardinality::power(Cardinality::constant(2), n());
        assert_eq!(e.to_string(), "2^n");
        assert_eq!(Cardinality::logarithm(n()).to_string(), "log(n)");
        assert_eq!(Cardinality::Infinite.to_string(), "∞");
    }
}
