//! Asymptotic classification of cardinality expressions.
//!
//! Every expression is placed on a fixed ladder by its dominant term:
//! `O(1) < O(log n) < O(n) < O(n²) < O(n^k) < O(∞)`. Constant factors and
//! lower-order additive terms are ignored. Exponential growth has no rung
//! of its own and lands on `O(n^k)`.

use crate::expr::Cardinality;
use std::fmt;

/// A rung of the asymptotic ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AsymptoticClass {
    Constant,
    Logarithmic,
    Linear,
    Quadratic,
    Polynomial,
    Infinite,
}

impl AsymptoticClass {
    pub const LADDER: [AsymptoticClass; 6] = [
        AsymptoticClass::Constant,
        AsymptoticClass::Logarithmic,
        AsymptoticClass::Linear,
        AsymptoticClass::Quadratic,
        AsymptoticClass::Polynomial,
        AsymptoticClass::Infinite,
    ];

    pub fn notation(&self) -> &'static str {
        match self {
            AsymptoticClass::Constant => "O(1)",
            AsymptoticClass::Logarithmic => "O(log n)",
            AsymptoticClass::Linear => "O(n)",
            AsymptoticClass::Quadratic => "O(n²)",
            AsymptoticClass::Polynomial => "O(n^k)",
            AsymptoticClass::Infinite => "O(∞)",
        }
    }
}

impl fmt::Display for AsymptoticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

/// Finer growth measure used while walking the expression.
///
/// Variant order is growth order; `Poly` compares by degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Growth {
    Constant,
    Log,
    Poly(u32),
    Exponential,
    Infinite,
}

impl From<Growth> for AsymptoticClass {
    fn from(growth: Growth) -> Self {
        match growth {
            Growth::Constant | Growth::Poly(0) => AsymptoticClass::Constant,
            Growth::Log => AsymptoticClass::Logarithmic,
            Growth::Poly(1) => AsymptoticClass::Linear,
            Growth::Poly(2) => AsymptoticClass::Quadratic,
            Growth::Poly(_) | Growth::Exponential => AsymptoticClass::Polynomial,
            Growth::Infinite => AsymptoticClass::Infinite,
        }
    }
}

/// Classify an expression onto the asymptotic ladder.
pub fn classify(expr: &Cardinality) -> AsymptoticClass {
    growth(&expr.simplify()).into()
}

impl Cardinality {
    pub fn asymptotic_class(&self) -> AsymptoticClass {
        classify(self)
    }
}

fn growth(expr: &Cardinality) -> Growth {
    match expr {
        Cardinality::Constant(_) => Growth::Constant,
        Cardinality::Variable(_) => Growth::Poly(1),
        Cardinality::Infinite => Growth::Infinite,
        Cardinality::Sum(a, b) => growth(a).max(growth(b)),
        Cardinality::Product(a, b) => product_growth(growth(a), growth(b)),
        Cardinality::Power(base, exponent) => power_growth(base, exponent),
        Cardinality::Logarithm(e) => match growth(e) {
            Growth::Constant => Growth::Constant,
            Growth::Log | Growth::Poly(_) => Growth::Log,
            Growth::Exponential => Growth::Poly(1),
            Growth::Infinite => Growth::Infinite,
        },
    }
}

fn product_growth(a: Growth, b: Growth) -> Growth {
    use Growth::*;
    match (a, b) {
        (Infinite, _) | (_, Infinite) => Infinite,
        (Exponential, _) | (_, Exponential) => Exponential,
        (Constant, other) | (other, Constant) => other,
        // n·log n and log²n round down to the larger factor's rung.
        (Log, other) | (other, Log) => other,
        (Poly(x), Poly(y)) => Poly(x.saturating_add(y)),
    }
}

fn power_growth(base: &Cardinality, exponent: &Cardinality) -> Growth {
    let base_growth = growth(base);
    match (base_growth, exponent) {
        (Growth::Infinite, _) => Growth::Infinite,
        (_, Cardinality::Constant(k)) => match base_growth {
            Growth::Poly(d) => Growth::Poly(d.saturating_mul(u32::try_from(*k).unwrap_or(u32::MAX))),
            other => other,
        },
        _ => match growth(exponent) {
            Growth::Infinite => Growth::Infinite,
            Growth::Constant => base_growth,
            // c^(log n) = n^(log c)
            Growth::Log if base_growth == Growth::Constant => Growth::Poly(1),
            _ => Growth::Exponential,
        },
    }
}
