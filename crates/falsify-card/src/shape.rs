//! Closed description of parameter domains.
//!
//! A `Shape` is the declared type of a property parameter. Cardinality and
//! (in `falsify-gen`) generators are inferred from it by plain dispatch
//! over the variants.

use crate::expr::Cardinality;
use std::fmt;

/// Variable used for the unknown length of unbounded collections.
pub const LENGTH_VAR: &str = "n";

/// Number of characters in the printable ASCII alphabet used for text.
pub const PRINTABLE_CARDINALITY: u64 = 100;

/// Declared shape of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Unit,
    Bool,
    /// Unbounded integer.
    Int,
    /// Integer in an inclusive range.
    IntRange(i64, i64),
    Float,
    Char,
    Str,
    Tuple(Vec<Shape>),
    List(Box<Shape>),
    /// List whose length lies in an inclusive range.
    BoundedList {
        element: Box<Shape>,
        min: usize,
        max: usize,
    },
    Set(Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Option(Box<Shape>),
}

impl Shape {
    pub fn list(element: Shape) -> Self {
        Shape::List(Box::new(element))
    }

    pub fn bounded_list(element: Shape, min: usize, max: usize) -> Self {
        Shape::BoundedList {
            element: Box::new(element),
            min,
            max,
        }
    }

    pub fn set(element: Shape) -> Self {
        Shape::Set(Box::new(element))
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Shape::Map(Box::new(key), Box::new(value))
    }

    pub fn option(inner: Shape) -> Self {
        Shape::Option(Box::new(inner))
    }

    /// Infer the cardinality of this shape's domain.
    ///
    /// Tuples multiply, bounded collections of element cardinality `c` and
    /// maximum size `k` give `c^k`, unbounded collections give `c^n`, and
    /// unbounded scalars are infinite.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Shape::Unit => Cardinality::one(),
            Shape::Bool => Cardinality::constant(2),
            Shape::Int | Shape::Float => Cardinality::Infinite,
            Shape::IntRange(lo, hi) => range_size(*lo, *hi),
            Shape::Char => Cardinality::constant(PRINTABLE_CARDINALITY),
            Shape::Str => Cardinality::constant(PRINTABLE_CARDINALITY).pow(length()),
            Shape::Tuple(items) => Cardinality::product_all(items.iter().map(Shape::cardinality)),
            Shape::List(element) | Shape::Set(element) => element.cardinality().pow(length()),
            Shape::BoundedList { element, max, .. } => element
                .cardinality()
                .pow(Cardinality::constant(*max as u64)),
            Shape::Map(key, value) => (key.cardinality() * value.cardinality()).pow(length()),
            Shape::Option(inner) => inner.cardinality() + Cardinality::one(),
        }
    }
}

fn length() -> Cardinality {
    Cardinality::var(LENGTH_VAR)
}

fn range_size(lo: i64, hi: i64) -> Cardinality {
    if hi < lo {
        return Cardinality::zero();
    }
    let width = (i128::from(hi) - i128::from(lo) + 1) as u128;
    u64::try_from(width).map_or(Cardinality::Infinite, Cardinality::constant)
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Unit => write!(f, "()"),
            Shape::Bool => write!(f, "bool"),
            Shape::Int => write!(f, "int"),
            Shape::IntRange(lo, hi) => write!(f, "{}..={}", lo, hi),
            Shape::Float => write!(f, "float"),
            Shape::Char => write!(f, "char"),
            Shape::Str => write!(f, "str"),
            Shape::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Shape::List(e) => write!(f, "list[{}]", e),
            Shape::BoundedList { element, min, max } => {
                write!(f, "list[{}; {}..={}]", element, min, max)
            }
            Shape::Set(e) => write!(f, "set[{}]", e),
            Shape::Map(k, v) => write!(f, "map[{}, {}]", k, v),
            Shape::Option(e) => write!(f, "option[{}]", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymptotic::AsymptoticClass;

    #[test]
    fn test_scalars() {
        assert_eq!(Shape::Bool.cardinality(), Cardinality::constant(2));
        assert_eq!(Shape::Unit.cardinality(), Cardinality::one());
        assert!(Shape::Int.cardinality().is_infinite());
        assert!(Shape::Float.cardinality().is_infinite());
        assert_eq!(Shape::IntRange(0, 100).cardinality(), Cardinality::constant(101));
        assert_eq!(Shape::IntRange(i64::MIN, i64::MAX).cardinality(), Cardinality::Infinite);
    }

    #[test]
    fn test_tuple_is_product() {
        let s = Shape::Tuple(vec![Shape::Bool, Shape::IntRange(1, 3), Shape::Unit]);
        assert_eq!(s.cardinality(), Cardinality::constant(6));
        assert_eq!(Shape::Tuple(vec![]).cardinality(), Cardinality::one());
    }

    #[test]
    fn test_bounded_collection_is_power() {
        let s = Shape::bounded_list(Shape::Bool, 0, 4);
        assert_eq!(s.cardinality(), Cardinality::constant(16));
    }

    #[test]
    fn test_unbounded_collections() {
        let s = Shape::list(Shape::Bool);
        assert_eq!(s.cardinality(), Cardinality::power(Cardinality::constant(2), Cardinality::var("n")));
        assert_eq!(s.cardinality().asymptotic_class(), AsymptoticClass::Polynomial);
        assert!(Shape::list(Shape::Int).cardinality().is_infinite());
        assert!(Shape::map(Shape::Bool, Shape::Float).cardinality().is_infinite());
    }

    #[test]
    fn test_option_adds_one() {
        assert_eq!(Shape::option(Shape::Bool).cardinality(), Cardinality::constant(3));
    }

    #[test]
    fn test_display() {
        let s = Shape::map(Shape::Str, Shape::list(Shape::option(Shape::Int)));
        assert_eq!(s.to_string(), "map[str, list[option[int]]]");
    }
}
