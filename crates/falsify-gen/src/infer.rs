//! Generators inferred from declared shapes.

use crate::collection::{bounded_list, list, map_of, option, set, tuple};
use crate::error::GenResult;
use crate::generate::{unit, Generator};
use crate::primitive::{boolean, float, int, int_range, printable, str};
use crate::value::Value;
use falsify_card::Shape;

/// Build the standard generator for `shape`. The generator's cardinality
/// is the shape's own.
pub fn infer(shape: &Shape) -> GenResult<Generator<Value>> {
    let generator = match shape {
        Shape::Unit => unit().erase(),
        Shape::Bool => boolean().erase(),
        Shape::Int => int().erase(),
        Shape::IntRange(lo, hi) => int_range(*lo, *hi)?.erase(),
        Shape::Float => float().erase(),
        Shape::Char => printable().erase(),
        Shape::Str => str().erase(),
        Shape::Tuple(items) => tuple(items.iter().map(infer).collect::<GenResult<Vec<_>>>()?),
        Shape::List(element) => list(&infer(element)?).erase(),
        Shape::BoundedList { element, min, max } => bounded_list(*min, *max, &infer(element)?)?.erase(),
        Shape::Set(element) => set(&infer(element)?).erase(),
        Shape::Map(key, value) => map_of(&infer(key)?, &infer(value)?).erase(),
        Shape::Option(inner) => option(&infer(inner)?).erase(),
    };
    Ok(generator.with_cardinality(shape.cardinality()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::State;
    use falsify_card::Cardinality;

    fn heads(shape: &Shape, count: usize) -> Vec<Value> {
        let g = infer(shape).unwrap();
        let mut state = State::from_seed(17);
        let mut out = Vec::new();
        for _ in 0..count {
            let (next, d) = g.sample(state);
            state = next;
            out.extend(d.map(|d| d.into_head()));
        }
        out
    }

    #[test]
    fn test_cardinality_follows_shape() {
        let shape = Shape::Tuple(vec![Shape::Bool, Shape::IntRange(0, 4)]);
        assert_eq!(infer(&shape).unwrap().cardinality(), &Cardinality::constant(10));
        assert!(infer(&Shape::Int).unwrap().cardinality().is_infinite());
    }

    #[test]
    fn test_values_match_shape() {
        for v in heads(&Shape::IntRange(-2, 2), 50) {
            assert!(matches!(v, Value::Int(n) if (-2..=2).contains(&n)));
        }
        for v in heads(&Shape::bounded_list(Shape::Bool, 1, 3), 50) {
            let items = v.as_slice().unwrap();
            assert!((1..=3).contains(&items.len()));
            assert!(items.iter().all(|b| b.as_bool().is_some()));
        }
        for v in heads(&Shape::map(Shape::Char, Shape::option(Shape::Float)), 20) {
            assert!(v.as_map().is_some());
        }
        for v in heads(&Shape::Tuple(vec![Shape::Unit, Shape::Str]), 20) {
            let items = v.as_slice().unwrap();
            assert_eq!(items[0], Value::Unit);
            assert!(items[1].as_str().is_some());
        }
    }

    #[test]
    fn test_invalid_range_is_error() {
        assert!(infer(&Shape::IntRange(3, 1)).is_err());
        assert!(infer(&Shape::list(Shape::IntRange(3, 1))).is_err());
    }
}
