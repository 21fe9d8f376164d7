//! Inspection of generator output.

use crate::dissect::{Dissection, Forced};
use crate::generate::Generator;
use crate::prng::State;
use tracing::debug;

/// Draw one value and collect a slice of its shrink tree: the root
/// followed by the values of a breadth-first walk visiting at most
/// `max_width` children per node down to `max_depth` levels.
pub fn slice<T: Clone + 'static>(
    generator: &Generator<T>,
    max_width: usize,
    max_depth: usize,
    state: State,
) -> (State, Option<Vec<T>>) {
    let (state, drawn) = generator.sample(state);
    let Some(root) = drawn else {
        debug!("no result to slice");
        return (state, None);
    };
    let mut values = Vec::new();
    let mut level: Vec<Dissection<T>> = vec![root];
    for depth in 0..=max_depth {
        let mut next = Vec::new();
        for node in &level {
            values.push(node.head().clone());
            if depth < max_depth {
                next.extend(node.children().take(max_width));
            }
        }
        level = next;
    }
    (state, Some(values))
}

/// Draw one value and force its shrink tree to the given width and depth.
pub fn tree<T: Clone + 'static>(
    generator: &Generator<T>,
    max_width: usize,
    max_depth: usize,
    state: State,
) -> (State, Option<Forced<T>>) {
    let (state, drawn) = generator.sample(state);
    (state, drawn.map(|d| d.forced(max_width, max_depth)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::int_range;

    #[test]
    fn test_slice_root_first() {
        let g = int_range(0, 1000).unwrap();
        let (_, root) = g.sample(State::from_seed(1));
        let root = root.unwrap().into_head();
        let (_, values) = slice(&g, 3, 2, State::from_seed(1));
        let values = values.unwrap();
        assert_eq!(values[0], root);
        assert!(values.len() <= 1 + 3 + 9);
        assert!(values[1..].iter().all(|v| *v < root));
    }

    #[test]
    fn test_slice_no_result() {
        let g = int_range(0, 10).unwrap().filter(|_| false);
        let (_, values) = slice(&g, 3, 2, State::from_seed(1));
        assert!(values.is_none());
    }

    #[test]
    fn test_tree_depth_zero() {
        let g = int_range(5, 10).unwrap();
        let (_, t) = tree(&g, 4, 0, State::from_seed(3));
        assert!(t.unwrap().children.is_empty());
    }
}
