//! Property: generators are deterministic under a seed, stay within their
//! declared domains, and only ever offer simpler shrink candidates: each
//! child is shorter than its parent or, at equal length, has a strictly
//! smaller element.

use falsify_gen::collection::{bounded_list, bounded_map, bounded_set, list};
use falsify_gen::primitive::{int, int_range, word};
use falsify_gen::{Dissection, Forced, Generator, State};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn heads<T: Clone + 'static>(g: &Generator<T>, seed: u64, count: usize) -> Vec<Option<T>> {
    let mut state = State::from_seed(seed);
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let (next, d) = g.sample(state);
        state = next;
        out.push(d.map(Dissection::into_head));
    }
    out
}

fn every_child<T: Clone>(f: &Forced<T>, check: &dyn Fn(&T, &T) -> bool) -> bool {
    f.children
        .iter()
        .all(|c| check(&f.value, &c.value) && every_child(c, check))
}

#[test]
fn bounded_list_respects_bounds_over_many_draws() {
    let g = bounded_list(0, 5, &int_range(0, 100).unwrap()).unwrap();
    for drawn in heads(&g, 42, 1000) {
        let xs = drawn.expect("bounded lists of ranges always produce a value");
        assert!(xs.len() <= 5);
        assert!(xs.iter().all(|x| (0..=100).contains(x)));
    }
}

#[test]
fn repeated_seed_reproduces_whole_trees() {
    let g = list(&int());
    let (_, a) = g.sample(State::from_seed(99));
    let (_, b) = g.sample(State::from_seed(99));
    assert_eq!(a.unwrap().forced(4, 3), b.unwrap().forced(4, 3));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn same_seed_same_values(seed in any::<u64>()) {
        let g = bounded_list(0, 8, &word()).unwrap();
        prop_assert_eq!(heads(&g, seed, 10), heads(&g, seed, 10));
    }

    #[test]
    fn int_range_stays_in_range(seed in any::<u64>(), lo in -1000i64..1000, width in 0i64..1000) {
        let hi = lo + width;
        let g = int_range(lo, hi).unwrap();
        for v in heads(&g, seed, 20) {
            let v = v.unwrap();
            prop_assert!(lo <= v && v <= hi, "{} outside {}..={}", v, lo, hi);
        }
    }

    #[test]
    fn int_shrinks_move_toward_zero(seed in any::<u64>()) {
        let (_, d) = int().sample(State::from_seed(seed));
        let tree = d.unwrap().forced(6, 4);
        let ok = every_child(&tree, &|parent: &i64, child: &i64| child.abs() < parent.abs());
        prop_assert!(ok, "int shrink moved away from zero under {}", tree.value);
    }

    #[test]
    fn list_shrinks_are_shorter_or_simpler(seed in any::<u64>()) {
        let g = bounded_list(1, 6, &int_range(-20, 20).unwrap()).unwrap();
        let (_, d) = g.sample(State::from_seed(seed));
        let tree = d.unwrap().forced(5, 3);
        let ok = every_child(&tree, &|parent: &Vec<i64>, child: &Vec<i64>| {
            if child.is_empty() {
                return false;
            }
            child.len() < parent.len()
                || (child.len() == parent.len()
                    && child.iter().zip(parent).any(|(c, p)| c.abs() < p.abs()))
        });
        prop_assert!(ok, "list shrink grew or stalled under {:?}", tree.value);
    }

    #[test]
    fn set_shrinks_are_shorter_or_simpler(seed in any::<u64>()) {
        let g = bounded_set(2, 5, &int_range(0, 50).unwrap()).unwrap();
        let (_, d) = g.sample(State::from_seed(seed));
        if let Some(d) = d {
            let tree = d.forced(5, 3);
            let ok = every_child(&tree, &|parent: &BTreeSet<i64>, child: &BTreeSet<i64>| {
                child.len() >= 2
                    && (child.len() < parent.len()
                        || (child.len() == parent.len()
                            && child.iter().sum::<i64>() < parent.iter().sum::<i64>()))
            });
            prop_assert!(ok, "set shrink broke the minimum or stalled under {:?}", tree.value);
        }
    }

    #[test]
    fn map_shrinks_are_shorter_or_simpler(seed in any::<u64>()) {
        let g = bounded_map(0, 6, &int_range(0, 10).unwrap(), &int_range(0, 20).unwrap()).unwrap();
        let (_, d) = g.sample(State::from_seed(seed));
        let tree = d.unwrap().forced(5, 3);
        let total = |m: &BTreeMap<i64, i64>| m.iter().map(|(k, v)| k + v).sum::<i64>();
        let ok = every_child(&tree, &|parent: &BTreeMap<i64, i64>, child: &BTreeMap<i64, i64>| {
            child.len() < parent.len() || (child.len() == parent.len() && total(child) < total(parent))
        });
        prop_assert!(ok, "map shrink grew or stalled under {:?}", tree.value);
    }

    #[test]
    fn filter_keeps_only_passing_nodes(seed in any::<u64>()) {
        let g = int_range(0, 10_000).unwrap().filter(|n| n % 3 != 0);
        let (_, d) = g.sample(State::from_seed(seed));
        if let Some(d) = d {
            let tree = d.forced(6, 4);
            prop_assert!(tree.value % 3 != 0, "root {} fails the filter", tree.value);
            let ok = every_child(&tree, &|_: &i64, child: &i64| child % 3 != 0);
            prop_assert!(ok, "a shrink of {} fails the filter", tree.value);
        }
    }

    #[test]
    fn map_identity_preserves_dissection(seed in any::<u64>()) {
        let g = int_range(-500, 500).unwrap();
        let (_, plain) = g.sample(State::from_seed(seed));
        let (_, mapped) = g.map(|v| *v).sample(State::from_seed(seed));
        prop_assert_eq!(plain.unwrap().forced(5, 3), mapped.unwrap().forced(5, 3));
    }
}
