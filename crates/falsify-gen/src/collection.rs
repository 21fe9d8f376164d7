//! Collection, option and argument-pack generators.
//!
//! Collections shrink by first trying removals (one element at a time,
//! never below the minimum size) and then by shrinking individual elements
//! in index order. Sets and maps rebuild from the surviving elements, so a
//! shrink that collides two keys yields a smaller collection; candidates
//! that would fall below the minimum size are dropped.

use crate::dissect::Dissection;
use crate::error::{GenError, GenResult};
use crate::generate::{map2, map_n, Generator};
use crate::primitive::{index_below, small_nat};
use crate::prng::{self, State};
use crate::stream::Stream;
use crate::value::{Args, Value};
use falsify_card::{Cardinality, LENGTH_VAR};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Probability that `option` draws `None`.
const NONE_PROBABILITY: f64 = 0.05;

type Build<T, C> = Rc<dyn Fn(&[T]) -> Option<C>>;
type Same<T> = Box<dyn Fn(&T, &T) -> bool>;

/// How element draws become a collection.
struct Layout<T, C> {
    /// Fewest elements a shrink candidate may keep.
    min: usize,
    build: Build<T, C>,
    /// Present for sets and maps, whose elements collapse by key.
    keyed: Option<Keyed<T>>,
}

struct Keyed<T> {
    same_key: Same<T>,
    same_entry: Same<T>,
}

/// Keep only the last element for each key, in their original order.
fn last_per_key<T: Clone + 'static>(elements: Vec<Dissection<T>>, same_key: &dyn Fn(&T, &T) -> bool) -> Vec<Dissection<T>> {
    let mut kept: Vec<Dissection<T>> = Vec::with_capacity(elements.len());
    for d in elements.into_iter().rev() {
        if !kept.iter().any(|k| same_key(k.head(), d.head())) {
            kept.push(d);
        }
    }
    kept.reverse();
    kept
}

/// Dissection of a collection built from element dissections.
///
/// Keyed collections first drop elements shadowed by a later one with the
/// same key, so every element is visible in the built head. Removals then
/// shorten the collection, and an element shrink either collides with
/// another key (shorter again) or changes exactly one entry. No child
/// equals its parent. Returns `None` when the root itself is rejected.
fn sequence<T, C>(elements: Vec<Dissection<T>>, layout: Rc<Layout<T, C>>) -> Option<Dissection<C>>
where
    T: Clone + 'static,
    C: Clone + 'static,
{
    let elements = Rc::new(match &layout.keyed {
        Some(keyed) => last_per_key(elements, &*keyed.same_key),
        None => elements,
    });
    let heads: Vec<T> = elements.iter().map(|d| d.head().clone()).collect();
    let head = (layout.build)(&heads[..])?;

    let removals = {
        let (elements, layout) = (Rc::clone(&elements), Rc::clone(&layout));
        let count = if elements.len() > layout.min { elements.len() } else { 0 };
        Stream::from_vec((0..count).collect::<Vec<usize>>()).filter_map(move |i| {
            let mut rest = elements.as_ref().clone();
            rest.remove(i);
            sequence(rest, Rc::clone(&layout))
        })
    };

    let element_shrinks = {
        let indices: Vec<usize> = (0..elements.len()).collect();
        Stream::from_vec(indices).flat_map(move |i| {
            let (elements, layout) = (Rc::clone(&elements), Rc::clone(&layout));
            elements[i].children().filter_map(move |candidate| {
                if let Some(keyed) = &layout.keyed {
                    if (keyed.same_entry)(candidate.head(), elements[i].head()) {
                        return None;
                    }
                }
                let mut next = elements.as_ref().clone();
                next[i] = candidate;
                sequence(next, Rc::clone(&layout))
            })
        })
    };

    Some(Dissection::new(head, removals.concat(element_shrinks)))
}

/// Draw `count` elements, failing fast.
fn draw_elements<T: Clone + 'static>(
    element: &Generator<T>,
    count: usize,
    mut state: State,
) -> (State, Option<Vec<Dissection<T>>>) {
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count {
        let (next, d) = element.sample(state);
        state = next;
        match d {
            Some(d) => drawn.push(d),
            None => return (state, None),
        }
    }
    (state, Some(drawn))
}

/// Domain size of collections with `lo..=hi` elements drawn from a domain
/// of size `element`.
fn sized_cardinality(element: &Cardinality, lo: usize, hi: usize) -> Cardinality {
    match element.simplify() {
        Cardinality::Constant(k) => geometric_sum(k, lo, hi).map_or(Cardinality::Infinite, Cardinality::constant),
        Cardinality::Infinite if hi == 0 => Cardinality::one(),
        Cardinality::Infinite => Cardinality::Infinite,
        // dominant term only
        other => other.pow(Cardinality::constant(hi as u64)),
    }
}

/// `k^lo + k^(lo+1) + ... + k^hi`, or `None` on overflow.
fn geometric_sum(k: u64, lo: usize, hi: usize) -> Option<u64> {
    match k {
        0 => Some(u64::from(lo == 0)),
        1 => u64::try_from(hi - lo + 1).ok(),
        _ => {
            let mut term = k.checked_pow(u32::try_from(lo).ok()?)?;
            let mut total = 0u64;
            for exp in lo..=hi {
                total = total.checked_add(term)?;
                if exp < hi {
                    term = term.checked_mul(k)?;
                }
            }
            Some(total)
        }
    }
}

fn unbounded_cardinality(element: &Cardinality) -> Cardinality {
    element.clone().pow(Cardinality::var(LENGTH_VAR))
}

/// Collection generator without bound validation; callers ensure `lo <= hi`.
fn sized<T, C>(hi: usize, element: Generator<T>, layout: Layout<T, C>, cardinality: Cardinality) -> Generator<C>
where
    T: Clone + 'static,
    C: Clone + 'static,
{
    let lo = layout.min;
    let layout = Rc::new(layout);
    Generator::new(cardinality, move |state| {
        let (state, count) = prng::nat(state, lo as u64, hi as u64);
        let (state, drawn) = draw_elements(&element, count as usize, state);
        let dissection = drawn.and_then(|ds| sequence(ds, Rc::clone(&layout)));
        (state, dissection)
    })
}

pub(crate) fn list_between<T: Clone + 'static>(lo: usize, hi: usize, element: Generator<T>) -> Generator<Vec<T>> {
    let cardinality = sized_cardinality(element.cardinality(), lo, hi);
    let layout = Layout {
        min: lo,
        build: Rc::new(|xs: &[T]| Some(xs.to_vec())),
        keyed: None,
    };
    sized(hi, element, layout, cardinality)
}

fn set_between<T: Ord + Clone + 'static>(lo: usize, hi: usize, element: Generator<T>) -> Generator<BTreeSet<T>> {
    let cardinality = sized_cardinality(element.cardinality(), lo, hi);
    let layout = Layout {
        min: lo,
        build: Rc::new(move |xs: &[T]| {
            let set: BTreeSet<T> = xs.iter().cloned().collect();
            (set.len() >= lo).then_some(set)
        }),
        keyed: Some(Keyed {
            same_key: Box::new(|a: &T, b: &T| a == b),
            same_entry: Box::new(|a: &T, b: &T| a == b),
        }),
    };
    sized(hi, element, layout, cardinality)
}

fn map_between<K, V>(lo: usize, hi: usize, key: &Generator<K>, value: &Generator<V>) -> Generator<BTreeMap<K, V>>
where
    K: Ord + Clone + 'static,
    V: PartialEq + Clone + 'static,
{
    let entry = map2(key, value, |k, v| (k.clone(), v.clone()));
    let cardinality = sized_cardinality(entry.cardinality(), lo, hi);
    let layout = Layout {
        min: lo,
        build: Rc::new(move |entries: &[(K, V)]| {
            let map: BTreeMap<K, V> = entries.iter().cloned().collect();
            (map.len() >= lo).then_some(map)
        }),
        keyed: Some(Keyed {
            same_key: Box::new(|a: &(K, V), b: &(K, V)| a.0 == b.0),
            same_entry: Box::new(|a: &(K, V), b: &(K, V)| a == b),
        }),
    };
    sized(hi, entry, layout, cardinality)
}

fn check_bounds(lo: usize, hi: usize) -> GenResult<()> {
    if lo > hi {
        return Err(GenError::bounds(lo as i128, hi as i128));
    }
    Ok(())
}

/// List with length in `[lo, hi]`.
pub fn bounded_list<T: Clone + 'static>(lo: usize, hi: usize, element: &Generator<T>) -> GenResult<Generator<Vec<T>>> {
    check_bounds(lo, hi)?;
    Ok(list_between(lo, hi, element.clone()))
}

/// List of small, tiered length.
pub fn list<T: Clone + 'static>(element: &Generator<T>) -> Generator<Vec<T>> {
    let element = element.clone();
    let cardinality = unbounded_cardinality(element.cardinality());
    small_nat().bind_with(cardinality, move |n| list_between(0, *n as usize, element.clone()))
}

/// Sorted list with length in `[lo, hi]`. Every shrink candidate is sorted.
pub fn sorted_list<T: Ord + Clone + 'static>(lo: usize, hi: usize, element: &Generator<T>) -> GenResult<Generator<Vec<T>>> {
    let unsorted = bounded_list(lo, hi, element)?;
    Ok(unsorted.map(|xs| {
        let mut xs = xs.clone();
        xs.sort();
        xs
    }))
}

/// Set with `[lo, hi]` draws. Duplicates collapse; when fewer than `lo`
/// distinct elements remain the draw is a no-result.
pub fn bounded_set<T: Ord + Clone + 'static>(lo: usize, hi: usize, element: &Generator<T>) -> GenResult<Generator<BTreeSet<T>>> {
    check_bounds(lo, hi)?;
    Ok(set_between(lo, hi, element.clone()))
}

pub fn set<T: Ord + Clone + 'static>(element: &Generator<T>) -> Generator<BTreeSet<T>> {
    let element = element.clone();
    let cardinality = unbounded_cardinality(element.cardinality());
    small_nat().bind_with(cardinality, move |n| set_between(0, *n as usize, element.clone()))
}

/// Map with `[lo, hi]` entry draws. Later entries win on key collisions;
/// fewer than `lo` distinct keys is a no-result.
pub fn bounded_map<K, V>(lo: usize, hi: usize, key: &Generator<K>, value: &Generator<V>) -> GenResult<Generator<BTreeMap<K, V>>>
where
    K: Ord + Clone + 'static,
    V: PartialEq + Clone + 'static,
{
    check_bounds(lo, hi)?;
    Ok(map_between(lo, hi, key, value))
}

pub fn map_of<K, V>(key: &Generator<K>, value: &Generator<V>) -> Generator<BTreeMap<K, V>>
where
    K: Ord + Clone + 'static,
    V: PartialEq + Clone + 'static,
{
    let (key, value) = (key.clone(), value.clone());
    let entry_cardinality = key.cardinality().clone() * value.cardinality().clone();
    let cardinality = unbounded_cardinality(&entry_cardinality);
    small_nat().bind_with(cardinality, move |n| map_between(0, *n as usize, &key, &value))
}

/// Occasionally `None`; otherwise `Some` of a draw, which tries `None` as
/// its first shrink.
pub fn option<T: Clone + 'static>(inner: &Generator<T>) -> Generator<Option<T>> {
    let inner = inner.clone();
    let cardinality = inner.cardinality().clone() + Cardinality::one();
    Generator::new(cardinality, move |state| {
        let (state, roll) = prng::probability(state);
        if roll < NONE_PROBABILITY {
            return (state, Some(Dissection::singleton(None)));
        }
        let (state, drawn) = inner.sample(state);
        let wrapped = drawn.map(|d| d.map(|v| Some(v.clone())).prepend(None));
        (state, wrapped)
    })
}

/// Append one drawn item to a drawn list.
pub fn list_append<T: Clone + 'static>(items: &Generator<Vec<T>>, item: &Generator<T>) -> Generator<Vec<T>> {
    map2(items, item, |xs, x| {
        let mut xs = xs.clone();
        xs.push(x.clone());
        xs
    })
}

pub fn set_insert<T: Ord + Clone + 'static>(items: &Generator<BTreeSet<T>>, item: &Generator<T>) -> Generator<BTreeSet<T>> {
    map2(items, item, |xs, x| {
        let mut xs = xs.clone();
        xs.insert(x.clone());
        xs
    })
}

pub fn map_insert<K, V>(
    entries: &Generator<BTreeMap<K, V>>,
    key: &Generator<K>,
    value: &Generator<V>,
) -> Generator<BTreeMap<K, V>>
where
    K: Ord + Clone + 'static,
    V: Clone + 'static,
{
    let entry = map2(key, value, |k, v| (k.clone(), v.clone()));
    map2(entries, &entry, |map, (k, v)| {
        let mut map = map.clone();
        map.insert(k.clone(), v.clone());
        map
    })
}

/// Any subset of `values`, shrinking toward the empty set.
pub fn subset_of<T: Ord + Clone + 'static>(values: Vec<T>) -> Generator<BTreeSet<T>> {
    let n = values.len();
    let cardinality = Cardinality::constant(2).pow(Cardinality::constant(n as u64));
    if n == 0 {
        return crate::generate::constant(BTreeSet::new());
    }
    let values = Rc::new(values);
    set_between(0, n, index_below(n))
        .map(move |picked| picked.iter().map(|i| values[*i].clone()).collect())
        .with_cardinality(cardinality)
}

/// Tuple of erased values, shrinking one component at a time.
pub fn tuple(parts: Vec<Generator<Value>>) -> Generator<Value> {
    map_n(parts, |xs| Value::Tuple(xs.to_vec()))
}

/// Named arguments for a law. Shrinks one argument at a time, in order.
pub fn argument_pack(params: Vec<(String, Generator<Value>)>) -> Generator<Args> {
    let (names, generators): (Vec<String>, Vec<Generator<Value>>) = params.into_iter().unzip();
    map_n(generators, move |values| {
        Args::new(names.iter().cloned().zip(values.iter().cloned()).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dissect::Forced;
    use crate::primitive::{boolean, int_range};

    fn draws<T: Clone + 'static>(g: &Generator<T>, seed: u64, count: usize) -> Vec<Dissection<T>> {
        let mut state = State::from_seed(seed);
        let mut out = Vec::new();
        for _ in 0..count {
            let (next, d) = g.sample(state);
            state = next;
            out.extend(d);
        }
        out
    }

    fn all_nodes<T: Clone>(f: &Forced<T>, out: &mut Vec<T>) {
        out.push(f.value.clone());
        for c in &f.children {
            all_nodes(c, out);
        }
    }

    #[test]
    fn test_geometric_sum() {
        assert_eq!(geometric_sum(2, 0, 3), Some(15));
        assert_eq!(geometric_sum(1, 2, 5), Some(4));
        assert_eq!(geometric_sum(0, 0, 5), Some(1));
        assert_eq!(geometric_sum(100, 0, 100), None);
    }

    #[test]
    fn test_bounded_list_lengths_and_shrinks() {
        let g = bounded_list(2, 5, &int_range(0, 100).unwrap()).unwrap();
        for d in draws(&g, 1, 100) {
            assert!((2..=5).contains(&d.head().len()));
            let mut nodes = Vec::new();
            all_nodes(&d.forced(4, 3), &mut nodes);
            assert!(nodes.iter().all(|xs| xs.len() >= 2 && xs.len() <= d.head().len()));
        }
        assert!(bounded_list(3, 2, &boolean()).is_err());
    }

    #[test]
    fn test_removals_come_first() {
        let elements = vec![
            Dissection::unfold(4i64, vec![crate::trim::towards(0)]),
            Dissection::unfold(6i64, vec![crate::trim::towards(0)]),
        ];
        let layout = Layout {
            min: 0,
            build: Rc::new(|xs: &[i64]| Some(xs.to_vec())),
            keyed: None,
        };
        let d = sequence(elements, Rc::new(layout)).unwrap();
        let kids: Vec<Vec<i64>> = d.children().take(4).into_iter().map(Dissection::into_head).collect();
        assert_eq!(kids, vec![vec![6], vec![4], vec![0, 6], vec![2, 6]]);
    }

    #[test]
    fn test_set_respects_minimum() {
        let g = bounded_set(3, 6, &int_range(0, 3).unwrap()).unwrap();
        let drawn = draws(&g, 9, 200);
        assert!(!drawn.is_empty());
        for d in drawn {
            assert!(d.head().len() >= 3);
            let mut nodes = Vec::new();
            all_nodes(&d.forced(5, 3), &mut nodes);
            assert!(nodes.iter().all(|s| s.len() >= 3));
        }
    }

    fn changes_at_every_step<T: Clone + PartialEq>(f: &Forced<T>) -> bool {
        f.children
            .iter()
            .all(|c| c.value != f.value && changes_at_every_step(c))
    }

    #[test]
    fn test_last_per_key_keeps_later_entries() {
        let elements: Vec<Dissection<(i64, char)>> = [(1, 'a'), (2, 'b'), (1, 'c')]
            .into_iter()
            .map(Dissection::singleton)
            .collect();
        let kept: Vec<(i64, char)> = last_per_key(elements, &|a: &(i64, char), b: &(i64, char)| a.0 == b.0)
            .into_iter()
            .map(Dissection::into_head)
            .collect();
        assert_eq!(kept, vec![(2, 'b'), (1, 'c')]);
    }

    #[test]
    fn test_set_shrinks_never_repeat_the_parent() {
        let g = bounded_set(0, 5, &int_range(0, 2).unwrap()).unwrap();
        for d in draws(&g, 1, 200) {
            let tree = d.forced(10, 4);
            assert!(changes_at_every_step(&tree), "stalled under {:?}", tree.value);
        }
    }

    #[test]
    fn test_map_shrinks_never_repeat_the_parent() {
        let g = bounded_map(0, 5, &int_range(0, 1).unwrap(), &int_range(0, 3).unwrap()).unwrap();
        for d in draws(&g, 8, 200) {
            let tree = d.forced(10, 4);
            assert!(changes_at_every_step(&tree), "stalled under {:?}", tree.value);
        }
    }

    #[test]
    fn test_map_keys_unique() {
        let g = bounded_map(0, 8, &int_range(0, 5).unwrap(), &boolean()).unwrap();
        for d in draws(&g, 2, 100) {
            assert!(d.head().len() <= 6);
        }
    }

    #[test]
    fn test_sorted_list_shrinks_sorted() {
        let g = sorted_list(0, 6, &int_range(-50, 50).unwrap()).unwrap();
        for d in draws(&g, 4, 50) {
            let mut nodes = Vec::new();
            all_nodes(&d.forced(4, 3), &mut nodes);
            assert!(nodes.iter().all(|xs| xs.windows(2).all(|w| w[0] <= w[1])));
        }
    }

    #[test]
    fn test_option_tries_none_first() {
        let g = option(&int_range(1, 10).unwrap());
        assert_eq!(g.cardinality(), &Cardinality::constant(11));
        for d in draws(&g, 5, 50) {
            if d.head().is_some() {
                assert_eq!(d.children().peek().map(Dissection::into_head), Some(None));
            }
        }
    }

    #[test]
    fn test_list_append() {
        let g = list_append(&bounded_list(1, 1, &boolean()).unwrap(), &boolean());
        for d in draws(&g, 3, 20) {
            assert_eq!(d.head().len(), 2);
        }
    }

    #[test]
    fn test_subset_of() {
        let g = subset_of(vec!['a', 'b', 'c']);
        assert_eq!(g.cardinality(), &Cardinality::constant(8));
        for d in draws(&g, 6, 50) {
            assert!(d.head().iter().all(|c| "abc".contains(*c)));
        }
        let empty = subset_of::<u8>(vec![]);
        assert!(draws(&empty, 0, 1)[0].head().is_empty());
    }

    #[test]
    fn test_argument_pack_shrinks_one_at_a_time() {
        let g = argument_pack(vec![
            ("a".to_string(), int_range(0, 100).unwrap().erase()),
            ("b".to_string(), int_range(0, 100).unwrap().erase()),
        ]);
        let d = draws(&g, 11, 1).remove(0);
        let (a, b) = (d.head().int("a").unwrap(), d.head().int("b").unwrap());
        for child in d.children().take(50) {
            let (ca, cb) = (child.head().int("a").unwrap(), child.head().int("b").unwrap());
            assert!((ca != a) ^ (cb != b));
        }
    }
}
