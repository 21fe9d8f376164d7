//! Dissections: values paired with a lazy tree of simpler candidates.
//!
//! A `Dissection<T>` is a rose tree whose root is a concrete value and whose
//! children are strictly simpler alternatives, each a dissection itself.
//! Children live in a [`Stream`], so building a dissection costs nothing
//! beyond its root until a shrink walk asks for candidates.

use crate::stream::Stream;
use std::rc::Rc;

/// Produces the immediate shrink candidates of a value.
pub type Trimmer<T> = Rc<dyn Fn(&T) -> Stream<T>>;

/// Depth to which `filter` searches below a rejected child for passing
/// descendants.
const SPLICE_DEPTH: usize = 2;

/// A value with its lazy tree of shrink candidates.
pub struct Dissection<T> {
    head: T,
    children: Stream<Dissection<T>>,
}

impl<T: Clone> Clone for Dissection<T> {
    fn clone(&self) -> Self {
        Dissection {
            head: self.head.clone(),
            children: self.children.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Dissection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dissection")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

/// A fully forced prefix of a dissection, for inspection and comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Forced<T> {
    pub value: T,
    pub children: Vec<Forced<T>>,
}

impl<T: Clone + 'static> Dissection<T> {
    pub fn new(head: T, children: Stream<Dissection<T>>) -> Self {
        Dissection { head, children }
    }

    /// A value with no candidates.
    pub fn singleton(head: T) -> Self {
        Dissection::new(head, Stream::empty())
    }

    pub fn head(&self) -> &T {
        &self.head
    }

    pub fn children(&self) -> Stream<Dissection<T>> {
        self.children.clone()
    }

    pub fn into_head(self) -> T {
        self.head
    }

    /// Build a dissection by repeatedly applying trimmers.
    ///
    /// The children of `value` are the candidates of every trimmer, in
    /// trimmer order, each unfolded again with the same trimmers.
    pub fn unfold(value: T, trimmers: Vec<Trimmer<T>>) -> Self {
        unfold_with(value, Rc::from(trimmers))
    }

    /// Map every node. The tree shape is unchanged.
    pub fn map<U: Clone + 'static>(self, f: impl Fn(&T) -> U + 'static) -> Dissection<U> {
        map_with(self, Rc::new(f))
    }

    /// Combine two dissections. Children shrink the left side first, then
    /// the right, one side at a time.
    pub fn map2<B, R>(
        left: Dissection<T>,
        right: Dissection<B>,
        f: impl Fn(&T, &B) -> R + 'static,
    ) -> Dissection<R>
    where
        B: Clone + 'static,
        R: Clone + 'static,
    {
        map2_with(left, right, Rc::new(f))
    }

    /// Combine any number of dissections of one type. Children shrink one
    /// argument at a time, exhausting the candidates of argument `i` before
    /// those of argument `i + 1`.
    pub fn map_n<R: Clone + 'static>(
        parts: Vec<Dissection<T>>,
        f: impl Fn(&[T]) -> R + 'static,
    ) -> Dissection<R> {
        map_n_with(Rc::new(parts), Rc::new(f))
    }

    /// Restrict the tree to values satisfying `predicate`.
    ///
    /// Returns `None` when the root fails. A rejected child is replaced by
    /// its passing descendants, searched a bounded depth down.
    pub fn filter(self, predicate: impl Fn(&T) -> bool + 'static) -> Option<Dissection<T>> {
        if !predicate(&self.head) {
            return None;
        }
        Some(filter_with(self, Rc::new(predicate)))
    }

    /// Same root; `other` becomes the last child.
    pub fn concat(self, other: Dissection<T>) -> Self {
        Dissection::new(self.head, self.children.append(other))
    }

    /// Try `candidate` before any other child.
    pub fn prepend(self, candidate: T) -> Self {
        let first = Dissection::singleton(candidate);
        Dissection::new(self.head, Stream::prepend(first, self.children))
    }

    /// Try `candidate` after every other child.
    pub fn append(self, candidate: T) -> Self {
        Dissection::new(self.head, self.children.append(Dissection::singleton(candidate)))
    }

    /// Force at most `width` children per node down to `depth` levels.
    pub fn forced(&self, width: usize, depth: usize) -> Forced<T> {
        let children = if depth == 0 {
            Vec::new()
        } else {
            self.children
                .take(width)
                .iter()
                .map(|child| child.forced(width, depth - 1))
                .collect()
        };
        Forced {
            value: self.head.clone(),
            children,
        }
    }
}

fn unfold_with<T: Clone + 'static>(value: T, trimmers: Rc<[Trimmer<T>]>) -> Dissection<T> {
    let seed = value.clone();
    let indices: Vec<usize> = (0..trimmers.len()).collect();
    let children = Stream::from_vec(indices).flat_map(move |i| {
        let trimmers = Rc::clone(&trimmers);
        trimmers[i](&seed).map(move |candidate| unfold_with(candidate, Rc::clone(&trimmers)))
    });
    Dissection::new(value, children)
}

fn map_with<T, U>(d: Dissection<T>, f: Rc<dyn Fn(&T) -> U>) -> Dissection<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let head = f(&d.head);
    let children = d.children.map(move |child| map_with(child, Rc::clone(&f)));
    Dissection::new(head, children)
}

fn map2_with<A, B, R>(
    left: Dissection<A>,
    right: Dissection<B>,
    f: Rc<dyn Fn(&A, &B) -> R>,
) -> Dissection<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    R: Clone + 'static,
{
    let head = f(&left.head, &right.head);
    let shrink_left = {
        let (right, f) = (right.clone(), Rc::clone(&f));
        left.children()
            .map(move |l| map2_with(l, right.clone(), Rc::clone(&f)))
    };
    let shrink_right = {
        let f = Rc::clone(&f);
        right
            .children
            .map(move |r| map2_with(left.clone(), r, Rc::clone(&f)))
    };
    Dissection::new(head, shrink_left.concat(shrink_right))
}

fn map_n_with<T, R>(parts: Rc<Vec<Dissection<T>>>, f: Rc<dyn Fn(&[T]) -> R>) -> Dissection<R>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    let heads: Vec<T> = parts.iter().map(|p| p.head.clone()).collect();
    let head = f(&heads);
    let indices: Vec<usize> = (0..parts.len()).collect();
    let children = Stream::from_vec(indices).flat_map(move |i| {
        let (parts, f) = (Rc::clone(&parts), Rc::clone(&f));
        parts[i].children().map(move |candidate| {
            let mut next = parts.as_ref().clone();
            next[i] = candidate;
            map_n_with(Rc::new(next), Rc::clone(&f))
        })
    });
    Dissection::new(head, children)
}

fn filter_with<T: Clone + 'static>(d: Dissection<T>, predicate: Rc<dyn Fn(&T) -> bool>) -> Dissection<T> {
    let children = prune(d.children, predicate, SPLICE_DEPTH);
    Dissection::new(d.head, children)
}

fn prune<T: Clone + 'static>(
    children: Stream<Dissection<T>>,
    predicate: Rc<dyn Fn(&T) -> bool>,
    depth: usize,
) -> Stream<Dissection<T>> {
    children.flat_map(move |child| {
        if predicate(&child.head) {
            Stream::singleton(filter_with(child, Rc::clone(&predicate)))
        } else if depth > 0 {
            prune(child.children, Rc::clone(&predicate), depth - 1)
        } else {
            Stream::empty()
        }
    })
}
