//! The generator type and its core combinators.
//!
//! A `Generator<T>` is a pure function from a random [`State`] to the
//! advanced state and, if sampling succeeded, a [`Dissection`] of the drawn
//! value. A `None` sample ("no result") is not a failure; the search simply
//! moves on. Every generator also carries the symbolic cardinality of its
//! domain, which the budget allocator uses to size attempt counts.

use crate::dissect::Dissection;
use crate::error::{GenError, GenResult};
use crate::prng::{self, State};
use crate::value::Value;
use falsify_card::Cardinality;
use std::rc::Rc;
use tracing::trace;

/// Result of one sampling step.
pub type Sample<T> = (State, Option<Dissection<T>>);

type Sampler<T> = Rc<dyn Fn(State) -> Sample<T>>;

/// A seeded, shrinkable value source.
pub struct Generator<T> {
    sampler: Sampler<T>,
    cardinality: Cardinality,
}

impl<T> Clone for Generator<T> {
    fn clone(&self) -> Self {
        Generator {
            sampler: Rc::clone(&self.sampler),
            cardinality: self.cardinality.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Generator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("cardinality", &self.cardinality)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Generator<T> {
    pub fn new(cardinality: Cardinality, sampler: impl Fn(State) -> Sample<T> + 'static) -> Self {
        Generator {
            sampler: Rc::new(sampler),
            cardinality,
        }
    }

    /// Draw one dissection.
    pub fn sample(&self, state: State) -> Sample<T> {
        (self.sampler)(state)
    }

    pub fn cardinality(&self) -> &Cardinality {
        &self.cardinality
    }

    /// Same sampler, different declared domain size.
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Apply `f` to every drawn value and every shrink candidate.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Generator<U> {
        let f = Rc::new(f);
        let inner = self.clone();
        Generator::new(self.cardinality.clone(), move |state| {
            let (state, drawn) = inner.sample(state);
            let f = Rc::clone(&f);
            (state, drawn.map(move |d| d.map(move |v| f(v))))
        })
    }

    /// Draw a value, then draw from the generator it selects.
    ///
    /// Only the second draw is shrinkable: the first value's shrink tree is
    /// discarded. The result keeps this generator's cardinality; use
    /// [`Generator::bind_with`] to declare a different one.
    pub fn bind<U: Clone + 'static>(&self, f: impl Fn(&T) -> Generator<U> + 'static) -> Generator<U> {
        self.bind_with(self.cardinality.clone(), f)
    }

    pub fn bind_with<U: Clone + 'static>(
        &self,
        cardinality: Cardinality,
        f: impl Fn(&T) -> Generator<U> + 'static,
    ) -> Generator<U> {
        let inner = self.clone();
        Generator::new(cardinality, move |state| {
            let (state, drawn) = inner.sample(state);
            match drawn {
                Some(d) => f(d.head()).sample(state),
                None => (state, None),
            }
        })
    }

    /// Drop samples failing `predicate` and prune their shrink candidates.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Generator<T> {
        let predicate = Rc::new(predicate);
        let inner = self.clone();
        Generator::new(self.cardinality.clone(), move |state| {
            let (state, drawn) = inner.sample(state);
            let predicate = Rc::clone(&predicate);
            let kept = drawn.and_then(|d| d.filter(move |v| predicate(v)));
            if kept.is_none() {
                trace!("filter rejected sample");
            }
            (state, kept)
        })
    }

    /// Erase to a generator of dynamic values.
    pub fn erase(&self) -> Generator<Value>
    where
        T: Into<Value>,
    {
        self.map(|v| v.clone().into())
    }
}

/// Combine two generators. Draws left then right; stops at the first
/// no-result.
pub fn map2<A, B, R>(
    left: &Generator<A>,
    right: &Generator<B>,
    f: impl Fn(&A, &B) -> R + 'static,
) -> Generator<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    R: Clone + 'static,
{
    let f = Rc::new(f);
    let cardinality = left.cardinality().clone() * right.cardinality().clone();
    let (left, right) = (left.clone(), right.clone());
    Generator::new(cardinality, move |state| {
        let (state, a) = left.sample(state);
        let Some(a) = a else {
            return (state, None);
        };
        let (state, b) = right.sample(state);
        let Some(b) = b else {
            return (state, None);
        };
        let f = Rc::clone(&f);
        (state, Some(Dissection::map2(a, b, move |x, y| f(x, y))))
    })
}

/// Combine any number of generators of one type, drawn in order.
pub fn map_n<T, R>(parts: Vec<Generator<T>>, f: impl Fn(&[T]) -> R + 'static) -> Generator<R>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    let f = Rc::new(f);
    let cardinality = Cardinality::product_all(parts.iter().map(|g| g.cardinality().clone()));
    Generator::new(cardinality, move |state| {
        let (state, drawn) = sample_all(&parts, state);
        let f = Rc::clone(&f);
        (state, drawn.map(|ds| Dissection::map_n(ds, move |xs| f(xs))))
    })
}

/// Draw from each generator in turn. Fails fast, returning the state
/// advanced so far.
pub(crate) fn sample_all<T: Clone + 'static>(
    parts: &[Generator<T>],
    mut state: State,
) -> (State, Option<Vec<Dissection<T>>>) {
    let mut drawn = Vec::with_capacity(parts.len());
    for part in parts {
        let (next, d) = part.sample(state);
        state = next;
        match d {
            Some(d) => drawn.push(d),
            None => return (state, None),
        }
    }
    (state, Some(drawn))
}

pub fn zip<A, B>(left: &Generator<A>, right: &Generator<B>) -> Generator<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    map2(left, right, |a, b| (a.clone(), b.clone()))
}

pub fn zip3<A, B, C>(a: &Generator<A>, b: &Generator<B>, c: &Generator<C>) -> Generator<(A, B, C)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    map2(&zip(a, b), c, |(a, b), c| (a.clone(), b.clone(), c.clone()))
}

/// Always the same value; nothing to shrink.
pub fn constant<T: Clone + 'static>(value: T) -> Generator<T> {
    Generator::new(Cardinality::one(), move |state| {
        (state, Some(Dissection::singleton(value.clone())))
    })
}

pub fn unit() -> Generator<()> {
    constant(())
}

/// Pick one of several generators uniformly, then draw from it.
pub fn choice<T: Clone + 'static>(options: Vec<Generator<T>>) -> GenResult<Generator<T>> {
    if options.is_empty() {
        return Err(GenError::EmptyChoice);
    }
    let cardinality = Cardinality::sum_all(options.iter().map(|g| g.cardinality().clone()));
    let options = Rc::new(options);
    Ok(Generator::new(cardinality, move |state| {
        let (state, picked) = prng::choice(state, options.as_slice());
        picked.sample(state)
    }))
}

/// Pick one of several generators with probability proportional to its
/// weight, then draw from it.
pub fn weighted_choice<T: Clone + 'static>(
    options: Vec<(u32, Generator<T>)>,
) -> GenResult<Generator<T>> {
    if options.is_empty() {
        return Err(GenError::EmptyChoice);
    }
    if options.iter().all(|(w, _)| *w == 0) {
        return Err(GenError::ZeroWeights);
    }
    let cardinality = Cardinality::sum_all(options.iter().map(|(_, g)| g.cardinality().clone()));
    let (weights, generators): (Vec<u32>, Vec<Generator<T>>) = options.into_iter().unzip();
    Ok(Generator::new(cardinality, move |state| {
        let (state, picked) = prng::weighted_choice(state, &weights, &generators);
        picked.sample(state)
    }))
}
