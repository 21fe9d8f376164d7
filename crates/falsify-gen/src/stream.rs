//! Persistent lazy streams.
//!
//! A `Stream<T>` is a shared thunk that, when forced, yields either nothing
//! or a head value and the rest of the stream. Nothing is computed until a
//! consumer asks for it, so streams may be infinite. Forcing is not
//! memoized: the same stream forced twice recomputes its head, which keeps
//! the type `Clone` without interior mutability.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Step<T> = Option<(T, Stream<T>)>;

/// Lazy, possibly infinite, ordered sequence.
pub struct Stream<T> {
    thunk: Rc<dyn Fn() -> Step<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            thunk: Rc::clone(&self.thunk),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stream(..)")
    }
}

impl<T: 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: 'static> Stream<T> {
    /// Build a stream from a thunk.
    pub fn new(thunk: impl Fn() -> Step<T> + 'static) -> Self {
        Self {
            thunk: Rc::new(thunk),
        }
    }

    pub fn empty() -> Self {
        Self::new(|| None)
    }

    /// Force the stream: the head and the rest, if any.
    pub fn next(&self) -> Option<(T, Stream<T>)> {
        (self.thunk)()
    }

    pub fn peek(&self) -> Option<T> {
        self.next().map(|(head, _)| head)
    }

    pub fn is_empty(&self) -> bool {
        self.next().is_none()
    }

    /// Unfold a stream from a seed. Stops when `step` returns `None`.
    pub fn unfold<S>(seed: S, step: impl Fn(S) -> Option<(T, S)> + 'static) -> Self
    where
        S: Clone + 'static,
    {
        unfold_with(seed, Rc::new(step))
    }

    /// Collect at most `limit` items.
    pub fn take(&self, limit: usize) -> Vec<T> {
        self.clone().into_iter().take(limit).collect()
    }

    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        map_with(self, Rc::new(f))
    }

    /// Keep items satisfying `predicate`.
    ///
    /// Forcing the result scans forward until a match is found, so filtering
    /// an infinite stream with no further matches does not terminate.
    pub fn filter(self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        filter_with(self, Rc::new(predicate))
    }

    pub fn filter_map<U: 'static>(self, f: impl Fn(T) -> Option<U> + 'static) -> Stream<U> {
        filter_map_with(self, Rc::new(f))
    }

    /// Replace every item with a stream and flatten, in order.
    pub fn flat_map<U: 'static>(self, f: impl Fn(T) -> Stream<U> + 'static) -> Stream<U> {
        flat_map_with(self, Rc::new(f))
    }

    /// All of `self`, then all of `other`. `self` is forced only as consumed.
    pub fn concat(self, other: Stream<T>) -> Self {
        Stream::new(move || match self.next() {
            Some((head, rest)) => Some((head, rest.concat(other.clone()))),
            None => other.next(),
        })
    }

    /// Round-robin interleaving of several streams. Exhausted streams drop out.
    pub fn braid(streams: Vec<Stream<T>>) -> Self {
        braid_queue(streams.into_iter().collect())
    }
}

impl<T: Clone + 'static> Stream<T> {
    pub fn singleton(value: T) -> Self {
        Self::new(move || Some((value.clone(), Stream::empty())))
    }

    /// Infinite repetition of one value.
    pub fn constant(value: T) -> Self {
        Self::new(move || Some((value.clone(), Stream::constant(value.clone()))))
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        from_shared(Rc::new(items), 0)
    }

    pub fn prepend(value: T, stream: Stream<T>) -> Self {
        Self::new(move || Some((value.clone(), stream.clone())))
    }

    pub fn append(self, value: T) -> Self {
        self.concat(Stream::singleton(value))
    }
}

fn unfold_with<T, S>(seed: S, step: Rc<dyn Fn(S) -> Option<(T, S)>>) -> Stream<T>
where
    T: 'static,
    S: Clone + 'static,
{
    Stream::new(move || {
        let (value, next) = step(seed.clone())?;
        Some((value, unfold_with(next, Rc::clone(&step))))
    })
}

fn map_with<T: 'static, U: 'static>(stream: Stream<T>, f: Rc<dyn Fn(T) -> U>) -> Stream<U> {
    Stream::new(move || {
        let (head, rest) = stream.next()?;
        Some((f(head), map_with(rest, Rc::clone(&f))))
    })
}

fn filter_with<T: 'static>(stream: Stream<T>, predicate: Rc<dyn Fn(&T) -> bool>) -> Stream<T> {
    Stream::new(move || {
        let mut cursor = stream.clone();
        loop {
            let (head, rest) = cursor.next()?;
            if predicate(&head) {
                return Some((head, filter_with(rest, Rc::clone(&predicate))));
            }
            cursor = rest;
        }
    })
}

fn filter_map_with<T: 'static, U: 'static>(
    stream: Stream<T>,
    f: Rc<dyn Fn(T) -> Option<U>>,
) -> Stream<U> {
    Stream::new(move || {
        let mut cursor = stream.clone();
        loop {
            let (head, rest) = cursor.next()?;
            if let Some(mapped) = f(head) {
                return Some((mapped, filter_map_with(rest, Rc::clone(&f))));
            }
            cursor = rest;
        }
    })
}

fn flat_map_with<T: 'static, U: 'static>(
    stream: Stream<T>,
    f: Rc<dyn Fn(T) -> Stream<U>>,
) -> Stream<U> {
    Stream::new(move || {
        let mut cursor = stream.clone();
        loop {
            let (head, rest) = cursor.next()?;
            if let Some((first, inner_rest)) = f(head).next() {
                let tail = inner_rest.concat(flat_map_with(rest, Rc::clone(&f)));
                return Some((first, tail));
            }
            cursor = rest;
        }
    })
}

fn braid_queue<T: 'static>(queue: VecDeque<Stream<T>>) -> Stream<T> {
    Stream::new(move || {
        let mut queue = queue.clone();
        while let Some(stream) = queue.pop_front() {
            if let Some((head, rest)) = stream.next() {
                queue.push_back(rest);
                return Some((head, braid_queue(queue)));
            }
        }
        None
    })
}

fn from_shared<T: Clone + 'static>(items: Rc<Vec<T>>, index: usize) -> Stream<T> {
    Stream::new(move || {
        let item = items.get(index)?.clone();
        Some((item, from_shared(Rc::clone(&items), index + 1)))
    })
}

/// Iterator over a stream, forcing one element per call.
pub struct StreamIter<T> {
    rest: Stream<T>,
}

impl<T: 'static> Iterator for StreamIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (head, rest) = self.rest.next()?;
        self.rest = rest;
        Some(head)
    }
}

impl<T: 'static> IntoIterator for Stream<T> {
    type Item = T;
    type IntoIter = StreamIter<T>;

    fn into_iter(self) -> StreamIter<T> {
        StreamIter { rest: self }
    }
}
