//! Counterexample search and the greedy shrink walk.
//!
//! A search runs a fixed number of attempts. Each attempt draws a value;
//! a draw with no result is skipped without counting as a failure. The
//! first value on which the law fails is minimized by walking its
//! dissection: descend into the first child that still fails, repeat until
//! no child fails. The result is a local minimum.

use crate::context::CancelToken;
use crate::error::LawError;
use crate::property::{evaluate, Verdict};
use falsify_gen::{Dissection, Generator, State};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Bounds on the shrink walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of successful shrink steps.
    pub max_shrink_steps: usize,
    /// Maximum number of children tried at each node.
    pub max_shrink_width: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_shrink_steps: 1_000,
            max_shrink_width: 1_000,
        }
    }
}

/// A failing value after shrinking.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<T> {
    pub value: T,
    pub error: Option<LawError>,
    pub shrink_steps: usize,
}

/// Summary of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<T> {
    pub found: Option<Found<T>>,
    /// Attempts started.
    pub attempts: u64,
    /// Attempts whose draw produced a value.
    pub draws: u64,
    /// Whether cancellation stopped the search early.
    pub cancelled: bool,
}

/// Law over a drawn value.
pub type Check<'a, T> = &'a dyn Fn(&T) -> Result<bool, LawError>;

/// Search for a counterexample in at most `attempts` draws.
pub fn search<T: Clone + 'static>(
    mut state: State,
    attempts: u64,
    generator: &Generator<T>,
    law: Check<'_, T>,
    config: &SearchConfig,
    cancel: &CancelToken,
) -> (State, SearchOutcome<T>) {
    let mut outcome = SearchOutcome {
        found: None,
        attempts: 0,
        draws: 0,
        cancelled: false,
    };
    while outcome.attempts < attempts {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }
        outcome.attempts += 1;
        let (next, drawn) = generator.sample(state);
        state = next;
        let Some(dissection) = drawn else {
            trace!(attempt = outcome.attempts, "no result");
            continue;
        };
        outcome.draws += 1;
        if let Verdict::Fails(error) = evaluate(law, dissection.head()) {
            debug!(attempt = outcome.attempts, "counterexample found, shrinking");
            let (found, interrupted) = shrink(dissection, error, law, config, cancel);
            debug!(steps = found.shrink_steps, interrupted, "shrink finished");
            outcome.found = Some(found);
            break;
        }
    }
    (state, outcome)
}

/// Greedy depth-first, leftmost-first walk from a failing dissection.
///
/// Returns the last failing value and whether cancellation cut the walk
/// short. The returned value always fails the law.
pub fn shrink<T: Clone + 'static>(
    start: Dissection<T>,
    error: Option<LawError>,
    law: Check<'_, T>,
    config: &SearchConfig,
    cancel: &CancelToken,
) -> (Found<T>, bool) {
    let mut current = start;
    let mut current_error = error;
    let mut steps = 0;
    let mut interrupted = false;

    'walk: while steps < config.max_shrink_steps {
        for child in current.children().into_iter().take(config.max_shrink_width) {
            if cancel.is_cancelled() {
                interrupted = true;
                break 'walk;
            }
            if let Verdict::Fails(error) = evaluate(law, child.head()) {
                current = child;
                current_error = error;
                steps += 1;
                continue 'walk;
            }
        }
        break;
    }

    let found = Found {
        value: current.into_head(),
        error: current_error,
        shrink_steps: steps,
    };
    (found, interrupted)
}

/// Run `attempts` draws and law evaluations without shrinking, and return
/// the mean time of one attempt.
pub fn calibrate<T: Clone + 'static>(
    mut state: State,
    attempts: u64,
    generator: &Generator<T>,
    law: Check<'_, T>,
    cancel: &CancelToken,
) -> (State, Option<Duration>) {
    let started = Instant::now();
    for _ in 0..attempts {
        if cancel.is_cancelled() {
            return (state, None);
        }
        let (next, drawn) = generator.sample(state);
        state = next;
        if let Some(d) = drawn {
            let _ = evaluate(law, d.head());
        }
    }
    let mean = match u32::try_from(attempts) {
        Ok(0) => Duration::ZERO,
        Ok(n) => started.elapsed() / n,
        Err(_) => Duration::from_secs_f64(started.elapsed().as_secs_f64() / attempts as f64),
    };
    (state, Some(mean))
}
