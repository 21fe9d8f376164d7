//! Run configuration, cancellation and observation.
//!
//! A run is driven by an explicit [`RunConfig`] and reports progress to an
//! explicit [`RunObserver`]; nothing is process-global.

use crate::budget::{Allocation, BudgetPolicy, PropertyBudget};
use crate::report::{PropertyOutcome, SpecOutcome};
use crate::search::SearchConfig;
use falsify_card::Bindings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Wall-clock budget shared by all properties.
    pub budget: Duration,
    /// Seed for the run's random state (`None` = entropy).
    pub seed: Option<u64>,
    pub search: SearchConfig,
    pub policy: BudgetPolicy,
    /// Values for cardinality variables.
    pub bindings: Bindings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(10),
            seed: None,
            search: SearchConfig::default(),
            policy: BudgetPolicy::default(),
            bindings: Bindings::new(),
        }
    }
}

/// Cooperative cancellation flag, optionally with a deadline.
///
/// Checked between attempts, between shrink steps and between properties;
/// a law evaluation in progress is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report cancellation once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Receives progress events from a run. All methods default to no-ops.
pub trait RunObserver {
    fn calibrated(&mut self, _budget: &PropertyBudget) {}
    fn allocated(&mut self, _allocation: &Allocation) {}
    fn property_started(&mut self, _name: &str, _attempts: u64) {}
    fn property_finished(&mut self, _outcome: &PropertyOutcome) {}
    fn spec_finished(&mut self, _outcome: &SpecOutcome) {}
    fn cancelled(&mut self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn calibrated(&mut self, budget: &PropertyBudget) {
        debug!(
            property = %budget.name,
            class = %budget.class,
            ideal = budget.ideal,
            "calibration done"
        );
    }

    fn allocated(&mut self, allocation: &Allocation) {
        for entry in allocation.entries() {
            debug!(
                property = %entry.name,
                ideal = entry.ideal,
                allocated = entry.allocated,
                estimated_ms = entry.estimated_time().as_millis() as u64,
                "allocation"
            );
        }
    }

    fn property_started(&mut self, name: &str, attempts: u64) {
        debug!(property = %name, attempts, "running property");
    }

    fn property_finished(&mut self, outcome: &PropertyOutcome) {
        info!(
            property = %outcome.name,
            status = %outcome.status,
            attempts = outcome.attempts,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "property finished"
        );
    }

    fn spec_finished(&mut self, outcome: &SpecOutcome) {
        info!(spec = %outcome.name, status = %outcome.status, "spec finished");
    }

    fn cancelled(&mut self) {
        warn!("run cancelled");
    }
}
