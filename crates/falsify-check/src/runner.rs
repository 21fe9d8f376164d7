//! Suite runner: calibration, allocation, then execution of each spec.
//!
//! One random state is threaded through the whole run, so a fixed seed
//! reproduces every draw in order. Properties run strictly one after
//! another.

use crate::budget::{Allocation, Calibration};
use crate::context::{CancelToken, RunConfig, RunObserver};
use crate::error::{CheckError, CheckResult};
use crate::property::Property;
use crate::report::{Counterexample, PropertyOutcome, RunReport, SpecOutcome, Status};
use crate::search::{calibrate, search};
use crate::spec::{negate, Spec};
use falsify_gen::{prng, State};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A named collection of specs and the configuration to run them under.
#[derive(Debug)]
pub struct Runner {
    config: RunConfig,
    specs: Vec<(String, Spec)>,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            specs: Vec::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Add a named spec.
    ///
    /// Spec names and property names must each be unique across the
    /// suite, and every property's cardinality must evaluate under the
    /// configured bindings.
    pub fn add(&mut self, name: impl Into<String>, spec: impl Into<Spec>) -> CheckResult<()> {
        let name = name.into();
        let spec = spec.into();
        if self.specs.iter().any(|(n, _)| *n == name) {
            return Err(CheckError::DuplicateSpec { name });
        }
        let mut seen: Vec<&str> = self.properties().map(Property::name).collect();
        for property in spec.properties() {
            if seen.contains(&property.name()) {
                return Err(CheckError::DuplicateProperty {
                    name: property.name().to_string(),
                });
            }
            seen.push(property.name());
            property.cardinality().evaluate(&self.config.bindings)?;
        }
        self.specs.push((name, spec));
        Ok(())
    }

    pub fn spec_names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|(n, _)| n.as_str())
    }

    fn properties(&self) -> impl Iterator<Item = &Property> {
        self.specs.iter().flat_map(|(_, s)| s.properties())
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Run every spec. Cancellation never fails the run; properties it
    /// prevents from finishing are reported as skipped.
    pub fn run(&self, observer: &mut dyn RunObserver, cancel: &CancelToken) -> CheckResult<RunReport> {
        let started = Instant::now();
        info!(
            specs = self.specs.len(),
            properties = self.properties().count(),
            seed = ?self.config.seed,
            budget_ms = self.config.budget.as_millis() as u64,
            "starting run"
        );
        let state = prng::seed(self.config.seed);

        let Some((state, calibration)) = self.calibrate(state, observer, cancel)? else {
            warn!("cancelled during calibration, discarding measurements");
            observer.cancelled();
            return Ok(self.skipped_report(started));
        };

        let allocation = calibration.finalize(self.config.budget);
        observer.allocated(&allocation);

        let mut execution = Execution {
            runner: self,
            allocation: &allocation,
            state,
            observer,
            cancel,
            outcomes: Vec::new(),
        };
        let mut specs = Vec::with_capacity(self.specs.len());
        for (name, spec) in &self.specs {
            let status = execution.eval(spec)?;
            let outcome = SpecOutcome {
                name: name.clone(),
                status,
            };
            execution.observer.spec_finished(&outcome);
            specs.push(outcome);
        }
        let cancelled = cancel.is_cancelled();
        if cancelled {
            execution.observer.cancelled();
        }

        let report = RunReport {
            budgets: allocation.entries().to_vec(),
            adjustment: Some(allocation.adjustment().clone()),
            properties: execution.outcomes,
            specs,
            elapsed: started.elapsed(),
            cancelled,
        };
        info!(
            passed = report.count("passed"),
            failed = report.count("failed"),
            undeterminable = report.count("undeterminable"),
            skipped = report.count("skipped"),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(report)
    }

    /// Time every property. Returns `None` when cancelled.
    fn calibrate(
        &self,
        mut state: State,
        observer: &mut dyn RunObserver,
        cancel: &CancelToken,
    ) -> CheckResult<Option<(State, Calibration)>> {
        let mut calibration = Calibration::new(self.config.policy.clone(), self.config.bindings.clone());
        let attempts = self.config.policy.calibration_attempts;
        for property in self.properties() {
            debug!(property = %property.name(), attempts, "calibrating");
            let generator = property.generator();
            let (next, mean) = calibrate(state, attempts, &generator, property.law(), cancel);
            state = next;
            let Some(mean) = mean else {
                return Ok(None);
            };
            let budget = calibration.record(property.name(), property.cardinality(), mean)?;
            observer.calibrated(budget);
        }
        Ok(Some((state, calibration)))
    }

    fn skipped_report(&self, started: Instant) -> RunReport {
        let properties = self
            .properties()
            .map(|p| PropertyOutcome {
                name: p.name().to_string(),
                status: Status::Skipped,
                attempts: 0,
                draws: 0,
                elapsed: Duration::ZERO,
            })
            .collect();
        let specs = self
            .specs
            .iter()
            .map(|(name, _)| SpecOutcome {
                name: name.clone(),
                status: Status::Skipped,
            })
            .collect();
        RunReport {
            budgets: Vec::new(),
            adjustment: None,
            properties,
            specs,
            elapsed: started.elapsed(),
            cancelled: true,
        }
    }
}

struct Execution<'a> {
    runner: &'a Runner,
    allocation: &'a Allocation,
    state: State,
    observer: &'a mut dyn RunObserver,
    cancel: &'a CancelToken,
    outcomes: Vec<PropertyOutcome>,
}

impl Execution<'_> {
    fn eval(&mut self, spec: &Spec) -> CheckResult<Status> {
        Ok(match spec {
            Spec::Prop(property) => self.run_property(property)?,
            Spec::Neg(inner) => negate(self.eval(inner)?),
            Spec::Conj(left, right) => match self.eval(left)? {
                Status::Passed => self.eval(right)?,
                other => {
                    self.skip(right);
                    other
                }
            },
            Spec::Disj(left, right) => match self.eval(left)? {
                Status::Passed => {
                    self.skip(right);
                    Status::Passed
                }
                _ => self.eval(right)?,
            },
            Spec::Impl(premise, conclusion) => match self.eval(premise)? {
                Status::Passed => self.eval(conclusion)?,
                other => {
                    self.skip(conclusion);
                    other
                }
            },
        })
    }

    /// Record every property of a branch the connective did not need.
    fn skip(&mut self, spec: &Spec) {
        for property in spec.properties() {
            debug!(property = %property.name(), "not needed, skipped");
            self.finish(property, Status::Skipped, 0, 0, Instant::now());
        }
    }

    fn run_property(&mut self, property: &Property) -> CheckResult<Status> {
        let name = property.name();
        let started = Instant::now();
        if self.cancel.is_cancelled() {
            debug!(property = %name, "skipped");
            return Ok(self.finish(property, Status::Skipped, 0, 0, started));
        }

        let attempts = self.allocation.attempts(name)?;
        self.observer.property_started(name, attempts);
        let generator = property.generator();
        let (state, outcome) = search(
            self.state.clone(),
            attempts,
            &generator,
            property.law(),
            &self.runner.config.search,
            self.cancel,
        );
        self.state = state;

        let status = match outcome.found {
            Some(found) => {
                let counterexample = Counterexample {
                    args: found.value,
                    shapes: property.shapes(),
                    error: found.error,
                    shrink_steps: found.shrink_steps,
                };
                info!(
                    property = %name,
                    attempt = outcome.attempts,
                    shrink_steps = counterexample.shrink_steps,
                    counterexample = %counterexample,
                    "counterexample found"
                );
                Status::Failed {
                    counterexample: Some(counterexample),
                }
            }
            None if outcome.cancelled => Status::Skipped,
            None if outcome.draws == 0 => Status::Undeterminable,
            None => Status::Passed,
        };
        Ok(self.finish(property, status, outcome.attempts, outcome.draws, started))
    }

    fn finish(
        &mut self,
        property: &Property,
        status: Status,
        attempts: u64,
        draws: u64,
        started: Instant,
    ) -> Status {
        let outcome = PropertyOutcome {
            name: property.name().to_string(),
            status: status.clone(),
            attempts,
            draws,
            elapsed: started.elapsed(),
        };
        self.observer.property_finished(&outcome);
        self.outcomes.push(outcome);
        status
    }
}
