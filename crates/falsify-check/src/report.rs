//! Outcome records handed to reporting layers.

use crate::budget::{Adjustment, PropertyBudget};
use crate::error::LawError;
use falsify_card::Shape;
use falsify_gen::Args;
use std::fmt;
use std::time::Duration;

/// A minimal failing argument set.
#[derive(Debug, Clone, PartialEq)]
pub struct Counterexample {
    pub args: Args,
    /// Declared shape per argument, in argument order, for display.
    pub shapes: Vec<Option<Shape>>,
    /// Error raised by the law on `args`, if it raised rather than
    /// returning `false`.
    pub error: Option<LawError>,
    /// Successful shrink steps taken from the first failing draw.
    pub shrink_steps: usize,
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
            if let Some(Some(shape)) = self.shapes.get(i) {
                write!(f, " : {}", shape)?;
            }
        }
        if let Some(error) = &self.error {
            write!(f, " ({})", error)?;
        }
        Ok(())
    }
}

/// Verdict of a property or spec.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Passed,
    /// Refuted. A negated spec that unexpectedly held has no counterexample.
    Failed { counterexample: Option<Counterexample> },
    /// No attempt produced a value to test.
    Undeterminable,
    /// Not run to completion because the run was cancelled, or not run
    /// because a connective was already decided without it.
    Skipped,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed { .. } => "failed",
            Status::Undeterminable => "undeterminable",
            Status::Skipped => "skipped",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Status::Passed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of running one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOutcome {
    pub name: String,
    pub status: Status,
    /// Attempts started, including those whose draw produced no value.
    pub attempts: u64,
    /// Attempts whose draw produced a value.
    pub draws: u64,
    pub elapsed: Duration,
}

/// Result of one top-level spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecOutcome {
    pub name: String,
    pub status: Status,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    /// Budget view, one record per calibrated property. Empty when the run
    /// was cancelled during calibration.
    pub budgets: Vec<PropertyBudget>,
    /// How ideal counts were fitted to the budget, when allocation ran.
    pub adjustment: Option<Adjustment>,
    pub properties: Vec<PropertyOutcome>,
    pub specs: Vec<SpecOutcome>,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl RunReport {
    /// Whether every spec passed.
    pub fn success(&self) -> bool {
        self.specs.iter().all(|s| s.status.is_passed())
    }

    pub fn count(&self, label: &str) -> usize {
        self.specs.iter().filter(|s| s.status.label() == label).count()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyOutcome> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn spec(&self, name: &str) -> Option<&SpecOutcome> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn budget(&self, name: &str) -> Option<&PropertyBudget> {
        self.budgets.iter().find(|b| b.name == name)
    }
}
