//! Two-phase attempt budgeting.
//!
//! Calibration records, per property, the measured time of one attempt and
//! the cardinality of its domain, and derives an ideal attempt count from
//! the cardinality's asymptotic class. Finalizing the calibration against a
//! wall-clock budget freezes an [`Allocation`]:
//!
//! - when the ideal counts fit, leftover time is spent on extra attempts
//!   for properties with infinite domains, up to a ceiling;
//! - when they do not fit, every count is scaled by `budget / total`, with
//!   a floor of one attempt per property even if that overruns the budget.

use crate::error::{CheckError, CheckResult};
use falsify_card::{AsymptoticClass, Bindings, Cardinality, Magnitude};
use std::time::Duration;
use tracing::{debug, info};

/// Tunable attempt-count policy. No value here is normative.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPolicy {
    /// Silent attempts used to time each property.
    pub calibration_attempts: u64,
    /// Hard cap on attempts for infinite domains after slack is spent.
    pub infinite_ceiling: u64,
    /// Ideal attempts for infinite domains.
    pub infinite_default: u64,
    /// Ideal attempts for `O(n^k)` domains.
    pub polynomial_attempts: u64,
    /// Ideal attempts for `O(n²)` domains.
    pub quadratic_attempts: u64,
    /// Ideal attempts for `O(log n)` domains.
    pub logarithmic_attempts: u64,
    /// Lower bound for the square-root rules.
    pub minimum_ideal: u64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            calibration_attempts: 10,
            infinite_ceiling: 10_000,
            infinite_default: 1_000,
            polynomial_attempts: 50,
            quadratic_attempts: 100,
            logarithmic_attempts: 200,
            minimum_ideal: 10,
        }
    }
}

impl BudgetPolicy {
    /// Ideal attempt count for a domain of the given class and evaluated
    /// size.
    ///
    /// Linear domains get `sqrt(size)`. Constant domains get `sqrt(size)`
    /// up to a thousand values and then grow logarithmically. Unbounded
    /// magnitudes are treated as infinite.
    pub fn ideal_attempts(&self, class: AsymptoticClass, size: Magnitude) -> u64 {
        match class {
            AsymptoticClass::Infinite => self.infinite_default,
            AsymptoticClass::Polynomial => self.polynomial_attempts,
            AsymptoticClass::Quadratic => self.quadratic_attempts,
            AsymptoticClass::Logarithmic => self.logarithmic_attempts,
            AsymptoticClass::Linear => match size.finite() {
                Some(n) => self.minimum_ideal.max((n as f64).sqrt() as u64),
                None => self.infinite_default,
            },
            AsymptoticClass::Constant => match size.finite() {
                Some(n) => self.constant_ideal(n),
                None => self.infinite_default,
            },
        }
    }

    fn constant_ideal(&self, size: u64) -> u64 {
        const SMALL: f64 = 1e3;
        const LARGE: f64 = 1e6;
        let size = size as f64;
        let ideal = if size <= SMALL {
            size.sqrt()
        } else if size <= LARGE {
            SMALL.sqrt() + (size / SMALL).log10() * 10.0
        } else {
            SMALL.sqrt() + 30.0 + (size / LARGE).log10() * 5.0
        };
        self.minimum_ideal.max(ideal as u64)
    }
}

/// Budget record for one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBudget {
    pub name: String,
    pub cardinality: Cardinality,
    pub class: AsymptoticClass,
    /// Measured mean time of one attempt.
    pub time_per_attempt: Duration,
    pub ideal: u64,
    pub allocated: u64,
}

impl PropertyBudget {
    /// Expected time for the allocated attempts.
    pub fn estimated_time(&self) -> Duration {
        seconds(self.time_per_attempt.as_secs_f64() * self.allocated as f64)
    }

    fn ideal_cost(&self) -> f64 {
        self.time_per_attempt.as_secs_f64() * self.ideal as f64
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Calibration phase: collects one budget record per property.
#[derive(Debug, Clone)]
pub struct Calibration {
    policy: BudgetPolicy,
    bindings: Bindings,
    entries: Vec<PropertyBudget>,
}

impl Calibration {
    pub fn new(policy: BudgetPolicy, bindings: Bindings) -> Self {
        Self {
            policy,
            bindings,
            entries: Vec::new(),
        }
    }

    pub fn policy(&self) -> &BudgetPolicy {
        &self.policy
    }

    /// Record a calibrated property and compute its ideal attempt count.
    pub fn record(
        &mut self,
        name: &str,
        cardinality: Cardinality,
        time_per_attempt: Duration,
    ) -> CheckResult<&PropertyBudget> {
        if self.entries.iter().any(|e| e.name == name) {
            return Err(CheckError::DuplicateProperty {
                name: name.to_string(),
            });
        }
        let cardinality = cardinality.simplify();
        let class = cardinality.asymptotic_class();
        let size = cardinality.evaluate(&self.bindings)?;
        let ideal = self.policy.ideal_attempts(class, size);
        debug!(
            property = %name,
            class = %class,
            size = %size,
            ideal,
            time_per_attempt_us = time_per_attempt.as_micros() as u64,
            "calibrated"
        );
        self.entries.push(PropertyBudget {
            name: name.to_string(),
            cardinality,
            class,
            time_per_attempt,
            ideal,
            allocated: ideal,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Freeze the calibration into an allocation for `budget`.
    pub fn finalize(self, budget: Duration) -> Allocation {
        let Calibration {
            policy,
            mut entries,
            ..
        } = self;
        let total: f64 = entries.iter().map(PropertyBudget::ideal_cost).sum();
        let available = budget.as_secs_f64();

        let adjustment = if total > available {
            let scale = available / total;
            for entry in &mut entries {
                entry.allocated = ((entry.ideal as f64 * scale) as u64).max(1);
            }
            Adjustment::Scaled { factor: scale }
        } else {
            let slack = available - total;
            let spent = boost_infinite(&mut entries, slack, policy.infinite_ceiling);
            Adjustment::Boosted {
                slack: seconds(slack),
                spent: seconds(spent),
            }
        };

        let allocation = Allocation {
            budget,
            ideal_total: seconds(total),
            adjustment,
            entries,
        };
        info!(
            properties = allocation.entries.len(),
            budget_ms = budget.as_millis() as u64,
            ideal_ms = allocation.ideal_total.as_millis() as u64,
            adjustment = ?allocation.adjustment,
            "budget allocated"
        );
        allocation
    }
}

/// Spend `slack` seconds on extra attempts for infinite-domain properties,
/// split evenly among those still below the ceiling. Returns the seconds
/// spent.
fn boost_infinite(entries: &mut [PropertyBudget], mut slack: f64, ceiling: u64) -> f64 {
    let mut open: Vec<usize> = Vec::new();
    for (i, entry) in entries.iter_mut().enumerate() {
        if entry.class != AsymptoticClass::Infinite || entry.allocated >= ceiling {
            continue;
        }
        if entry.time_per_attempt.is_zero() {
            entry.allocated = ceiling;
        } else {
            open.push(i);
        }
    }

    let mut spent_total = 0.0;
    while !open.is_empty() && slack > 0.0 {
        let share = slack / open.len() as f64;
        let mut spent = 0.0;
        let mut still_open = Vec::new();
        for &i in &open {
            let entry = &mut entries[i];
            let cost = entry.time_per_attempt.as_secs_f64();
            let extra = ((share / cost) as u64).min(ceiling - entry.allocated);
            entry.allocated += extra;
            spent += extra as f64 * cost;
            if extra > 0 && entry.allocated < ceiling {
                still_open.push(i);
            }
        }
        if spent == 0.0 {
            break;
        }
        slack -= spent;
        spent_total += spent;
        open = still_open;
    }
    spent_total
}

/// How the ideal counts were adjusted to the budget.
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    /// Ideals fit; slack went to infinite domains.
    Boosted { slack: Duration, spent: Duration },
    /// Ideals overran; every count was multiplied by `factor`.
    Scaled { factor: f64 },
}

/// Frozen per-property attempt counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    budget: Duration,
    ideal_total: Duration,
    adjustment: Adjustment,
    entries: Vec<PropertyBudget>,
}

impl Allocation {
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time the ideal counts would have taken.
    pub fn ideal_total(&self) -> Duration {
        self.ideal_total
    }

    pub fn adjustment(&self) -> &Adjustment {
        &self.adjustment
    }

    pub fn entries(&self) -> &[PropertyBudget] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> CheckResult<&PropertyBudget> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CheckError::UnknownProperty {
                name: name.to_string(),
            })
    }

    pub fn attempts(&self, name: &str) -> CheckResult<u64> {
        self.get(name).map(|e| e.allocated)
    }

    /// Expected time of the allocated counts.
    pub fn estimated_total(&self) -> Duration {
        self.entries.iter().map(PropertyBudget::estimated_time).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Cardinality {
        Cardinality::var("n")
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_ideal_by_class() {
        let policy = BudgetPolicy::default();
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Infinite, Magnitude::Infinite), 1000);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Polynomial, Magnitude::Finite(5)), 50);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Quadratic, Magnitude::Finite(5)), 100);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Logarithmic, Magnitude::Finite(5)), 200);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Linear, Magnitude::Finite(10_000)), 100);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Linear, Magnitude::Finite(4)), 10);
    }

    #[test]
    fn test_constant_tiers() {
        let policy = BudgetPolicy::default();
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Constant, Magnitude::Finite(2)), 10);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Constant, Magnitude::Finite(900)), 30);
        // sqrt(1000) + log10(1000) * 10
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Constant, Magnitude::Finite(1_000_000)), 61);
        // sqrt(1000) + 30 + log10(100) * 5
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Constant, Magnitude::Finite(100_000_000)), 71);
        assert_eq!(policy.ideal_attempts(AsymptoticClass::Constant, Magnitude::Saturated), 1000);
    }

    #[test]
    fn test_duplicate_property() {
        let mut cal = Calibration::new(BudgetPolicy::default(), Bindings::new());
        cal.record("p", Cardinality::constant(4), secs(1)).unwrap();
        assert_eq!(
            cal.record("p", Cardinality::constant(4), secs(1)).unwrap_err(),
            CheckError::DuplicateProperty { name: "p".into() }
        );
    }

    #[test]
    fn test_unbound_variable_is_error() {
        let mut cal = Calibration::new(BudgetPolicy::default(), Bindings::strict());
        assert!(matches!(
            cal.record("p", n(), secs(1)),
            Err(CheckError::Cardinality(_))
        ));
    }

    #[test]
    fn test_overrun_scales_proportionally() {
        let policy = BudgetPolicy {
            polynomial_attempts: 80,
            quadratic_attempts: 20,
            ..BudgetPolicy::default()
        };
        let mut cal = Calibration::new(policy, Bindings::new());
        cal.record("heavy", n().pow(Cardinality::constant(3)), secs(1)).unwrap();
        cal.record("light", n().pow(Cardinality::constant(2)), secs(1)).unwrap();
        let allocation = cal.finalize(secs(50));
        assert_eq!(allocation.attempts("heavy").unwrap(), 40);
        assert_eq!(allocation.attempts("light").unwrap(), 10);
        assert_eq!(allocation.adjustment(), &Adjustment::Scaled { factor: 0.5 });
        assert_eq!(allocation.ideal_total(), secs(100));
    }

    #[test]
    fn test_overrun_keeps_one_attempt_floor() {
        let mut cal = Calibration::new(BudgetPolicy::default(), Bindings::new());
        cal.record("slow", Cardinality::Infinite, secs(10)).unwrap();
        cal.record("tiny", Cardinality::constant(2), Duration::from_millis(1)).unwrap();
        let allocation = cal.finalize(secs(1));
        assert_eq!(allocation.attempts("slow").unwrap(), 1);
        assert_eq!(allocation.attempts("tiny").unwrap(), 1);
        assert!(allocation.estimated_total() > allocation.budget());
    }

    #[test]
    fn test_underrun_boosts_infinite_to_ceiling() {
        let mut cal = Calibration::new(BudgetPolicy::default(), Bindings::new());
        cal.record("inf", Cardinality::Infinite, Duration::from_millis(1)).unwrap();
        cal.record("finite", Cardinality::constant(100), Duration::from_millis(1)).unwrap();
        let allocation = cal.finalize(secs(3600));
        assert_eq!(allocation.attempts("inf").unwrap(), 10_000);
        assert_eq!(allocation.attempts("finite").unwrap(), 10);
    }

    #[test]
    fn test_underrun_splits_slack() {
        let mut cal = Calibration::new(BudgetPolicy::default(), Bindings::new());
        cal.record("a", Cardinality::Infinite, Duration::from_millis(10)).unwrap();
        cal.record("b", Cardinality::Infinite, Duration::from_millis(10)).unwrap();
        // ideal cost 20s, slack 10s: 500 extra attempts each
        let allocation = cal.finalize(secs(30));
        assert_eq!(allocation.attempts("a").unwrap(), 1500);
        assert_eq!(allocation.attempts("b").unwrap(), 1500);
    }

    #[test]
    fn test_zero_cost_goes_to_ceiling() {
        let mut cal = Calibration::new(BudgetPolicy::default(), Bindings::new());
        cal.record("free", Cardinality::Infinite, Duration::ZERO).unwrap();
        let allocation = cal.finalize(Duration::ZERO);
        assert_eq!(allocation.attempts("free").unwrap(), 10_000);
    }

    #[test]
    fn test_unknown_property() {
        let allocation = Calibration::new(BudgetPolicy::default(), Bindings::new()).finalize(secs(1));
        assert!(matches!(
            allocation.attempts("missing"),
            Err(CheckError::UnknownProperty { .. })
        ));
    }
}
