//! Counterexample search and budgeted execution for falsify.
//!
//! A [`Runner`] holds named [`Spec`]s built from [`Property`]s. Running it
//! first times a few attempts of every property, then splits the wall-clock
//! budget into per-property attempt counts ([`Allocation`]), then searches
//! each property for a counterexample and shrinks the first one it finds.

pub mod budget;
pub mod context;
pub mod error;
pub mod property;
pub mod report;
pub mod runner;
pub mod search;
pub mod spec;

pub use budget::{Adjustment, Allocation, BudgetPolicy, Calibration, PropertyBudget};
pub use context::{CancelToken, NullObserver, RunConfig, RunObserver, TracingObserver};
pub use error::{CheckError, CheckResult, LawError};
pub use property::{evaluate, Law, Param, Property, PropertyBuilder, Verdict};
pub use report::{Counterexample, PropertyOutcome, RunReport, SpecOutcome, Status};
pub use runner::Runner;
pub use search::{calibrate, search, shrink, Found, SearchConfig, SearchOutcome};
pub use spec::Spec;
