//! Symbolic cardinality algebra for falsify.
//!
//! Provides the `Cardinality` expression type with simplification and
//! saturating evaluation, the asymptotic ladder used to pick attempt
//! counts, and `Shape`, the closed domain description that cardinalities
//! and generators are inferred from.

pub mod asymptotic;
pub mod error;
pub mod expr;
pub mod shape;

pub use asymptotic::{classify, AsymptoticClass};
pub use error::{CardError, CardResult};
pub use expr::{Bindings, Cardinality, Magnitude, DEFAULT_BINDING};
pub use shape::{Shape, LENGTH_VAR, PRINTABLE_CARDINALITY};
