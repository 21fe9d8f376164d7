//! Seeded, shrinkable generators for falsify.
//!
//! Values are drawn from explicit random [`State`]s and come back as
//! [`Dissection`]s: the drawn value plus a lazily computed tree of simpler
//! candidates used to minimize counterexamples. Generators also carry the
//! symbolic [`Cardinality`](falsify_card::Cardinality) of their domain.

pub mod collection;
pub mod dissect;
pub mod error;
pub mod generate;
pub mod infer;
pub mod primitive;
pub mod prng;
pub mod sample;
pub mod stream;
pub mod trim;
pub mod value;

pub use dissect::{Dissection, Forced, Trimmer};
pub use error::{ArgError, GenError, GenResult};
pub use generate::{map2, map_n, Generator, Sample};
pub use infer::infer;
pub use prng::State;
pub use stream::Stream;
pub use value::{Args, Value};
