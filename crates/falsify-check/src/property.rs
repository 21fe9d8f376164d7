//! Properties: a law over named, generated parameters.

use crate::error::{CheckError, CheckResult, LawError};
use falsify_card::{Cardinality, Shape};
use falsify_gen::collection::argument_pack;
use falsify_gen::{infer, Args, Generator, Value};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A law returns whether it holds, or an error, which also counts as a
/// failure.
pub type Law = Rc<dyn Fn(&Args) -> Result<bool, LawError>>;

/// Result of evaluating a law once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Holds,
    /// The law returned `false` (no error) or failed with an error.
    Fails(Option<LawError>),
}

impl Verdict {
    pub fn holds(&self) -> bool {
        matches!(self, Verdict::Holds)
    }
}

/// Evaluate `law`, converting a panic into [`LawError::Panicked`].
pub fn evaluate<T>(law: &dyn Fn(&T) -> Result<bool, LawError>, value: &T) -> Verdict {
    match panic::catch_unwind(AssertUnwindSafe(|| law(value))) {
        Ok(Ok(true)) => Verdict::Holds,
        Ok(Ok(false)) => Verdict::Fails(None),
        Ok(Err(e)) => Verdict::Fails(Some(e)),
        Err(payload) => Verdict::Fails(Some(LawError::Panicked(panic_message(&*payload)))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// One named parameter.
#[derive(Clone)]
pub struct Param {
    pub name: String,
    pub generator: Generator<Value>,
    /// Declared shape, when known. Used for cardinality and display.
    pub shape: Option<Shape>,
}

impl Param {
    pub fn cardinality(&self) -> Cardinality {
        match &self.shape {
            Some(shape) => shape.cardinality(),
            None => self.generator.cardinality().clone(),
        }
    }
}

/// A named law with its parameters.
#[derive(Clone)]
pub struct Property {
    name: String,
    params: Vec<Param>,
    law: Law,
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("params", &params)
            .finish_non_exhaustive()
    }
}

impl Property {
    pub fn builder(name: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Product of the parameter cardinalities.
    pub fn cardinality(&self) -> Cardinality {
        Cardinality::product_all(self.params.iter().map(Param::cardinality))
    }

    /// Generator of complete argument sets, shrinking one argument at a time.
    pub fn generator(&self) -> Generator<Args> {
        let params = self
            .params
            .iter()
            .map(|p| (p.name.clone(), p.generator.clone()))
            .collect();
        argument_pack(params)
    }

    pub fn shapes(&self) -> Vec<Option<Shape>> {
        self.params.iter().map(|p| p.shape.clone()).collect()
    }

    pub fn law(&self) -> &dyn Fn(&Args) -> Result<bool, LawError> {
        self.law.as_ref()
    }

    pub fn check(&self, args: &Args) -> Verdict {
        evaluate(self.law(), args)
    }
}

enum Source {
    Generator(Generator<Value>),
    Shape(Shape),
    Both(Generator<Value>, Shape),
}

/// Builder for [`Property`]. Parameters keep declaration order.
pub struct PropertyBuilder {
    name: String,
    params: Vec<(String, Source)>,
}

impl PropertyBuilder {
    /// Parameter drawn from an explicit generator.
    pub fn param(mut self, name: impl Into<String>, generator: Generator<Value>) -> Self {
        self.params.push((name.into(), Source::Generator(generator)));
        self
    }

    /// Parameter whose generator is inferred from its shape.
    pub fn shaped(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.params.push((name.into(), Source::Shape(shape)));
        self
    }

    /// Parameter with an explicit generator and a declared shape.
    pub fn param_with_shape(
        mut self,
        name: impl Into<String>,
        generator: Generator<Value>,
        shape: Shape,
    ) -> Self {
        self.params.push((name.into(), Source::Both(generator, shape)));
        self
    }

    /// Attach the law and validate the parameter list.
    pub fn law(self, law: impl Fn(&Args) -> Result<bool, LawError> + 'static) -> CheckResult<Property> {
        let mut params: Vec<Param> = Vec::with_capacity(self.params.len());
        for (name, source) in self.params {
            if params.iter().any(|p| p.name == name) {
                return Err(CheckError::DuplicateParameter {
                    property: self.name,
                    parameter: name,
                });
            }
            let (generator, shape) = match source {
                Source::Generator(g) => (g, None),
                Source::Both(g, shape) => (g, Some(shape)),
                Source::Shape(shape) => match infer(&shape) {
                    Ok(g) => (g, Some(shape)),
                    Err(source) => {
                        return Err(CheckError::InvalidGenerator {
                            property: self.name,
                            parameter: name,
                            source,
                        })
                    }
                },
            };
            params.push(Param {
                name,
                generator,
                shape,
            });
        }
        Ok(Property {
            name: self.name,
            params,
            law: Rc::new(law),
        })
    }
}
