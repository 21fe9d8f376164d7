//! Spec trees: properties combined with logical connectives.

use crate::property::Property;
use crate::report::Status;

/// A property or a combination of specs.
///
/// Connectives evaluate left to right and stop once the result is decided.
/// Properties in the branch that was not needed still appear in the run
/// report, as skipped with no attempts.
#[derive(Debug, Clone)]
pub enum Spec {
    Prop(Property),
    /// Holds when the inner spec is refuted.
    Neg(Box<Spec>),
    Conj(Box<Spec>, Box<Spec>),
    Disj(Box<Spec>, Box<Spec>),
    /// The conclusion is checked only once the premise holds. A premise
    /// that does not hold decides the result.
    Impl(Box<Spec>, Box<Spec>),
}

impl From<Property> for Spec {
    fn from(property: Property) -> Self {
        Spec::Prop(property)
    }
}

impl Spec {
    pub fn prop(property: Property) -> Self {
        Spec::Prop(property)
    }

    pub fn not(spec: impl Into<Spec>) -> Self {
        Spec::Neg(Box::new(spec.into()))
    }

    pub fn and(left: impl Into<Spec>, right: impl Into<Spec>) -> Self {
        Spec::Conj(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn or(left: impl Into<Spec>, right: impl Into<Spec>) -> Self {
        Spec::Disj(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn implies(premise: impl Into<Spec>, conclusion: impl Into<Spec>) -> Self {
        Spec::Impl(Box::new(premise.into()), Box::new(conclusion.into()))
    }

    /// Properties in left-to-right order.
    pub fn properties(&self) -> Vec<&Property> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Property>) {
        match self {
            Spec::Prop(p) => out.push(p),
            Spec::Neg(inner) => inner.collect(out),
            Spec::Conj(l, r) | Spec::Disj(l, r) | Spec::Impl(l, r) => {
                l.collect(out);
                r.collect(out);
            }
        }
    }
}

/// Status of a negated spec.
///
/// A refuted inner spec makes the negation pass. An inner spec that held
/// makes it fail, with no counterexample to show.
pub(crate) fn negate(inner: Status) -> Status {
    match inner {
        Status::Passed => Status::Failed {
            counterexample: None,
        },
        Status::Failed { .. } => Status::Passed,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use falsify_card::Shape;

    fn prop(name: &str) -> Property {
        Property::builder(name)
            .shaped("b", Shape::Bool)
            .law(|_| Ok(true))
            .unwrap()
    }

    #[test]
    fn test_properties_in_order() {
        let spec = Spec::implies(
            Spec::not(prop("a")),
            Spec::or(prop("b"), Spec::and(prop("c"), prop("d"))),
        );
        let names: Vec<&str> = spec.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_negate() {
        assert_eq!(
            negate(Status::Passed),
            Status::Failed {
                counterexample: None
            }
        );
        assert_eq!(
            negate(Status::Failed {
                counterexample: None
            }),
            Status::Passed
        );
        assert_eq!(negate(Status::Undeterminable), Status::Undeterminable);
        assert_eq!(negate(Status::Skipped), Status::Skipped);
    }
}
