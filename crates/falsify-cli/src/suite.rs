//! Bundled demonstration suite.

use crate::CliResult;
use falsify_card::Shape;
use falsify_check::{LawError, Property, Spec};
use falsify_gen::collection::{map_of, option, sorted_list, subset_of};
use falsify_gen::primitive::{float, int, small_int, small_nat, word};
use falsify_gen::Value;

/// Named specs run by the `falsify` binary.
pub fn demo() -> CliResult<Vec<(&'static str, Spec)>> {
    let reverse = Property::builder("reverse_involution")
        .shaped("xs", Shape::list(Shape::Int))
        .law(|a| {
            let xs = a.list("xs")?;
            let mut twice = xs.to_vec();
            twice.reverse();
            twice.reverse();
            Ok(twice == xs)
        })?;

    let sorted = Property::builder("sorted_list_is_ordered")
        .param("xs", sorted_list(0, 20, &int())?.erase())
        .law(|a| Ok(a.list("xs")?.windows(2).all(|w| w[0] <= w[1])))?;

    let commutes = Property::builder("addition_commutes")
        .shaped("a", Shape::Int)
        .shaped("b", Shape::Int)
        .law(|a| {
            let (x, y) = (a.int("a")?, a.int("b")?);
            Ok(x.wrapping_add(y) == y.wrapping_add(x))
        })?;

    let associates = Property::builder("multiplication_associates")
        .shaped("a", Shape::IntRange(-1_000, 1_000))
        .shaped("b", Shape::IntRange(-1_000, 1_000))
        .shaped("c", Shape::IntRange(-1_000, 1_000))
        .law(|a| {
            let (x, y, z) = (a.int("a")?, a.int("b")?, a.int("c")?);
            Ok((x * y) * z == x * (y * z))
        })?;

    let concat = Property::builder("concat_length")
        .shaped("s", Shape::Str)
        .shaped("t", Shape::Str)
        .law(|a| {
            let (s, t) = (a.str("s")?, a.str("t")?);
            Ok(format!("{}{}", s, t).len() == s.len() + t.len())
        })?;

    let words = Property::builder("words_are_alphabetic")
        .param("w", word().erase())
        .law(|a| Ok(a.str("w")?.chars().all(|c| c.is_ascii_alphabetic())))?;

    let lookup = Property::builder("map_insert_then_lookup")
        .param("m", map_of(&word(), &small_int()).erase())
        .param("k", word().erase())
        .param("v", small_int().erase())
        .law(|a| {
            let mut m = a.map("m")?.clone();
            let (k, v) = (a.value("k")?.clone(), a.value("v")?.clone());
            m.insert(k.clone(), v.clone());
            Ok(m.get(&k) == Some(&v))
        })?;

    let defaulted = Property::builder("option_default_is_natural")
        .param("o", option(&small_nat()).erase())
        .law(|a| match a.value("o")? {
            Value::Option(None) => Ok(true),
            Value::Option(Some(n)) => Ok(n.as_int().is_some_and(|n| n >= 0)),
            other => Err(LawError::raised(format!("expected an option, got {}", other))),
        })?;

    let magnitude = Property::builder("float_abs_is_non_negative")
        .param("x", float().erase())
        .law(|a| Ok(a.float("x")?.abs() >= 0.0))?;

    let subsets = Property::builder("subset_stays_in_universe")
        .param("s", subset_of(vec![1i64, 2, 3, 4, 5]).erase())
        .law(|a| {
            Ok(a.set("s")?
                .iter()
                .all(|v| v.as_int().is_some_and(|n| (1..=5).contains(&n))))
        })?;

    let bounded = Property::builder("every_int_below_1000")
        .shaped("x", Shape::IntRange(0, 10_000))
        .law(|a| Ok(a.int("x")? < 1_000))?;

    Ok(vec![
        ("lists", Spec::and(reverse, sorted)),
        ("arithmetic", Spec::implies(commutes, associates)),
        ("text", Spec::or(concat, words)),
        ("maps", Spec::prop(lookup)),
        ("options", Spec::prop(defaulted)),
        ("floats", Spec::prop(magnitude)),
        ("subsets", Spec::prop(subsets)),
        ("bounds_are_refutable", Spec::not(bounded)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use falsify_check::{BudgetPolicy, CancelToken, NullObserver, RunConfig, Runner, Status};
    use std::time::Duration;

    #[test]
    fn test_demo_suite_passes() {
        let mut runner = Runner::new(RunConfig {
            budget: Duration::from_secs(60),
            seed: Some(17),
            policy: BudgetPolicy {
                infinite_ceiling: 1_000,
                ..BudgetPolicy::default()
            },
            ..RunConfig::default()
        });
        for (name, spec) in demo().unwrap() {
            runner.add(name, spec).unwrap();
        }
        let report = runner.run(&mut NullObserver, &CancelToken::new()).unwrap();
        for spec in &report.specs {
            assert_eq!(spec.status, Status::Passed, "spec {}", spec.name);
        }
        let refuted = report.property("every_int_below_1000").unwrap();
        let Status::Failed {
            counterexample: Some(cx),
        } = &refuted.status
        else {
            panic!("expected a counterexample");
        };
        assert_eq!(cx.args.int("x").unwrap(), 1_000);
    }
}
