//! Runs the `falsify` binary against subsets of the demo suite.

use std::process::{Command, Output};

fn falsify(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_falsify"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn filtered_run_passes() {
    let output = falsify(&["--seed", "1", "--budget", "0.5", "--filter", "maps"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("map_insert_then_lookup"));
    assert!(stdout.contains("Result: OK"));
}

#[test]
fn refuted_property_prints_counterexample() {
    let output = falsify(&["--seed", "3", "--budget", "0.5", "--filter", "bounds"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("counterexample: x = 1000 : 0..=10000"));
}

#[test]
fn unmatched_filter_is_an_error() {
    let output = falsify(&["--filter", "no-such-spec"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no spec matches filter"));
}

#[test]
fn negative_budget_is_rejected() {
    let output = falsify(&["--budget=-1"]);
    assert_eq!(output.status.code(), Some(2));
}
