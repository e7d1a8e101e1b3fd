//! Renders a classified deploy outcome as text

use std::fmt::Write;

use super::collector::MANIFEST_FILE;
use super::interpreter::Outcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub exit_is_failure: bool,
}

/// Render counts and details in a fixed order: successes, test successes,
/// failures, test failures, coverage warnings. Per-component success lines
/// are only included when `verbose` is set; every failure line always is.
pub fn render(outcome: &Outcome, verbose: bool) -> Report {
    let result = &outcome.result;
    let mut out = String::new();

    // The manifest is echoed back as a success; it is not a component.
    let successes: Vec<_> = result
        .component_successes
        .iter()
        .filter(|s| s.full_name != MANIFEST_FILE)
        .collect();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "\nSuccesses - {}", successes.len());
    if verbose {
        for success in &successes {
            let _ = writeln!(
                out,
                "{}\n\tstatus: {}\n\tid={}",
                success.full_name,
                success.verb(),
                success.id
            );
        }
    }

    let _ = writeln!(out, "\nTest Successes - {}", result.test_successes.len());
    for test in &result.test_successes {
        let _ = writeln!(out, "  [PASS]  {}::{}", test.name, test.method_name);
    }

    let _ = writeln!(out, "\nFailures - {}", result.component_failures.len());
    for failure in &result.component_failures {
        if failure.is_deployment_wide() {
            let _ = writeln!(out, "{}", failure.problem);
        } else {
            let _ = writeln!(
                out,
                "\"{}\", line {}: {} {}",
                failure.full_name, failure.line_number, failure.problem_type, failure.problem
            );
        }
    }

    let _ = writeln!(out, "\nTest Failures - {}", result.test_failures.len());
    for failure in &result.test_failures {
        let _ = writeln!(
            out,
            "\n  [FAIL]  {}::{}: {}",
            failure.name, failure.method_name, failure.message
        );
        let _ = writeln!(out, "{}", failure.stack_trace);
    }

    if !result.code_coverage_warnings.is_empty() {
        let _ = writeln!(
            out,
            "\nCode Coverage Warnings - {}",
            result.code_coverage_warnings.len()
        );
        for warning in &result.code_coverage_warnings {
            let _ = writeln!(out, "\n {}: {}", warning.name, warning.message);
        }
    }

    Report {
        text: out,
        exit_is_failure: !outcome.is_success(),
    }
}
