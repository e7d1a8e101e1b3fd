//! Classifies a deploy result into a single verdict
//!
//! Several failure signals can be present in one result. The rules below
//! are evaluated in order and the first one that matches decides. Component
//! failures come first because the API may report overall success while
//! still listing failed components.

use std::fmt;

use super::result::DeployResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    ComponentFailure,
    TestFailure,
    ApiReportedFailure {
        status: String,
        error_status_code: String,
        error_message: String,
    },
    Success,
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ComponentFailure => f.write_str("Some components failed deployment"),
            Verdict::TestFailure => f.write_str("Some tests failed"),
            Verdict::ApiReportedFailure {
                status,
                error_status_code,
                error_message,
            } => write!(
                f,
                "Status: {}, Status Code: {}, Error Message: {}",
                status, error_status_code, error_message
            ),
            Verdict::Success => f.write_str("Success"),
        }
    }
}

/// A verdict together with the result it was derived from, so the report
/// can be rendered from the outcome alone
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub result: DeployResult,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.verdict.is_success()
    }
}

type Rule = fn(&DeployResult) -> Option<Verdict>;

/// Ordered; the first rule returning a verdict wins.
const RULES: &[Rule] = &[component_failures, test_failures, api_reported_failure];

fn component_failures(result: &DeployResult) -> Option<Verdict> {
    (!result.component_failures.is_empty()).then_some(Verdict::ComponentFailure)
}

fn test_failures(result: &DeployResult) -> Option<Verdict> {
    (!result.test_failures.is_empty()).then_some(Verdict::TestFailure)
}

fn api_reported_failure(result: &DeployResult) -> Option<Verdict> {
    (!result.success).then(|| Verdict::ApiReportedFailure {
        status: result.status.clone(),
        error_status_code: result.error_status_code.clone(),
        error_message: result.error_message.clone(),
    })
}

pub fn verdict(result: &DeployResult) -> Verdict {
    RULES
        .iter()
        .find_map(|rule| rule(result))
        .unwrap_or(Verdict::Success)
}

pub fn classify(result: DeployResult) -> Outcome {
    Outcome {
        verdict: verdict(&result),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::result::{CodeCoverageWarning, ComponentFailure, TestFailure};

    fn result(component_failure: bool, test_failure: bool, success: bool) -> DeployResult {
        DeployResult {
            success,
            status: if success { "Succeeded" } else { "Failed" }.to_string(),
            error_status_code: "UNKNOWN_EXCEPTION".to_string(),
            error_message: "boom".to_string(),
            component_failures: if component_failure {
                vec![ComponentFailure {
                    full_name: "Foo.cls".into(),
                    line_number: 12,
                    problem_type: "Error".into(),
                    problem: "syntax error".into(),
                }]
            } else {
                vec![]
            },
            test_failures: if test_failure {
                vec![TestFailure {
                    name: "FooTest".into(),
                    method_name: "testFoo".into(),
                    message: "failed".into(),
                    stack_trace: "line 1".into(),
                }]
            } else {
                vec![]
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_every_combination_has_exactly_the_documented_verdict() {
        for component_failure in [false, true] {
            for test_failure in [false, true] {
                for success in [false, true] {
                    let got = verdict(&result(component_failure, test_failure, success));
                    let expected = if component_failure {
                        Verdict::ComponentFailure
                    } else if test_failure {
                        Verdict::TestFailure
                    } else if !success {
                        Verdict::ApiReportedFailure {
                            status: "Failed".into(),
                            error_status_code: "UNKNOWN_EXCEPTION".into(),
                            error_message: "boom".into(),
                        }
                    } else {
                        Verdict::Success
                    };
                    assert_eq!(got, expected, "{component_failure} {test_failure} {success}");
                }
            }
        }
    }

    #[test]
    fn test_component_failures_win_over_reported_success() {
        assert_eq!(verdict(&result(true, false, true)), Verdict::ComponentFailure);
    }

    #[test]
    fn test_coverage_warnings_do_not_affect_verdict() {
        let mut clean = result(false, false, true);
        clean.code_coverage_warnings.push(CodeCoverageWarning {
            name: "Foo".into(),
            message: "low coverage".into(),
        });
        let outcome = classify(clean);
        assert!(outcome.is_success());
        assert_eq!(outcome.result.code_coverage_warnings.len(), 1);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let input = result(false, true, false);
        let first = classify(input.clone());
        let second = classify(input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_api_failure_message_includes_details() {
        let message = verdict(&result(false, false, false)).to_string();
        assert!(message.contains("Failed"));
        assert!(message.contains("UNKNOWN_EXCEPTION"));
        assert!(message.contains("boom"));
    }
}
