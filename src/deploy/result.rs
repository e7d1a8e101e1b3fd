//! Structured deploy result returned by the Metadata API
//!
//! Parsed from the `checkDeployStatus` response (with details included).
//! Only the fields the interpreter and report need are kept.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use super::error::{DeployError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployResult {
    pub done: bool,
    pub id: String,
    pub success: bool,
    pub status: String,
    pub error_status_code: String,
    pub error_message: String,
    pub component_successes: Vec<ComponentSuccess>,
    pub component_failures: Vec<ComponentFailure>,
    pub test_successes: Vec<TestSuccess>,
    pub test_failures: Vec<TestFailure>,
    pub code_coverage_warnings: Vec<CodeCoverageWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSuccess {
    pub full_name: String,
    pub changed: bool,
    pub created: bool,
    pub deleted: bool,
    pub id: String,
}

impl ComponentSuccess {
    /// What happened to the component; `changed` beats `deleted` beats `created`
    pub fn verb(&self) -> &'static str {
        if self.changed {
            "changed"
        } else if self.deleted {
            "deleted"
        } else if self.created {
            "created"
        } else {
            "unchanged"
        }
    }
}

/// A per-component problem. An empty `full_name` marks a deployment wide
/// problem such as an unparseable manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentFailure {
    pub full_name: String,
    pub line_number: u32,
    pub problem_type: String,
    pub problem: String,
}

impl ComponentFailure {
    pub fn is_deployment_wide(&self) -> bool {
        self.full_name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuccess {
    pub name: String,
    pub method_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestFailure {
    pub name: String,
    pub method_name: String,
    pub message: String,
    pub stack_trace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeCoverageWarning {
    pub name: String,
    pub message: String,
}

impl DeployResult {
    /// Parse a `checkDeployStatusResponse` SOAP envelope
    pub fn from_soap(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)
            .map_err(|e| DeployError::transport(format!("Invalid deploy status response: {}", e)))?;

        let result = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "checkDeployStatusResponse")
            .and_then(|n| child(n, "result"))
            .ok_or_else(|| {
                DeployError::transport("Deploy status response is missing the result element")
            })?;

        Ok(Self::from_node(result))
    }

    fn from_node(result: Node) -> Self {
        let details = child(result, "details");
        let run_tests = details.and_then(|d| child(d, "runTestResult"));

        let component_successes = details
            .map(|d| {
                children(d, "componentSuccesses")
                    .map(|n| ComponentSuccess {
                        full_name: text(n, "fullName"),
                        changed: flag(n, "changed"),
                        created: flag(n, "created"),
                        deleted: flag(n, "deleted"),
                        id: text(n, "id"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let component_failures = details
            .map(|d| {
                children(d, "componentFailures")
                    .map(|n| ComponentFailure {
                        full_name: text(n, "fullName"),
                        line_number: text(n, "lineNumber").parse().unwrap_or(0),
                        problem_type: text(n, "problemType"),
                        problem: text(n, "problem"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let test_successes = run_tests
            .map(|r| {
                children(r, "successes")
                    .map(|n| TestSuccess {
                        name: text(n, "name"),
                        method_name: text(n, "methodName"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let test_failures = run_tests
            .map(|r| {
                children(r, "failures")
                    .map(|n| TestFailure {
                        name: text(n, "name"),
                        method_name: text(n, "methodName"),
                        message: text(n, "message"),
                        stack_trace: text(n, "stackTrace"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let code_coverage_warnings = run_tests
            .map(|r| {
                children(r, "codeCoverageWarnings")
                    .map(|n| CodeCoverageWarning {
                        name: text(n, "name"),
                        message: text(n, "message"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            done: flag(result, "done"),
            id: text(result, "id"),
            success: flag(result, "success"),
            status: text(result, "status"),
            error_status_code: text(result, "errorStatusCode"),
            error_message: text(result, "errorMessage"),
            component_successes,
            component_failures,
            test_successes,
            test_failures,
            code_coverage_warnings,
        }
    }
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

pub(crate) fn text(node: Node, name: &str) -> String {
    child(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn flag(node: Node, name: &str) -> bool {
    text(node, name) == "true"
}
