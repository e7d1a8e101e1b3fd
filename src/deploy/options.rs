//! Deployment options sent alongside the archive

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DeployError;

/// Which tests the org runs while validating a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TestLevel {
    #[default]
    NoTestRun,
    RunSpecifiedTests,
    RunLocalTests,
    RunAllTestsInOrg,
}

impl TestLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestLevel::NoTestRun => "NoTestRun",
            TestLevel::RunSpecifiedTests => "RunSpecifiedTests",
            TestLevel::RunLocalTests => "RunLocalTests",
            TestLevel::RunAllTestsInOrg => "RunAllTestsInOrg",
        }
    }
}

impl fmt::Display for TestLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestLevel {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoTestRun" => Ok(TestLevel::NoTestRun),
            "RunSpecifiedTests" => Ok(TestLevel::RunSpecifiedTests),
            "RunLocalTests" => Ok(TestLevel::RunLocalTests),
            "RunAllTestsInOrg" => Ok(TestLevel::RunAllTestsInOrg),
            other => Err(DeployError::Config(format!(
                "Unknown test level '{}' (expected NoTestRun, RunSpecifiedTests, RunLocalTests or RunAllTestsInOrg)",
                other
            ))),
        }
    }
}

/// Immutable option set for one deploy call. Build with [`DeploymentOptions::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DeploymentOptions {
    allow_missing_files: bool,
    auto_update_package: bool,
    check_only: bool,
    ignore_warnings: bool,
    purge_on_delete: bool,
    rollback_on_error: bool,
    test_level: TestLevel,
    run_tests: Vec<String>,
}

impl DeploymentOptions {
    pub fn builder() -> DeploymentOptionsBuilder {
        DeploymentOptionsBuilder::default()
    }

    pub fn allow_missing_files(&self) -> bool {
        self.allow_missing_files
    }

    pub fn auto_update_package(&self) -> bool {
        self.auto_update_package
    }

    pub fn check_only(&self) -> bool {
        self.check_only
    }

    pub fn ignore_warnings(&self) -> bool {
        self.ignore_warnings
    }

    pub fn purge_on_delete(&self) -> bool {
        self.purge_on_delete
    }

    pub fn rollback_on_error(&self) -> bool {
        self.rollback_on_error
    }

    pub fn test_level(&self) -> TestLevel {
        self.test_level
    }

    pub fn run_tests(&self) -> &[String] {
        &self.run_tests
    }
}

/// Collects raw command flags and resolves test level precedence on `build`
#[derive(Debug, Clone, Default)]
pub struct DeploymentOptionsBuilder {
    allow_missing_files: bool,
    auto_update_package: bool,
    check_only: bool,
    ignore_warnings: bool,
    purge_on_delete: bool,
    rollback_on_error: bool,
    run_all_tests: bool,
    test_level: Option<String>,
    run_tests: Vec<String>,
}

impl DeploymentOptionsBuilder {
    pub fn allow_missing_files(mut self, value: bool) -> Self {
        self.allow_missing_files = value;
        self
    }

    pub fn auto_update_package(mut self, value: bool) -> Self {
        self.auto_update_package = value;
        self
    }

    pub fn check_only(mut self, value: bool) -> Self {
        self.check_only = value;
        self
    }

    pub fn ignore_warnings(mut self, value: bool) -> Self {
        self.ignore_warnings = value;
        self
    }

    pub fn purge_on_delete(mut self, value: bool) -> Self {
        self.purge_on_delete = value;
        self
    }

    pub fn rollback_on_error(mut self, value: bool) -> Self {
        self.rollback_on_error = value;
        self
    }

    pub fn run_all_tests(mut self, value: bool) -> Self {
        self.run_all_tests = value;
        self
    }

    pub fn test_level(mut self, level: impl Into<String>) -> Self {
        self.test_level = Some(level.into());
        self
    }

    pub fn test(mut self, name: impl Into<String>) -> Self {
        self.run_tests.push(name.into());
        self
    }

    pub fn tests<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_tests.extend(names.into_iter().map(Into::into));
        self
    }

    /// Resolve the final option set.
    ///
    /// The run-all flag wins over everything, then a non-empty test list
    /// forces `RunSpecifiedTests`, then the explicit level string applies.
    pub fn build(self) -> Result<DeploymentOptions, DeployError> {
        let explicit = match self.test_level.as_deref() {
            Some(level) => level.parse()?,
            None => TestLevel::default(),
        };

        let test_level = if self.run_all_tests {
            TestLevel::RunAllTestsInOrg
        } else if !self.run_tests.is_empty() {
            TestLevel::RunSpecifiedTests
        } else {
            explicit
        };

        Ok(DeploymentOptions {
            allow_missing_files: self.allow_missing_files,
            auto_update_package: self.auto_update_package,
            check_only: self.check_only,
            ignore_warnings: self.ignore_warnings,
            purge_on_delete: self.purge_on_delete,
            rollback_on_error: self.rollback_on_error,
            test_level,
            run_tests: self.run_tests,
        })
    }
}
