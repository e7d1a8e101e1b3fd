//! Metadata deployment pipeline
//!
//! Collecting -> Submitting -> Classifying -> Reporting. Each stage runs
//! once; any error before classification ends the import with that error.

pub mod collector;
pub mod error;
pub mod interpreter;
pub mod options;
pub mod report;
pub mod request;
pub mod result;

pub use collector::{Collector, FileSet, MANIFEST_FILE, collect, resolve_root};
pub use error::DeployError;
pub use interpreter::{Outcome, Verdict, classify};
pub use options::{DeploymentOptions, DeploymentOptionsBuilder, TestLevel};
pub use report::{Report, render};
pub use request::DeployRequest;
pub use result::DeployResult;

use log::info;
use std::path::{Path, PathBuf};

use crate::api::MetadataSession;

/// Everything one `import` invocation needs, built once from the command line
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub directory: String,
    pub options: DeploymentOptions,
    pub verbose: bool,
    /// Files never packaged even when under the root, such as our own log
    pub exclude: Vec<PathBuf>,
}

/// A collected and packaged deployment, not yet submitted
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub root: PathBuf,
    pub request: DeployRequest,
}

/// The classified, rendered result of a submitted deployment
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub root: PathBuf,
    pub outcome: Outcome,
    pub report: Report,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        !self.report.exit_is_failure
    }

    /// Message to print after the report: the failure reason, or where the
    /// metadata was imported from
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!("Imported from {}", self.root.display())
        } else {
            self.outcome.verdict.to_string()
        }
    }
}

/// Resolve the root and collect it into a deploy request. No network access.
pub fn prepare(
    config: &ImportConfig,
    home: Option<&Path>,
    cwd: &Path,
) -> Result<PreparedImport, DeployError> {
    let root = resolve_root(&config.directory, home, cwd)?;
    info!("Importing metadata from {}", root.display());

    let files = Collector::new(&root)
        .excluding(config.exclude.iter().cloned())
        .collect()?;
    let request = DeployRequest::build(&files, &config.options)?;
    Ok(PreparedImport { root, request })
}

/// Submit a prepared request and classify the result. A failed call
/// returns the transport error and nothing is classified.
pub async fn submit<S>(
    session: &S,
    prepared: PreparedImport,
    verbose: bool,
) -> Result<ImportReport, DeployError>
where
    S: MetadataSession + ?Sized,
{
    let result = session.deploy(&prepared.request).await?;
    let outcome = classify(result);
    info!("Deploy verdict: {}", outcome.verdict);

    let report = render(&outcome, verbose);
    Ok(ImportReport {
        root: prepared.root,
        outcome,
        report,
    })
}

/// Run the whole pipeline
pub async fn import<S>(
    session: &S,
    config: &ImportConfig,
    home: Option<&Path>,
    cwd: &Path,
) -> Result<ImportReport, DeployError>
where
    S: MetadataSession + ?Sized,
{
    let prepared = prepare(config, home, cwd)?;
    submit(session, prepared, config.verbose).await
}
