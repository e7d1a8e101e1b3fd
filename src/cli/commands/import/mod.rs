pub mod handler;

use clap::Args;

pub use handler::handle_import_command;

use crate::deploy::{DeployError, DeploymentOptions, ImportConfig};

#[derive(Args, Debug, Clone)]
pub struct ImportCommands {
    /// Path to the metadata directory
    #[arg(short, long, default_value = "metadata", help = "Path to metadata directory")]
    pub directory: String,

    /// Roll back the whole deployment if any component fails
    #[arg(short = 'r', long = "rollbackonerror")]
    pub rollback_on_error: bool,

    /// Run every test in the org (overrides --testlevel and --test)
    #[arg(short = 't', long = "runalltests")]
    pub run_all_tests: bool,

    /// NoTestRun, RunSpecifiedTests, RunLocalTests or RunAllTestsInOrg
    #[arg(
        short = 'l',
        long = "testlevel",
        alias = "testLevel",
        default_value = "NoTestRun",
        help = "Test level"
    )]
    pub test_level: String,

    /// Validate the deployment without committing it
    #[arg(short = 'c', long = "checkonly")]
    pub check_only: bool,

    /// Delete components permanently instead of moving them to the recycle bin
    #[arg(short = 'p', long = "purgeondelete")]
    pub purge_on_delete: bool,

    /// Don't fail on files referenced in the manifest but missing from the directory
    #[arg(short = 'm', long = "allowmissingfiles")]
    pub allow_missing_files: bool,

    /// Add files missing from package.xml to the deployment
    #[arg(short = 'u', long = "autoupdatepackage")]
    pub auto_update_package: bool,

    /// Deploy even when the org raises warnings
    #[arg(short = 'i', long = "ignorewarnings")]
    pub ignore_warnings: bool,

    /// Test class to run; may be repeated
    #[arg(long = "test", value_name = "NAME")]
    pub tests: Vec<String>,

    /// List every deployed component in the report
    #[arg(short, long)]
    pub verbose: bool,
}

impl ImportCommands {
    pub fn into_config(self) -> Result<ImportConfig, DeployError> {
        let options = DeploymentOptions::builder()
            .rollback_on_error(self.rollback_on_error)
            .run_all_tests(self.run_all_tests)
            .test_level(self.test_level)
            .check_only(self.check_only)
            .purge_on_delete(self.purge_on_delete)
            .allow_missing_files(self.allow_missing_files)
            .auto_update_package(self.auto_update_package)
            .ignore_warnings(self.ignore_warnings)
            .tests(self.tests)
            .build()?;

        Ok(ImportConfig {
            directory: self.directory,
            options,
            verbose: self.verbose,
            exclude: Vec::new(),
        })
    }
}
