//! Import command handler

use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::path::Path;

use super::ImportCommands;
use crate::api::SalesforceClient;
use crate::cli::ui::with_spinner;
use crate::config::Config;
use crate::deploy;

/// Collect the directory, deploy it and print the report.
///
/// The directory is collected before any session is resolved, so a bad
/// path or option fails without touching the network. `log_file` is kept
/// out of the archive in case it lives under the deployed directory.
pub async fn handle_import_command(
    args: ImportCommands,
    config: &Config,
    env: Option<&str>,
    log_file: Option<&Path>,
) -> Result<()> {
    let mut import = args.into_config()?;
    import.exclude.extend(log_file.map(Path::to_path_buf));

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let home = dirs::home_dir();
    let prepared = deploy::prepare(&import, home.as_deref(), &cwd)?;

    if import.verbose {
        println!(
            "{} {} files from {}",
            "Deploying".dimmed(),
            prepared.request.file_count(),
            prepared.root.display().to_string().cyan()
        );
    }

    let session = config.resolve_session(env)?;
    let client = SalesforceClient::new(&session, config.settings.deploy_polling())?;
    info!("Deploying to {}", client.instance_url());

    let report = with_spinner(
        "Deploying metadata...",
        deploy::submit(&client, prepared, import.verbose),
    )
    .await?;

    print!("{}", report.report.text);

    if report.is_success() {
        println!("{}", report.summary().green());
        Ok(())
    } else {
        anyhow::bail!("{}", report.summary())
    }
}
