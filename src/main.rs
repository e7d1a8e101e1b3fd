use anyhow::Result;
use clap::Parser;
use colored::*;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use force_cli::cli::commands::{
    handle_env_command, handle_import_command, handle_tickets_command,
};
use force_cli::cli::{Cli, Commands};
use force_cli::config::Config;

const LOG_FILE: &str = "force-cli.log";
const LOG_TARGET_VAR: &str = "FORCE_CLI_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let log_file = match init_logging() {
        Ok(log_file) => log_file,
        Err(err) => {
            eprintln!("{} {:#}", "Warning: logging disabled:".yellow(), err);
            None
        }
    };

    match run(cli, log_file.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Log to a truncated file in the user's cache directory, or to stderr when
/// `FORCE_CLI_LOG=stderr` or no cache directory exists. Returns the log file.
fn init_logging() -> Result<Option<PathBuf>> {
    let mut builder = env_logger::Builder::from_default_env();
    let log_path = match std::env::var(LOG_TARGET_VAR) {
        Ok(target) if target == "stderr" => None,
        _ => dirs::cache_dir().map(|dir| dir.join("force-cli").join(LOG_FILE)),
    };

    if let Some(path) = &log_path {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let log_file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.try_init()?;
    Ok(log_path)
}

async fn run(cli: Cli, log_file: Option<&Path>) -> Result<()> {
    dotenvy::dotenv().ok();
    info!("Starting force-cli");

    let mut config = Config::load()?;
    let env = cli.env.as_deref();

    match cli.command {
        Commands::Import(args) => handle_import_command(args, &config, env, log_file).await,
        Commands::Tickets(args) => handle_tickets_command(args, &config, env).await,
        Commands::Env(args) => handle_env_command(args, &mut config),
    }
}
