use super::commands::{EnvCommands, ImportCommands, TicketsCommands};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "force")]
#[command(about = "Deploy metadata to and read tickets from a CRM org")]
#[command(version)]
pub struct Cli {
    /// Environment name (overrides current environment)
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import metadata from a local directory
    Import(ImportCommands),
    /// View or summarize service desk tickets
    Tickets(TicketsCommands),
    /// Select which stored environment to use
    Env(EnvCommands),
}
