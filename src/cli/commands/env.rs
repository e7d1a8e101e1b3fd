use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct EnvCommands {
    #[command(subcommand)]
    pub command: EnvSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EnvSubcommands {
    /// List stored environments
    List,
    /// Make an environment the current one
    Use {
        /// Environment name
        name: String,
    },
    /// Remove a stored environment
    Remove {
        /// Environment name
        name: String,
    },
}

pub fn handle_env_command(args: EnvCommands, config: &mut Config) -> Result<()> {
    match args.command {
        EnvSubcommands::List => {
            println!("{}", list_environments(config));
            Ok(())
        }
        EnvSubcommands::Use { name } => {
            config.set_current_environment(name.clone())?;
            config.save()?;
            println!("{} {}", "Now using".green(), name.bold());
            Ok(())
        }
        EnvSubcommands::Remove { name } => {
            config.remove_environment(&name)?;
            config.save()?;
            println!("{} {}", "Removed".green(), name.bold());
            Ok(())
        }
    }
}

fn list_environments(config: &Config) -> String {
    let names = config.list_environments();
    if names.is_empty() {
        return "No environments configured".to_string();
    }

    let current = config.get_current_environment_name();
    names
        .into_iter()
        .map(|name| {
            let marker = if Some(name) == current { "*" } else { " " };
            let url = config
                .environments
                .get(name)
                .map(|s| s.instance_url.as_str())
                .unwrap_or_default();
            format!("{} {}  {}", marker, name, url)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
