//! Tickets command handler

use anyhow::{Context, Result};
use log::debug;

use super::{TicketsCommands, TicketsSubcommands};
use crate::api::query::field_text;
use crate::api::{QueryExecutor, SalesforceClient};
use crate::cli::ui::with_spinner;
use crate::config::Config;
use crate::tickets::{self, Listing, TICKET_OBJECT, TicketRef, fields};

pub async fn handle_tickets_command(
    args: TicketsCommands,
    config: &Config,
    env: Option<&str>,
) -> Result<()> {
    let session = config.resolve_session(env)?;
    let client = SalesforceClient::new(&session, config.settings.deploy_polling())?;

    let output = with_spinner(
        "Querying tickets...",
        run_tickets_command(&client, &args.command, &config.settings.ticket_queue),
    )
    .await?;

    println!("{}", output);
    Ok(())
}

/// Run one tickets subcommand and return the text to print
pub async fn run_tickets_command(
    executor: &dyn QueryExecutor,
    command: &TicketsSubcommands,
    queue: &str,
) -> Result<String> {
    match command {
        TicketsSubcommands::New => list(executor, queue, Listing::New).await,
        TicketsSubcommands::Waiting => list(executor, queue, Listing::Waiting).await,
        TicketsSubcommands::Recent => list(executor, queue, Listing::Recent).await,
        TicketsSubcommands::Describe { tickets } => describe(executor, tickets).await,
        TicketsSubcommands::History { ticket } => history(executor, ticket).await,
        TicketsSubcommands::Open { ticket } => open(executor, ticket).await,
    }
}

async fn list(executor: &dyn QueryExecutor, queue: &str, listing: Listing) -> Result<String> {
    let result = executor
        .query(&tickets::listing_soql(queue, listing))
        .await
        .context("Failed to list tickets")?;
    Ok(tickets::format_listing(&result.records))
}

async fn describe(executor: &dyn QueryExecutor, args: &[String]) -> Result<String> {
    let mut blocks = Vec::with_capacity(args.len());
    for arg in args {
        let ticket = TicketRef::parse(arg);
        let record = executor
            .get_record(TICKET_OBJECT, &ticket.lookup_key())
            .await
            .with_context(|| format!("Failed to fetch ticket {}", arg))?;
        blocks.push(tickets::format_ticket(&record));
    }
    Ok(blocks.join("\n\n"))
}

async fn history(executor: &dyn QueryExecutor, arg: &str) -> Result<String> {
    let id = match TicketRef::parse(arg) {
        TicketRef::Id(id) => id,
        number => {
            let record = executor
                .get_record(TICKET_OBJECT, &number.lookup_key())
                .await
                .with_context(|| format!("Failed to fetch ticket {}", arg))?;
            let id = field_text(&record, fields::ID);
            if id.is_empty() {
                anyhow::bail!("Ticket {} has no Id", arg);
            }
            id
        }
    };
    debug!("Fetching history of ticket {}", id);

    let result = executor
        .query(&tickets::history_soql(&id))
        .await
        .context("Failed to fetch ticket history")?;
    if result.is_empty() {
        return Ok(format!("No history found for {}", arg));
    }

    let entries: Vec<String> = result.records.iter().map(tickets::format_history).collect();
    Ok(entries.join("\n\n"))
}

async fn open(executor: &dyn QueryExecutor, arg: &str) -> Result<String> {
    let ticket = TicketRef::parse(arg);
    let result = executor
        .query(&tickets::launch_console_soql(&ticket))
        .await
        .context("Failed to look up ticket console link")?;

    let record = result
        .records
        .first()
        .with_context(|| format!("Ticket {} not found", arg))?;
    tickets::console_url(&field_text(record, fields::LAUNCH_CONSOLE))
}
