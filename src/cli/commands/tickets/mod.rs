pub mod handler;

use clap::{Args, Subcommand};

pub use handler::{handle_tickets_command, run_tickets_command};

#[derive(Args, Debug, Clone)]
pub struct TicketsCommands {
    #[command(subcommand)]
    pub command: TicketsSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TicketsSubcommands {
    /// List new tickets in the queue
    New,
    /// List tickets waiting on the desk (new or customer responded)
    Waiting,
    /// List the most recently modified tickets in the queue
    Recent,
    /// Show the description of one or more tickets
    Describe {
        /// Ticket Ids or numbers (e.g. IN:00123)
        #[arg(required = true, num_args = 1..)]
        tickets: Vec<String>,
    },
    /// Show the history of a ticket
    History {
        /// Ticket Id or number
        ticket: String,
    },
    /// Print the console URL of a ticket
    Open {
        /// Ticket Id or number
        ticket: String,
    },
}
