pub mod env;
pub mod import;
pub mod tickets;

pub use env::{EnvCommands, handle_env_command};
pub use import::{ImportCommands, handle_import_command};
pub use tickets::{TicketsCommands, handle_tickets_command};
