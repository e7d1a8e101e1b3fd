pub mod api;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod tickets;
