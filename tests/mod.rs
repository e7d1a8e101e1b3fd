/// Integration tests for force-cli
///
/// - deploy: the import pipeline from a directory on disk to a rendered report
/// - tickets: ticket subcommands over a query executor
mod common;
mod deploy;
mod tickets;
