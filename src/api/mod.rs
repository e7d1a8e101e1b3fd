//! Org API client
//!
//! Talks to the Metadata SOAP API for deployments and the REST data API for
//! queries and record lookups. Session acquisition is out of scope: the
//! client is handed an instance URL and an access token.

pub mod client;
pub mod constants;
pub mod query;
pub mod session;
pub mod soap;

pub use client::{DeployPolling, SalesforceClient};
pub use query::{QueryResult, Record};
pub use session::{MetadataSession, QueryExecutor};
