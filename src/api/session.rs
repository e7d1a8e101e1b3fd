//! Seams between the command pipelines and a live org session
//!
//! The commands only talk to these traits. [`crate::api::SalesforceClient`]
//! implements both against a real org; tests substitute in-memory fakes.

use async_trait::async_trait;

use super::query::{QueryResult, Record};
use crate::deploy::{DeployError, DeployRequest, DeployResult};

/// Submits a metadata deployment and waits for its terminal result
#[async_trait]
pub trait MetadataSession: Send + Sync {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployResult, DeployError>;
}

/// Reads records from the org
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a SOQL query, following pagination until every record is fetched
    async fn query(&self, soql: &str) -> anyhow::Result<QueryResult>;

    /// Fetch one record by Id, or by `Field:Value` alternate key
    async fn get_record(&self, object_type: &str, id: &str) -> anyhow::Result<Record>;
}
