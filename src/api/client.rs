use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

use super::constants::{self, headers};
use super::query::{QueryResult, Record};
use super::session::{MetadataSession, QueryExecutor};
use super::soap;
use crate::config::SessionConfig;
use crate::deploy::{DeployError, DeployRequest, DeployResult};

/// How long to wait between deploy status checks and in total
#[derive(Debug, Clone, Copy)]
pub struct DeployPolling {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for DeployPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Org client for the Metadata SOAP API and the REST data API
#[derive(Clone)]
pub struct SalesforceClient {
    instance_url: String,
    access_token: String,
    api_version: String,
    http_client: reqwest::Client,
    polling: DeployPolling,
}

impl SalesforceClient {
    pub fn new(session: &SessionConfig, polling: DeployPolling) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(120)) // archives can be large
            .connect_timeout(Duration::from_secs(10))
            .user_agent(constants::USER_AGENT)
            .build()?;

        Ok(Self::with_custom_client(session, polling, http_client))
    }

    /// Create a new client with custom HTTP client configuration
    pub fn with_custom_client(
        session: &SessionConfig,
        polling: DeployPolling,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            instance_url: session.instance_url.clone(),
            access_token: session.access_token.clone(),
            api_version: session.api_version().to_string(),
            http_client,
            polling,
        }
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// POST a SOAP envelope to the Metadata API and return the raw body.
    /// Faults and non-success statuses become transport errors.
    async fn soap_call(&self, body: &str) -> Result<String, DeployError> {
        let url = constants::metadata_endpoint(&self.instance_url, &self.api_version);
        let envelope = soap::envelope(&self.access_token, body);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", headers::CONTENT_TYPE_XML)
            .header("SOAPAction", headers::SOAP_ACTION)
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Metadata API responded with {} ({} bytes)", status, text.len());

        if let Some(fault) = soap::fault(&text) {
            return Err(DeployError::transport(fault));
        }
        if !status.is_success() {
            return Err(DeployError::transport(format!(
                "Metadata API request failed with status {}",
                status
            )));
        }
        Ok(text)
    }

    async fn check_deploy_status(&self, async_id: &str) -> Result<DeployResult, DeployError> {
        let body = soap::check_deploy_status_body(async_id);
        let text = self.soap_call(&body).await?;
        DeployResult::from_soap(&text)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> anyhow::Result<Value> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            anyhow::bail!("{}", rest_error_message(status, &body));
        }
        Ok(body)
    }
}

/// Turn a REST error body (`[{"errorCode": .., "message": ..}]`) into text
fn rest_error_message(status: reqwest::StatusCode, body: &Value) -> String {
    let errors: Vec<String> = body
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.get("errorCode").and_then(Value::as_str).unwrap_or("ERROR"),
                        e.get("message").and_then(Value::as_str).unwrap_or_default()
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        format!("Request failed with status {}: {}", status, body)
    } else {
        errors.join("; ")
    }
}

#[async_trait]
impl MetadataSession for SalesforceClient {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployResult, DeployError> {
        info!(
            "Submitting deploy of {} files to {}",
            request.file_count(),
            self.instance_url
        );
        let text = self.soap_call(&request.to_soap_body()).await?;
        let async_id = soap::deploy_id(&text)?;
        info!("Deploy queued as {}", async_id);

        let started = Instant::now();
        loop {
            tokio::time::sleep(self.polling.interval).await;

            let result = self.check_deploy_status(&async_id).await?;
            debug!("Deploy {} status: {}", async_id, result.status);
            if result.done {
                info!(
                    "Deploy {} finished with status {} after {:.1}s",
                    async_id,
                    result.status,
                    started.elapsed().as_secs_f64()
                );
                return Ok(result);
            }

            if started.elapsed() >= self.polling.timeout {
                warn!("Gave up waiting for deploy {}", async_id);
                return Err(DeployError::transport(format!(
                    "Timed out after {}s waiting for deploy {} (last status: {})",
                    self.polling.timeout.as_secs(),
                    async_id,
                    result.status
                )));
            }
        }
    }
}

#[async_trait]
impl QueryExecutor for SalesforceClient {
    async fn query(&self, soql: &str) -> anyhow::Result<QueryResult> {
        debug!("SOQL: {}", soql);
        let url = constants::query_endpoint(&self.instance_url, &self.api_version);
        let mut result = QueryResult::from_json(self.get_json(&url, &[("q", soql)]).await?)?;

        while result.has_more() {
            let next = result.next_records_url.clone().unwrap_or_default();
            let url = constants::next_records_endpoint(&self.instance_url, &next);
            let page = QueryResult::from_json(self.get_json(&url, &[]).await?)?;
            result.extend(page);
        }

        debug!("Query returned {} records", result.len());
        Ok(result)
    }

    async fn get_record(&self, object_type: &str, id: &str) -> anyhow::Result<Record> {
        let url =
            constants::record_endpoint(&self.instance_url, &self.api_version, object_type, id);
        match self.get_json(&url, &[]).await? {
            Value::Object(record) => Ok(record),
            other => anyhow::bail!(
                "Unexpected record response for {} {}: {}",
                object_type,
                id,
                other
            ),
        }
    }
}
