//! Query result handling
//!
//! Handles SOQL query responses from the REST API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single record as returned by the REST API
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub total_size: u64,
    #[serde(default = "default_done")]
    pub done: bool,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_records_url: Option<String>,
}

fn default_done() -> bool {
    true
}

impl QueryResult {
    /// Parse a query response body
    pub fn from_json(json: Value) -> anyhow::Result<Self> {
        if !json.get("records").is_some_and(Value::is_array) {
            anyhow::bail!("Missing or invalid 'records' array in response");
        }
        Ok(serde_json::from_value(json)?)
    }

    /// Whether another page must be fetched
    pub fn has_more(&self) -> bool {
        !self.done && self.next_records_url.is_some()
    }

    /// Append the records of a following page and take over its paging state
    pub fn extend(&mut self, page: QueryResult) {
        self.records.extend(page.records);
        self.done = page.done;
        self.next_records_url = page.next_records_url;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Render a field of a record for display. Missing and null fields are empty.
pub fn field_text(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}
