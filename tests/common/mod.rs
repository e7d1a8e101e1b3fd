//! In-memory stand-ins for an org session

use async_trait::async_trait;
use force_cli::api::{MetadataSession, QueryExecutor, QueryResult, Record};
use force_cli::deploy::{DeployError, DeployRequest, DeployResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub enum Response {
    Result(DeployResult),
    Transport(String),
}

/// Answers every deploy with a canned response and remembers the request
pub struct FakeMetadataSession {
    response: Response,
    calls: AtomicUsize,
    last_request: Mutex<Option<DeployRequest>>,
}

impl FakeMetadataSession {
    pub fn returning(result: DeployResult) -> Self {
        Self::new(Response::Result(result))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Response::Transport(message.to_string()))
    }

    fn new(response: Response) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<DeployRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSession for FakeMetadataSession {
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployResult, DeployError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.response {
            Response::Result(result) => Ok(result.clone()),
            Response::Transport(message) => Err(DeployError::transport(message.clone())),
        }
    }
}

/// Serves query results by SOQL substring and records by lookup key
#[derive(Default)]
pub struct FakeQueryExecutor {
    queries: Vec<(String, Vec<Value>)>,
    records: HashMap<String, Value>,
    issued: Mutex<Vec<String>>,
}

impl FakeQueryExecutor {
    pub fn with_query(mut self, soql_fragment: &str, records: Vec<Value>) -> Self {
        self.queries.push((soql_fragment.to_string(), records));
        self
    }

    pub fn with_record(mut self, key: &str, record: Value) -> Self {
        self.records.insert(key.to_string(), record);
        self
    }

    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

fn to_record(value: &Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

#[async_trait]
impl QueryExecutor for FakeQueryExecutor {
    async fn query(&self, soql: &str) -> anyhow::Result<QueryResult> {
        self.issued.lock().unwrap().push(soql.to_string());
        let records: Vec<Record> = self
            .queries
            .iter()
            .find(|(fragment, _)| soql.contains(fragment.as_str()))
            .map(|(_, records)| records.iter().map(to_record).collect())
            .unwrap_or_default();

        Ok(QueryResult {
            total_size: records.len() as u64,
            done: true,
            records,
            next_records_url: None,
        })
    }

    async fn get_record(&self, object_type: &str, id: &str) -> anyhow::Result<Record> {
        self.issued
            .lock()
            .unwrap()
            .push(format!("GET {}/{}", object_type, id));
        self.records
            .get(id)
            .map(to_record)
            .ok_or_else(|| anyhow::anyhow!("NOT_FOUND: The requested resource does not exist"))
    }
}

/// Write `files` (relative path, contents) under `root`
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}
