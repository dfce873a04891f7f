use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{err::Error, Result};

/// A named configuration document: a JSON object, possibly with one level
/// of nested object sections. Key order follows the document as written.
pub type Document = Map<String, Value>;

/// Abstract key -> document lookup. Implementations must be idempotent and
/// side-effect-free on the caller; any transport or parse failure collapses
/// to `None`.
pub trait DocumentStore {
    fn fetch(&self, name: &str) -> Option<Document>;
}

/// Fetches `{base_url}/{name}.json` with a blocking GET. Every lookup
/// carries the same identifying User-Agent and the uniform timeout; there
/// are no retries and timeouts are ordinary failures.
#[derive(Debug)]
pub struct HttpStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: impl Into<String>,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent.into())
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn fetch_inner(&self, name: &str) -> Result<Document> {
        let url = format!("{}/{}.json", self.base_url.trim_end_matches('/'), name);

        debug!("fetching document '{name}' from {url}");
        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status));
        }

        let body: Value = response.json()?;
        match body {
            Value::Object(document) => Ok(document),
            _ => Err(Error::ParseErr(format!(
                "document '{name}' is not a json object"
            ))),
        }
    }
}

impl DocumentStore for HttpStore {
    fn fetch(&self, name: &str) -> Option<Document> {
        match self.fetch_inner(name) {
            Ok(document) => Some(document),
            Err(err) => {
                warn!("failed fetching document '{name}': {err}");
                None
            }
        }
    }
}

/// In-memory store for tests and embedded setups.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: HashMap<String, Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` under `name`. Non-object values are rejected,
    /// matching what a remote fetch would do.
    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        match document {
            Value::Object(document) => {
                self.documents.insert(name.into(), document);
            }
            other => warn!("ignoring non-object document: {other}"),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.documents.remove(name);
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, name: &str) -> Option<Document> {
        self.documents.get(name).cloned()
    }
}
