use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::store::Document;

/// Parsed license table. `users` keeps document order: identity resolution
/// is first-match-wins over the entries as written. `apps` stays loosely
/// typed so a single odd record degrades on its own instead of invalidating
/// the table.
#[derive(Debug, Clone, Deserialize)]
pub struct LicensesDocument {
    pub users: IndexMap<String, UserEntry>,
    pub apps: Map<String, Value>,
    #[serde(default)]
    pub min_version: Option<Value>,
}

impl LicensesDocument {
    /// A table missing either `users` or `apps` is rejected wholesale and
    /// treated the same as a failed fetch.
    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(document))
    }

    /// Per-user license records for one application.
    pub(crate) fn app_licenses(&self, app_name: &str) -> Option<&Map<String, Value>> {
        self.apps.get(app_name).and_then(Value::as_object)
    }
}

/// One `users` entry: the legacy bare identity string, or a record carrying
/// the identity plus an optional home server.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserEntry {
    Legacy(String),
    Record {
        #[serde(default)]
        hwid: Option<String>,
        #[serde(default)]
        server: Option<String>,
    },
    /// Any other shape; skipped by the identity scan.
    Unrecognized(Value),
}

impl UserEntry {
    /// Normalized view consumed by every lookup. `None` when the entry
    /// carries no usable identity.
    pub(crate) fn identity(&self) -> Option<UserIdentity<'_>> {
        match self {
            UserEntry::Legacy(hwid) => Some(UserIdentity { hwid, server: None }),
            UserEntry::Record {
                hwid: Some(hwid),
                server,
            } => Some(UserIdentity {
                hwid,
                server: server.as_deref().filter(|server| !server.is_empty()),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct UserIdentity<'a> {
    pub hwid: &'a str,
    pub server: Option<&'a str>,
}

/// One row of the per-application license roster.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub user_name: String,
    pub level: String,
    pub server_name: String,
    pub active: bool,
    pub expires: Option<String>,
}
