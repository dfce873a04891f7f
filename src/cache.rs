use log::warn;

use crate::licensed::types::LicensesDocument;
use crate::store::{Document, DocumentStore};

pub(crate) const LICENSES_DOC: &str = "licenses";
pub(crate) const GLOBAL_DOC: &str = "global";

/// Session-lifetime memoization of the three document kinds: the license
/// table, the global document, and one server document at a time (asking
/// for a different server name evicts the previous entry). Entries never
/// expire; failed fetches are never cached and get retried on next access.
///
/// Single-threaded by design. A concurrent port would need to serialize
/// writes per slot, but populated slots can be read without coordination.
#[derive(Debug, Default)]
pub(crate) struct DocumentCache {
    licenses: Option<LicensesDocument>,
    global: Option<Document>,
    server: Option<(String, Document)>,
}

impl DocumentCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fetch-and-validate the license table. Structural rejects (missing
    /// `users`/`apps`) count as fetch failures.
    pub(crate) fn licenses(&mut self, store: &impl DocumentStore) -> Option<&LicensesDocument> {
        if self.licenses.is_none() {
            let document = store.fetch(LICENSES_DOC)?;
            match LicensesDocument::from_document(document) {
                Ok(table) => self.licenses = Some(table),
                Err(err) => {
                    warn!("license table rejected: {err}");
                    return None;
                }
            }
        }

        self.licenses.as_ref()
    }

    pub(crate) fn global(&mut self, store: &impl DocumentStore) -> Option<&Document> {
        if self.global.is_none() {
            self.global = Some(store.fetch(GLOBAL_DOC)?);
        }

        self.global.as_ref()
    }

    pub(crate) fn server(&mut self, store: &impl DocumentStore, name: &str) -> Option<&Document> {
        let stale = match &self.server {
            Some((cached_name, _)) => cached_name != name,
            None => true,
        };

        if stale {
            self.server = None;
            let document = store.fetch(name)?;
            self.server = Some((name.to_string(), document));
        }

        self.server.as_ref().map(|(_, document)| document)
    }
}
