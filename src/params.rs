use log::warn;
use serde_json::Value;

use crate::cache::DocumentCache;
use crate::licensed::{UserContext, DEFAULT_SERVER};
use crate::store::{Document, DocumentStore};

/// Three-tier cascade: user record, then server document, then the global
/// document. First match wins, no merging across tiers. A miss is reported
/// and returns `None`; the caller decides what that means.
pub(crate) fn resolve_param(
    cache: &mut DocumentCache,
    store: &impl DocumentStore,
    context: Option<&UserContext>,
    name: &str,
    global_fallback: bool,
) -> Option<Value> {
    if let Some(context) = context {
        if let Some(value) = context.record.params().get(name) {
            return Some(value.clone());
        }

        // the default server has no document of its own; the global tier
        // below covers it
        if context.server_name != DEFAULT_SERVER {
            if let Some(document) = cache.server(store, &context.server_name) {
                if let Some(value) = search_document(document, name) {
                    return Some(value.clone());
                }
            }
        }
    }

    if global_fallback {
        if let Some(document) = cache.global(store) {
            if let Some(value) = search_document(document, name) {
                return Some(value.clone());
            }
        }
    }

    warn!("parameter '{name}' not found in any consulted tier");
    None
}

/// Flat-then-sections search within one document: a top-level key always
/// beats a key inside a nested section, and sections are scanned one level
/// deep in document order.
pub(crate) fn search_document<'a>(document: &'a Document, name: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(name) {
        return Some(value);
    }

    document
        .values()
        .filter_map(Value::as_object)
        .find_map(|section| section.get(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn flat_key_beats_nested_section() {
        let doc = document(json!({
            "offsets": {"delay": 100},
            "delay": 30
        }));

        assert_eq!(search_document(&doc, "delay"), Some(&json!(30)));
    }

    #[test]
    fn sections_are_scanned_in_document_order() {
        let doc = document(json!({
            "offsets": {"CHAT_FUNC_OFFSET": "0x1a2b"},
            "patterns": {"CHAT_FUNC_OFFSET": "0xffff"}
        }));

        assert_eq!(
            search_document(&doc, "CHAT_FUNC_OFFSET"),
            Some(&json!("0x1a2b"))
        );
    }

    #[test]
    fn search_stops_one_level_deep() {
        let doc = document(json!({
            "outer": {"inner": {"delay": 5}},
            "scalar": 1
        }));

        assert_eq!(search_document(&doc, "delay"), None);
        assert_eq!(search_document(&doc, "inner"), Some(&json!({"delay": 5})));
    }
}
