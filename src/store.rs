use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{with_class_token, without_class_token, DomAdapter, HIDDEN_CLASS};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("shared state blob is not well-formed JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize shared state blob: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The id → class-name mapping shared with the host's render layer,
/// exchanged as JSON object text. Opaque except for the entries a client
/// edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientStore {
    entries: BTreeMap<String, String>,
}

impl ClientStore {
    /// Parse the serialized blob. Malformed text is a caller contract
    /// violation and surfaces as a fatal [`StoreError::Parse`].
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text).map_err(StoreError::Parse)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(StoreError::Serialize)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn set_class(&mut self, id: &str, class_name: &str) {
        self.entries.insert(id.to_string(), class_name.to_string());
    }

    /// Append the hidden token to `id`'s class string unless it is already
    /// present. A missing entry is seeded with the element id as its base
    /// class, matching the host's class-naming convention.
    pub fn mark_hidden(&mut self, id: &str) {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| id.to_string());
        *entry = with_class_token(entry, HIDDEN_CLASS);
    }

    /// Remove the hidden token from `id`'s class string. This is the
    /// host-side edit that brings the element back and restarts the
    /// dismissal cycle.
    pub fn reveal(&mut self, id: &str) {
        if let Some(entry) = self.entries.get_mut(id) {
            *entry = without_class_token(entry, HIDDEN_CLASS);
        }
    }

    /// The host render step: copy every entry onto the matching element.
    /// Entries without a matching element are skipped.
    pub fn apply_to_dom(&self, dom: &mut dyn DomAdapter) {
        for (id, class_name) in &self.entries {
            if let Some(node) = dom.element_by_id(id) {
                dom.set_class_name(node, class_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PageDom;

    #[test]
    fn mark_hidden_appends_once() {
        let mut store = ClientStore::default();
        store.set_class("error-message-div", "error-message-div");

        store.mark_hidden("error-message-div");
        assert_eq!(store.get("error-message-div"), Some("error-message-div hidden"));

        store.mark_hidden("error-message-div");
        assert_eq!(store.get("error-message-div"), Some("error-message-div hidden"));
    }

    #[test]
    fn mark_hidden_seeds_missing_entry() {
        let mut store = ClientStore::default();
        store.mark_hidden("error-message-div");
        assert_eq!(store.get("error-message-div"), Some("error-message-div hidden"));
    }

    #[test]
    fn reveal_strips_the_hidden_token() {
        let mut store = ClientStore::default();
        store.set_class("error-message-div", "error-message-div hidden");
        store.reveal("error-message-div");
        assert_eq!(store.get("error-message-div"), Some("error-message-div"));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(matches!(
            ClientStore::parse("{\"error-message-div\":"),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let store = ClientStore::parse(r#"{"a":"a","b":"b hidden"}"#).expect("parse");
        let text = store.to_json().expect("serialize");
        assert_eq!(ClientStore::parse(&text).expect("reparse"), store);
    }

    #[test]
    fn apply_to_dom_skips_unknown_ids() {
        let mut page = PageDom::new();
        let banner = page.insert_element(PageDom::ROOT, "div", Some("error-message-div"), "error-message-div");

        let mut store = ClientStore::default();
        store.set_class("error-message-div", "error-message-div hidden");
        store.set_class("sidebar", "sidebar");
        store.apply_to_dom(&mut page);

        assert_eq!(page.class_name(banner), "error-message-div hidden");
    }
}
