//! Typed helpers for persisted per-user documents.
//!
//! A document is stored as codec-encoded text under
//! `{DOCUMENT_NAMESPACE}_{userId}`. The store never decodes document
//! text itself; the orchestrator owns the codec and the fallback policy.

use pact_shared::catalog::DOCUMENT_NAMESPACE;

use crate::database::Database;
use crate::error::Result;

/// Compose the KV key for a user's document.
pub fn document_key(user_id: &str) -> String {
    format!("{DOCUMENT_NAMESPACE}_{user_id}")
}

impl Database {
    /// Read a user's encoded document, if present.
    pub fn get_document_text(&self, user_id: &str) -> Result<Option<String>> {
        self.kv_get(&document_key(user_id))
    }

    /// Write a user's encoded document (write-through cache layer).
    pub fn put_document_text(&self, user_id: &str, text: &str) -> Result<()> {
        self.kv_set(&document_key(user_id), text)
    }

    /// Remove a user's document. Returns `true` if one existed.
    pub fn remove_document(&self, user_id: &str) -> Result<bool> {
        self.kv_remove(&document_key(user_id))
    }

    /// Enumerate every stored document's text, in key-enumeration order.
    pub fn all_document_texts(&self) -> Result<Vec<String>> {
        let prefix = format!("{DOCUMENT_NAMESPACE}_");
        let mut texts = Vec::new();
        for key in self.kv_keys_with_prefix(&prefix)? {
            if let Some(text) = self.kv_get(&key)? {
                texts.push(text);
            }
        }
        Ok(texts)
    }
}
