//! Per-user document table access (PostgREST-style).
//!
//! One row per user id, one JSON column holding the encoded document.
//! Point reads and upserts serve the owning user's sync; the full-table
//! scan exists solely for the supporter's aggregation and is an accepted
//! O(#users) ceiling at this scale.

use serde::{Deserialize, Serialize};

use pact_shared::types::AppDocument;

use crate::client::RemoteClient;
use crate::error::RemoteError;
use crate::Result;

const TABLE: &str = "app_state";

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    id: &'a str,
    state_json: &'a AppDocument,
}

#[derive(Debug, Deserialize)]
struct StateRow {
    state_json: serde_json::Value,
}

impl RemoteClient {
    /// Point read of one user's document. `Ok(None)` when no row exists.
    pub async fn get_document(&self, user_id: &str) -> Result<Option<AppDocument>> {
        let url = format!(
            "{}/rest/v1/{TABLE}?id=eq.{user_id}&select=state_json",
            self.config.url
        );

        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let mut rows: Vec<StateRow> = response.json().await?;
        match rows.pop() {
            Some(row) => Ok(Some(serde_json::from_value(row.state_json)?)),
            None => Ok(None),
        }
    }

    /// Upsert one user's document (insert or full-row replace).
    pub async fn put_document(&self, user_id: &str, document: &AppDocument) -> Result<()> {
        let url = format!("{}/rest/v1/{TABLE}?on_conflict=id", self.config.url);
        let rows = [UpsertRow {
            id: user_id,
            state_json: document,
        }];

        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "resolution=merge-duplicates")
            .bearer_auth(self.bearer())
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        tracing::debug!(user_id, "document mirrored remotely");
        Ok(())
    }

    /// Full-table scan of every user's document, used only by the
    /// supporter's aggregation. Rows that fail to decode are skipped with
    /// a warning. A single corrupt document must not hide the rest.
    pub async fn list_documents(&self) -> Result<Vec<AppDocument>> {
        let url = format!("{}/rest/v1/{TABLE}?select=state_json", self.config.url);

        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let rows: Vec<StateRow> = response.json().await?;
        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<AppDocument>(row.state_json) {
                Ok(document) => documents.push(document),
                Err(e) => tracing::warn!(error = %e, "skipping malformed document row"),
            }
        }
        Ok(documents)
    }
}
