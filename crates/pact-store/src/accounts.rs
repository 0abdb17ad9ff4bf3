//! Local credential registry and session marker.
//!
//! When no remote credential service is configured the client still needs
//! sign-up and sign-in. Accounts registered here live entirely on this
//! device; their ids carry the `local-` prefix so the sync layer never
//! tries to mirror their documents remotely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pact_shared::types::{new_local_id, Role};

use crate::database::Database;
use crate::error::Result;

/// KV key holding the JSON list of registered local accounts.
const ACCOUNTS_KEY: &str = "pact_local_accounts";

/// KV key holding the signed-in local account id.
const SESSION_KEY: &str = "pact_local_session";

/// A device-local account. The password is stored as entered; this
/// registry is a development/offline convenience, not a hardened
/// credential store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalAccount {
    pub id: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Database {
    /// All registered local accounts, oldest first.
    pub fn local_accounts(&self) -> Result<Vec<LocalAccount>> {
        match self.kv_get(ACCOUNTS_KEY)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    /// Register a new local account. Returns `None` when the username is
    /// already taken.
    pub fn register_local_account(
        &self,
        username: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<Option<LocalAccount>> {
        let mut accounts = self.local_accounts()?;
        if accounts.iter().any(|a| a.username == username) {
            return Ok(None);
        }

        let account = LocalAccount {
            id: new_local_id(),
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        self.kv_set(ACCOUNTS_KEY, &serde_json::to_string(&accounts)?)?;

        tracing::info!(username, "registered local account");
        Ok(Some(account))
    }

    /// Look up a local account by credentials.
    pub fn find_local_account(&self, username: &str, password: &str) -> Result<Option<LocalAccount>> {
        Ok(self
            .local_accounts()?
            .into_iter()
            .find(|a| a.username == username && a.password == password))
    }

    /// Look up a local account by id.
    pub fn local_account_by_id(&self, id: &str) -> Result<Option<LocalAccount>> {
        Ok(self.local_accounts()?.into_iter().find(|a| a.id == id))
    }

    // ------------------------------------------------------------------
    // Session marker
    // ------------------------------------------------------------------

    /// Mark an account id as the signed-in local session.
    pub fn set_local_session(&self, account_id: &str) -> Result<()> {
        self.kv_set(SESSION_KEY, account_id)
    }

    /// The signed-in local account id, if any.
    pub fn local_session(&self) -> Result<Option<String>> {
        self.kv_get(SESSION_KEY)
    }

    /// Clear the local session marker.
    pub fn clear_local_session(&self) -> Result<()> {
        self.kv_remove(SESSION_KEY)?;
        Ok(())
    }
}
