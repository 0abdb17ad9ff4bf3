//! Startup configuration resolution.
//!
//! The remote endpoint is resolved exactly once, in precedence order:
//! explicit environment configuration, then user-supplied runtime values
//! persisted in the local store, then the compiled-in defaults. The
//! resolved value is frozen into the [`RemoteClient`] for the process
//! lifetime. Editing the runtime values only affects the next start.

use pact_remote::config::{DEFAULT_REMOTE_ANON_KEY, DEFAULT_REMOTE_URL};
use pact_remote::{CompletionClient, RemoteClient, RemoteConfig};
use pact_store::{Database, StoreError};

/// Environment overrides (highest precedence).
pub const ENV_REMOTE_URL: &str = "PACT_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "PACT_REMOTE_KEY";
pub const ENV_COMPLETION_KEY: &str = "PACT_AI_KEY";

/// KV keys holding the user-supplied runtime values.
const KV_REMOTE_URL: &str = "pact_remote_url";
const KV_REMOTE_KEY: &str = "pact_remote_key";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the remote configuration from the three sources.
pub fn resolve_remote_config(db: &Database) -> Result<RemoteConfig, StoreError> {
    let url = match env_var(ENV_REMOTE_URL) {
        Some(url) => url,
        None => db
            .kv_get(KV_REMOTE_URL)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string()),
    };
    let anon_key = match env_var(ENV_REMOTE_KEY) {
        Some(key) => key,
        None => db
            .kv_get(KV_REMOTE_KEY)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE_ANON_KEY.to_string()),
    };
    Ok(RemoteConfig::new(url, anon_key))
}

/// Build the remote client, or `None` when the resolved configuration is
/// incomplete (pure local-first operation).
pub fn remote_client(db: &Database) -> Result<Option<RemoteClient>, StoreError> {
    let config = resolve_remote_config(db)?;
    if config.is_usable() {
        tracing::info!(url = %config.url, "remote mirroring enabled");
        Ok(Some(RemoteClient::new(config)))
    } else {
        tracing::info!("no remote configured; running local-only");
        Ok(None)
    }
}

/// Build the text-completion client from the environment credential.
pub fn completion_client() -> CompletionClient {
    CompletionClient::new(env_var(ENV_COMPLETION_KEY))
}

/// Persist user-supplied remote settings. Takes effect on the next
/// process start.
pub fn set_runtime_remote_config(db: &Database, url: &str, anon_key: &str) -> Result<(), StoreError> {
    db.kv_set(KV_REMOTE_URL, url)?;
    db.kv_set(KV_REMOTE_KEY, anon_key)?;
    tracing::info!("runtime remote configuration stored; restart to apply");
    Ok(())
}

/// Remove user-supplied remote settings. Takes effect on the next
/// process start.
pub fn clear_runtime_remote_config(db: &Database) -> Result<(), StoreError> {
    db.kv_remove(KV_REMOTE_URL)?;
    db.kv_remove(KV_REMOTE_KEY)?;
    tracing::info!("runtime remote configuration cleared; restart to apply");
    Ok(())
}
