//! The remote client handle.
//!
//! One [`RemoteClient`] is constructed at startup from the resolved
//! [`RemoteConfig`] and shared for the process lifetime. It owns the HTTP
//! connection pool, the current access token, and the auth-change
//! broadcast channel.

use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::auth::{AuthChange, AuthUser};
use crate::config::RemoteConfig;

/// A signed-in remote session: the bearer token plus the identity it
/// belongs to.
#[derive(Debug, Clone)]
pub(crate) struct RemoteSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// Handle to the remote document store and credential service.
pub struct RemoteClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: RemoteConfig,
    pub(crate) session: Mutex<Option<RemoteSession>>,
    pub(crate) auth_events: broadcast::Sender<AuthChange>,
}

impl RemoteClient {
    /// Build a client from the startup-resolved configuration.
    pub fn new(config: RemoteConfig) -> Self {
        let (auth_events, _) = broadcast::channel(16);
        Self {
            http: reqwest::Client::new(),
            config,
            session: Mutex::new(None),
            auth_events,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Subscribe to session transitions (sign-in, sign-out). The stream
    /// stays valid for the lifetime of the client.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_events.subscribe()
    }

    /// The bearer token to authenticate a request with: the session's
    /// access token when signed in, the anonymous key otherwise.
    pub(crate) fn bearer(&self) -> String {
        self.session
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    pub(crate) fn emit(&self, change: AuthChange) {
        // Nobody listening is fine; the channel only matters once the
        // orchestrator has subscribed.
        let _ = self.auth_events.send(change);
    }
}
