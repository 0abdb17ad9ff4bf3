//! Remote endpoint configuration.
//!
//! The resolved configuration is fixed for the lifetime of the process:
//! [`RemoteClient`] is constructed exactly once at startup and there is
//! no re-initialisation path. Changing the stored runtime values only
//! takes effect on the next start.
//!
//! [`RemoteClient`]: crate::RemoteClient

/// Compiled-in default endpoint. Deployments normally override this via
/// the environment or the locally persisted runtime values.
pub const DEFAULT_REMOTE_URL: &str = "https://pact.supabase.co";

/// Compiled-in default API key. Empty by default, which leaves the remote
/// layer disabled until a deployment provides one.
pub const DEFAULT_REMOTE_ANON_KEY: &str = "";

/// Endpoint + credential for the remote document store and its
/// credential service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://myproject.supabase.co`.
    pub url: String,
    /// The anonymous API key sent with every request.
    pub anon_key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Whether this configuration is complete enough to reach a remote.
    pub fn is_usable(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}
