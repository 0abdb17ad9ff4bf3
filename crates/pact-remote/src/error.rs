use thiserror::Error;

/// Errors produced by the remote adapters.
///
/// Outside authentication these are always recoverable: the sync layer
/// logs them and falls back to the local cache.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, DNS, TLS, timeout).
    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("Remote returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A response body did not have the expected shape.
    #[error("Malformed remote payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The completion service has no credential configured.
    #[error("Completion service not configured")]
    NotConfigured,
}

/// Credential-service failures. Unlike [`RemoteError`], these surface to
/// the user with their human-readable message intact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("An account with this identifier already exists")]
    AccountExists,

    /// The service rejected the request; carries its own message.
    #[error("{0}")]
    Rejected(String),

    #[error("Authentication service unreachable: {0}")]
    Unreachable(String),
}
