use thiserror::Error;

use pact_remote::{AuthError, RemoteError};
use pact_shared::ValidationError;
use pact_store::StoreError;

/// Errors surfaced by the client layer.
///
/// Remote *read* failures never appear here: the orchestrator swallows
/// them into the local-cache path. What does appear: local durability
/// failures, authentication rejections, and validation rejections.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation that needs a signed-in user ran without one.
    #[error("No active session")]
    NoSession,
}
