use thiserror::Error;

/// A persisted document could not be decoded. Callers recover by falling
/// back to the default document; the error is logged, never surfaced.
#[derive(Error, Debug)]
#[error("Malformed document: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// A mutation was rejected before any state change happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A message needs text or an attachment")]
    EmptyMessage,

    #[error("A status update needs text or an attachment")]
    EmptyStatus,

    #[error("A group post needs text or an attachment")]
    EmptyPost,

    #[error("Only the supporter can manage groups")]
    AdminOnly,

    #[error("Unknown group: {0}")]
    UnknownGroup(String),
}
