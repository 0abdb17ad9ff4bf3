//! # pact-remote
//!
//! Network adapters for the Pact client: the per-user remote document
//! table, the credential/session service, and the text-completion
//! collaborator. All of them speak plain REST over `reqwest`.
//!
//! The remote side is optional by design. Every read failure degrades to
//! the caller's local-cache path; only sign-in and sign-up surface errors
//! to the user.

pub mod auth;
pub mod client;
pub mod completion;
pub mod config;
pub mod documents;

mod error;

pub use auth::{AuthChange, AuthUser};
pub use client::RemoteClient;
pub use completion::CompletionClient;
pub use config::RemoteConfig;
pub use error::{AuthError, RemoteError};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RemoteError>;
