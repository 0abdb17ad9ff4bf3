//! Session state and identity conversion.
//!
//! Whatever the credential provider returns is converted to a typed
//! [`User`] here, at the orchestrator boundary. Downstream code only ever
//! sees the domain type.

use pact_remote::AuthUser;
use pact_shared::types::{Role, User};
use pact_store::LocalAccount;

/// Lifecycle of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No signed-in user.
    Unauthenticated,
    /// Querying the credential service / local session marker.
    SessionResolving,
    /// Fetching (or aggregating) the signed-in user's document.
    DocumentLoading,
    /// Document loaded; mutations accepted.
    Ready,
}

/// Type the credential service's payload into a domain [`User`].
pub fn user_from_auth(auth: &AuthUser) -> User {
    let email = auth.email.clone().unwrap_or_default();
    let name = auth
        .user_metadata
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| email.split('@').next().map(str::to_string))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "User".to_string());

    User {
        id: auth.id.clone(),
        name,
        username: email,
        password: None,
        role: auth.user_metadata.role.unwrap_or(Role::Friend),
        bio: None,
        joined_at: auth.created_at,
    }
}

/// Type a local-registry account into a domain [`User`].
pub fn user_from_local(account: &LocalAccount) -> User {
    User {
        id: account.id.clone(),
        name: account.name.clone(),
        username: account.username.clone(),
        password: None,
        role: account.role,
        bio: None,
        joined_at: account.created_at,
    }
}
