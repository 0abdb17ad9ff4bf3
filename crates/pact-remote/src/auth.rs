//! Credential/session service (GoTrue-style REST).
//!
//! Sign-up and sign-in surface their failures verbatim as [`AuthError`];
//! session lookups swallow failures into `None` so a flaky network can
//! never block startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use pact_shared::types::Role;

use crate::client::{RemoteClient, RemoteSession};
use crate::error::AuthError;

/// Profile attributes attached to an account at sign-up and carried in
/// the credential service's user metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SignUpProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// The credential service's notion of an account.
///
/// This is the *only* place the service's payload shape appears; the sync
/// orchestrator converts it to a typed [`pact_shared::types::User`] at its
/// boundary and nothing downstream ever sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: SignUpProfile,
    pub created_at: DateTime<Utc>,
}

/// A session transition observed by the credential service.
#[derive(Debug, Clone)]
pub enum AuthChange {
    SignedIn(AuthUser),
    SignedOut,
}

/// Successful token grant: bearer token plus the account it belongs to.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    user: AuthUser,
}

/// Error payloads vary across service versions; pull out whichever
/// human-readable field is present.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

fn rejection(status: u16, body: &str) -> AuthError {
    match error_message(body) {
        Some(message) => AuthError::Rejected(message),
        None => AuthError::Rejected(format!("Authentication failed (status {status})")),
    }
}

impl RemoteClient {
    /// Register a new account. The profile's role defaults to `Friend`;
    /// supporter accounts are provisioned out of band.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignUpProfile,
    ) -> Result<AuthUser, AuthError> {
        let role = profile.role.unwrap_or(Role::Friend);
        let body = json!({
            "email": email,
            "password": password,
            "data": {
                "name": profile.name,
                "role": role,
            },
        });

        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.config.url))
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &text));
        }

        // With auto-confirm the service answers with a full token grant;
        // otherwise it returns the bare user object.
        let (user, access_token) = match serde_json::from_str::<TokenGrant>(&text) {
            Ok(grant) => (grant.user, Some(grant.access_token)),
            Err(_) => (
                serde_json::from_str::<AuthUser>(&text)
                    .map_err(|e| AuthError::Rejected(format!("Unexpected sign-up response: {e}")))?,
                None,
            ),
        };

        if let Some(access_token) = access_token {
            self.install_session(RemoteSession {
                access_token,
                user: user.clone(),
            });
        }

        tracing::info!(user_id = %user.id, "signed up");
        Ok(user)
    }

    /// Exchange credentials for a session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let body = json!({ "email": email, "password": password });

        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.config.url
            ))
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &text));
        }

        let grant: TokenGrant = serde_json::from_str(&text)
            .map_err(|e| AuthError::Rejected(format!("Unexpected sign-in response: {e}")))?;

        let user = grant.user.clone();
        self.install_session(RemoteSession {
            access_token: grant.access_token,
            user: grant.user,
        });

        tracing::info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    /// End the remote session. Best-effort on the wire; the local token
    /// is always dropped.
    pub async fn sign_out(&self) {
        let token = {
            let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            session.take().map(|s| s.access_token)
        };

        if let Some(token) = token {
            let result = self
                .http
                .post(format!("{}/auth/v1/logout", self.config.url))
                .header("apikey", &self.config.anon_key)
                .bearer_auth(&token)
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "remote sign-out failed; token dropped locally");
            }
            self.emit(AuthChange::SignedOut);
        }
    }

    /// The account behind the held token, if any. Any failure resolves to
    /// `None`; callers fall back to the local session path.
    pub async fn current_session(&self) -> Option<AuthUser> {
        let token = {
            let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            session.as_ref().map(|s| s.access_token.clone())?
        };

        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.config.url))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&token)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                response.json::<AuthUser>().await.ok()
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "session check rejected");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "session check failed");
                None
            }
        }
    }

    fn install_session(&self, new_session: RemoteSession) {
        let user = new_session.user.clone();
        {
            let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            *session = Some(new_session);
        }
        self.emit(AuthChange::SignedIn(user));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_description_fields() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Invalid login credentials")
        );

        let body = r#"{"msg":"User already registered"}"#;
        assert_eq!(error_message(body).as_deref(), Some("User already registered"));

        assert_eq!(error_message("not json"), None);
    }

    #[test]
    fn auth_user_tolerates_missing_metadata() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"u1","created_at":"2026-01-03T08:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.user_metadata, SignUpProfile::default());
        assert!(user.email.is_none());
    }
}
