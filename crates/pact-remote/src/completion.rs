//! Text-completion collaborator.
//!
//! A thin `(model, prompt) -> completion text` interface over a
//! Gemini-style REST endpoint. The caller owns the fallback policy: any
//! failure here is an error value, and callers substitute a deterministic
//! string rather than surfacing it.

use serde::Deserialize;
use serde_json::json;

use crate::error::RemoteError;
use crate::Result;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the text-completion service.
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl CompletionClient {
    /// Build a client. `api_key = None` leaves the service unconfigured;
    /// every call then fails fast with [`RemoteError::NotConfigured`].
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether a credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one prompt through the named model and return the generated
    /// text.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(RemoteError::NotConfigured);
        };

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let generated: GenerateResponse = response.json().await?;
        let text: String = generated
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}
