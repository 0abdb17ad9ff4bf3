//! JSON codec for the per-user document.
//!
//! `decode(encode(d)) == d` for any well-formed document. Decoding is
//! tolerant of partial fragments (missing collections become empty) but a
//! syntactically broken payload is a [`DecodeError`]; callers fall back
//! to the default document instead of propagating a crash.

use crate::error::DecodeError;
use crate::types::AppDocument;

/// Encode a document to its compact persisted form.
pub fn encode(document: &AppDocument) -> String {
    // Serialization of these derive-only types cannot fail.
    serde_json::to_string(document).unwrap_or_default()
}

/// Encode a document pretty-printed, for the export facility.
pub fn encode_pretty(document: &AppDocument) -> String {
    serde_json::to_string_pretty(document).unwrap_or_default()
}

/// Decode a persisted document.
pub fn decode(text: &str) -> Result<AppDocument, DecodeError> {
    Ok(serde_json::from_str(text)?)
}
