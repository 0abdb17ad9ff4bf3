//! On-demand full-document export.
//!
//! Dumps the in-memory document pretty-printed into a timestamped file.
//! The payload is the same codec encoding the stores use, so an export is
//! also a portable backup.

use std::path::{Path, PathBuf};

use pact_shared::codec;
use pact_shared::types::AppDocument;

use crate::Result;

/// Write `document` to `dir`, returning the created file's path.
pub async fn export_document(document: &AppDocument, dir: &Path) -> Result<PathBuf> {
    let json = codec::encode_pretty(document);

    tokio::fs::create_dir_all(dir).await?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let file_name = format!("pact_export_{timestamp}.json");
    let path = dir.join(file_name);

    tokio::fs::write(&path, json.as_bytes()).await?;

    tracing::info!(path = %path.display(), "document exported");
    Ok(path)
}
