//! Domain model structs for the per-user application-state document.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so that encoded documents are interchangeable with the documents
//! already sitting in deployed stores.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking an identifier as minted by the local credential registry.
/// Documents owned by such an id are never mirrored to the remote store.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Generate a collision-resistant identifier (UUID v4, hyphenated text).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate an identifier for an account registered in the local credential
/// registry. The prefix excludes the id from remote mirroring.
pub fn new_local_id() -> String {
    format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4())
}

/// Whether a user id is backed by the remote store.
pub fn is_remote_backed(id: &str) -> bool {
    !id.starts_with(LOCAL_ID_PREFIX)
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Account role. Immutable after creation; exactly one `Admin` (the
/// supporter) is expected per deployment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Friend,
}

/// An account identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique, stable identifier. Remote accounts use the id issued by the
    /// credential service; local accounts carry the [`LOCAL_ID_PREFIX`].
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login identifier (email address for remote accounts).
    pub username: String,
    /// Only present on catalog/local-registry accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub joined_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// An opaque file payload carried inline as a self-describing data URI.
/// Produced at the file boundary and passed through unchanged everywhere
/// else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name.
    pub name: String,
    /// MIME type, e.g. `image/png`.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// `data:{mime};base64,{payload}`.
    pub data: String,
}

impl Attachment {
    /// Encode raw file bytes into an inline data URI.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let mime_type = mime_type.into();
        let data = format!("data:{};base64,{}", mime_type, BASE64.encode(bytes));
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Task catalog
// ---------------------------------------------------------------------------

/// A static catalog entry. The catalog is process-wide configuration,
/// identical for every user; it is never treated as per-user data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: String,
}

// ---------------------------------------------------------------------------
// Progress records
// ---------------------------------------------------------------------------

/// Mood label attached to a day's record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mood {
    Energized,
    Good,
    Neutral,
    Tired,
    Struggling,
}

/// One user's log for one calendar date. `(user_id, date)` is the
/// uniqueness key; a later write for the same pair updates in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: String,
    pub user_id: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Ids of completed catalog tasks. Membership set; order irrelevant.
    #[serde(default)]
    pub tasks_completed: Vec<String>,
    pub time_spent_minutes: u32,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub day_journal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
}

impl ProgressRecord {
    /// The implicit empty record presented for a date that has never been
    /// touched. Not persisted until the first real edit.
    pub fn empty(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            date,
            tasks_completed: Vec::new(),
            time_spent_minutes: 0,
            remarks: String::new(),
            day_journal: String::new(),
            mood: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A directed message between two users. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Status updates
// ---------------------------------------------------------------------------

/// An ephemeral broadcast. Visibility ("active") is derived from the
/// timestamp at view time; the update itself is retained permanently for
/// the supporter's archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub id: String,
    pub user_id: String,
    /// Author display name, denormalized at creation time.
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// A post inside a group feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupPost {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
    pub author_id: String,
}

/// A broadcast group. Created and administered by the supporter only;
/// membership changes are full-set replacements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Member user ids. Set semantics; no ordering meaning.
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub posts: Vec<GroupPost>,
}

// ---------------------------------------------------------------------------
// The per-user document
// ---------------------------------------------------------------------------

/// The unit of persistence: one full document per user id.
///
/// Every collection defaults to empty so partial fragments written by
/// older builds decode without faulting. `current_user` is the owning
/// identity stamped in at save time; the supporter's aggregation rebuilds
/// its roster from exactly this field, one representative per fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppDocument {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub records: Vec<ProgressRecord>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub statuses: Vec<StatusUpdate>,
    #[serde(default)]
    pub current_user: Option<User>,
}
