//! # pact-store
//!
//! Local persistence for the Pact client, backed by SQLite.
//!
//! The store is the durable, always-available layer: a synchronous
//! key-value table holding codec-encoded per-user documents (keyed
//! `{namespace}_{userId}`), runtime configuration values, and the local
//! credential registry used when no remote service is configured.

pub mod accounts;
pub mod database;
pub mod documents;
pub mod kv;
pub mod migrations;

mod error;

pub use accounts::LocalAccount;
pub use database::Database;
pub use error::StoreError;
