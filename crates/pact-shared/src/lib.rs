//! # pact-shared
//!
//! Domain types and pure logic shared by every Pact crate: the per-user
//! application-state document, its JSON codec, the static task catalog,
//! the supporter-side merge engine, and the derived-view computations
//! (streaks, active statuses, conversation threading).
//!
//! Nothing in this crate performs I/O.

pub mod catalog;
pub mod codec;
pub mod document;
pub mod merge;
pub mod types;
pub mod views;

mod error;

pub use error::{DecodeError, ValidationError};
pub use types::*;
