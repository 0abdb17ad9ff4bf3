//! # pact-client
//!
//! The headless Pact client core: the sync orchestrator that decides
//! local vs remote per operation, the session state machine, AI insight
//! prompts, and the export facility. A UI embeds this crate and drives it;
//! nothing here renders.

pub mod config;
pub mod export;
pub mod insight;
pub mod orchestrator;
pub mod session;

mod error;

pub use error::ClientError;
pub use orchestrator::SyncOrchestrator;
pub use session::SessionPhase;

use tracing_subscriber::{fmt, EnvFilter};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Initialise logging for an embedding application. Call once at startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pact_client=debug,pact_remote=debug,pact_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
