#![doc(test(attr(deny(warnings))))]

//! Duebook offers the ledger, reminder-projection, and sync primitives that
//! power personal debt and installment tracking workflows.

pub mod session;

pub use duebook_config::{Config, ConfigError, ConfigManager};
pub use duebook_core::*;
pub use duebook_domain::*;
pub use duebook_storage_json::JsonSyncStore;
pub use session::{MutationOutcome, SyncSession};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive("duebook=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
        tracing::info!("Duebook tracing initialized.");
    });
}
