//! Synchronization seam: the remote document store contract and sync-key rules.
//!
//! The sync key is an opaque string naming a single shared remote document;
//! it is the sole access credential for a ledger. Concrete backends live in
//! storage crates; this module only owns the trait boundary.

use duebook_domain::Ledger;

use crate::CoreError;

/// Minimum length of a usable sync key.
pub const MIN_SYNC_KEY_LEN: usize = 4;

/// Push callback: `(snapshot, exists)`. `exists == false` signals a
/// brand-new key with no prior document; callers treat it as an empty
/// ledger, never as an error.
pub type SyncCallback = Box<dyn Fn(Option<Ledger>, bool) + Send + Sync>;

/// Abstraction over remote document stores keyed by sync code.
pub trait SyncStore: Send + Sync {
    /// Writes the full snapshot for `key`. At-most-once; a transient failure
    /// is reported to the caller and never retried automatically.
    fn write(&self, key: &str, snapshot: &Ledger) -> Result<(), CoreError>;

    /// Registers `callback` for `key`. Fires once immediately with the
    /// current state, then on every subsequent change until the returned
    /// subscription is cancelled or dropped.
    fn subscribe(&self, key: &str, callback: SyncCallback) -> Result<Subscription, CoreError>;
}

/// Active subscription handle; cancels on drop so a session switching sync
/// keys can never leak its previous feed.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicitly cancels the feed. Equivalent to dropping the handle.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Normalizes user input into a canonical sync key: trimmed, lowercased,
/// whitespace runs collapsed to `-`. Keys shorter than
/// [`MIN_SYNC_KEY_LEN`] are rejected.
pub fn normalize_sync_key(raw: &str) -> Result<String, CoreError> {
    let key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    if key.chars().count() < MIN_SYNC_KEY_LEN {
        return Err(CoreError::InvalidSyncKey(format!(
            "key must have at least {MIN_SYNC_KEY_LEN} characters"
        )));
    }
    Ok(key)
}
