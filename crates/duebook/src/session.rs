//! Explicit sync-session context: one active code, one subscription.
//!
//! The session owns the in-memory snapshot and the single live subscription
//! to the shared remote document. Mutations apply optimistically: the
//! snapshot changes first, then a durable write is attempted once; a failed
//! write never rolls the snapshot back.

use std::sync::{Arc, Mutex, MutexGuard};

use duebook_config::Config;
use duebook_core::{normalize_sync_key, CoreError, Subscription, SyncStore};
use duebook_domain::Ledger;

/// Result of a ledger mutation: the operation's return value plus whether
/// the durable write went through. `synced == false` is the non-fatal
/// "check your connection" case; the local state already holds the change
/// and the user may simply retry the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome<T> {
    pub value: T,
    pub synced: bool,
}

/// A live sync session bound to one sync code.
pub struct SyncSession {
    code: String,
    store: Arc<dyn SyncStore>,
    ledger: Arc<Mutex<Ledger>>,
    subscription: Option<Subscription>,
}

impl SyncSession {
    /// Connects to the document behind `raw_code`, normalizing the code
    /// first. The subscription fires immediately, so the snapshot reflects
    /// the remote state (or an empty ledger for a brand-new code) on return.
    pub fn connect(store: Arc<dyn SyncStore>, raw_code: &str) -> Result<Self, CoreError> {
        let code = normalize_sync_key(raw_code)?;
        let ledger = Arc::new(Mutex::new(Ledger::new()));
        let subscription = Self::attach(&store, &code, &ledger)?;
        tracing::info!(code = %code, "sync session connected");
        Ok(Self {
            code,
            store,
            ledger,
            subscription: Some(subscription),
        })
    }

    /// Reconnects using the code remembered in `config`, if any.
    pub fn restore(config: &Config, store: Arc<dyn SyncStore>) -> Result<Option<Self>, CoreError> {
        match &config.sync_code {
            Some(code) => Self::connect(store, code).map(Some),
            None => Ok(None),
        }
    }

    /// Records this session's code in `config` for the next start.
    pub fn remember(&self, config: &mut Config) {
        config.sync_code = Some(self.code.clone());
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Clone of the current in-memory snapshot.
    pub fn snapshot(&self) -> Ledger {
        self.lock_ledger().clone()
    }

    /// Switches to another sync code. The previous subscription is cancelled
    /// before the new one is established; at most one feed is ever active.
    pub fn switch(&mut self, raw_code: &str) -> Result<(), CoreError> {
        let code = normalize_sync_key(raw_code)?;
        if let Some(previous) = self.subscription.take() {
            previous.cancel();
        }
        self.subscription = Some(Self::attach(&self.store, &code, &self.ledger)?);
        self.code = code;
        tracing::info!(code = %self.code, "sync session switched");
        Ok(())
    }

    /// Ends the session, cancelling the active subscription.
    pub fn disconnect(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        tracing::info!(code = %self.code, "sync session disconnected");
    }

    /// Applies a validated operation to the snapshot, then attempts one
    /// durable write. The operation either fully applies or fully rejects;
    /// a write failure is reported through `synced`, never by rollback.
    pub fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<T, CoreError>,
    ) -> Result<MutationOutcome<T>, CoreError> {
        let (value, snapshot) = {
            let mut guard = self.lock_ledger();
            let value = op(&mut guard)?;
            (value, guard.clone())
        };

        let synced = match self.store.write(&self.code, &snapshot) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(code = %self.code, error = %err, "snapshot write failed; local state kept");
                false
            }
        };
        Ok(MutationOutcome { value, synced })
    }

    /// Runs a read-only closure against the current snapshot.
    pub fn read<T>(&self, op: impl FnOnce(&Ledger) -> T) -> T {
        op(&self.lock_ledger())
    }

    fn attach(
        store: &Arc<dyn SyncStore>,
        code: &str,
        ledger: &Arc<Mutex<Ledger>>,
    ) -> Result<Subscription, CoreError> {
        let slot = Arc::clone(ledger);
        store.subscribe(
            code,
            Box::new(move |snapshot, exists| {
                // a push replaces the snapshot wholesale (last writer wins);
                // exists == false is a brand-new code, treated as empty
                let next = if exists {
                    snapshot.unwrap_or_default()
                } else {
                    Ledger::new()
                };
                *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
            }),
        )
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("code", &self.code)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}
