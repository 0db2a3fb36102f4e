//! duebook-storage-json
//!
//! Filesystem-backed implementation of the [`SyncStore`] seam: one JSON
//! document per sync key under a root directory. Writes are staged to a
//! temporary file and renamed into place; subscribers registered through
//! [`SyncStore::subscribe`] are notified after every local write, mirroring
//! the push feed a remote document store would provide.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use duebook_core::{CoreError, Subscription, SyncCallback, SyncStore};
use duebook_domain::Ledger;

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

type SubscriberMap = HashMap<String, Vec<(u64, Arc<SyncCallback>)>>;

/// Directory-rooted JSON persistence for synchronized ledgers.
#[derive(Clone)]
pub struct JsonSyncStore {
    root: PathBuf,
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_token: Arc<Mutex<u64>>,
}

impl JsonSyncStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_token: Arc::new(Mutex::new(0)),
        })
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), DOCUMENT_EXTENSION))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.document_path(key).exists()
    }

    /// Loads the stored snapshot, `None` when the key has no document yet.
    pub fn load(&self, key: &str) -> Result<Option<Ledger>, CoreError> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        let ledger =
            serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
        Ok(Some(ledger))
    }

    fn notify(&self, key: &str, snapshot: &Ledger) {
        let listeners: Vec<Arc<SyncCallback>> = {
            let registry = lock_registry(&self.subscribers);
            registry
                .get(key)
                .map(|entries| entries.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };
        for listener in listeners {
            listener(Some(snapshot.clone()), true);
        }
    }
}

impl SyncStore for JsonSyncStore {
    fn write(&self, key: &str, snapshot: &Ledger) -> Result<(), CoreError> {
        let path = self.document_path(key);
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = path.with_extension(TMP_SUFFIX);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        self.notify(&canonical_key(key), snapshot);
        Ok(())
    }

    fn subscribe(&self, key: &str, callback: SyncCallback) -> Result<Subscription, CoreError> {
        let key = canonical_key(key);
        let callback = Arc::new(callback);

        // fire once with the current state; a corrupt or missing document
        // reports as a brand-new key, never as an error
        match self.load(&key) {
            Ok(Some(ledger)) => callback(Some(ledger), true),
            Ok(None) | Err(_) => callback(None, false),
        }

        let token = {
            let mut counter = self
                .next_token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *counter += 1;
            *counter
        };
        lock_registry(&self.subscribers)
            .entry(key.clone())
            .or_default()
            .push((token, callback));

        let registry = Arc::clone(&self.subscribers);
        Ok(Subscription::new(move || {
            let mut registry = lock_registry(&registry);
            if let Some(entries) = registry.get_mut(&key) {
                entries.retain(|(entry_token, _)| *entry_token != token);
                if entries.is_empty() {
                    registry.remove(&key);
                }
            }
        }))
    }
}

fn lock_registry(registry: &Mutex<SubscriberMap>) -> std::sync::MutexGuard<'_, SubscriberMap> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restricts keys to a filesystem-safe alphabet.
fn canonical_key(key: &str) -> String {
    key.trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect::<String>()
        .to_lowercase()
}

impl std::fmt::Debug for JsonSyncStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSyncStore")
            .field("root", &self.root)
            .finish()
    }
}

impl JsonSyncStore {
    /// Root directory holding the per-key documents.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
