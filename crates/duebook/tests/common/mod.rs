use std::sync::{Arc, Mutex};

use duebook::{ConfigManager, JsonSyncStore};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated store and config manager backed by unique directories.
pub fn setup_test_env() -> (Arc<JsonSyncStore>, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let store = JsonSyncStore::new(base.join("sync")).expect("create json sync store");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (Arc::new(store), config_manager)
}
