use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stores user-configurable preferences and session metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Active sync code; `None` until the user connects a device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_code: Option<String>,
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for calendar exports. Defaults to `~/Downloads`.
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_code: None,
            locale: Self::default_locale(),
            currency: Self::default_currency(),
            export_dir: None,
        }
    }
}

impl Config {
    pub fn default_locale() -> String {
        "id-ID".into()
    }

    pub fn default_currency() -> String {
        "IDR".into()
    }

    pub fn resolve_export_dir(&self) -> PathBuf {
        if let Some(path) = &self.export_dir {
            return path.clone();
        }

        let base = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base
    }
}
