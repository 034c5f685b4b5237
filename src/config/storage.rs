use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Local storage for data kept outside the user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// JSON file mapping user ids to avatar URLs.
    #[serde(default = "default_avatar_store_path")]
    pub avatar_store_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            avatar_store_path: default_avatar_store_path(),
        }
    }
}

fn default_avatar_store_path() -> PathBuf {
    PathBuf::from("data/avatars.json")
}
