//! Avatar URLs kept in a JSON file beside the user store.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum AvatarStoreError {
    #[error("Avatar store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Avatar store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

type AvatarMap = BTreeMap<String, String>;

/// Map of user id to avatar URL, persisted as pretty-printed JSON.
///
/// Writes are serialized through a mutex; reads see the file as of their
/// start. Lookups treat a missing or unreadable file as empty; writes fail
/// on anything but a missing file.
pub struct AvatarStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AvatarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Avatar URL for `user_id`, or `""` when none is stored.
    pub async fn get(&self, user_id: &str) -> String {
        if user_id.is_empty() {
            return String::new();
        }
        self.load().await.remove(user_id).unwrap_or_default()
    }

    /// Store `url` for `user_id`. An empty `url` removes the entry.
    pub async fn set(&self, user_id: &str, url: &str) -> Result<(), AvatarStoreError> {
        if user_id.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;

        let mut avatars = self.read_map().await?;
        let url = url.trim();
        if url.is_empty() {
            if avatars.remove(user_id).is_none() {
                return Ok(());
            }
        } else {
            avatars.insert(user_id.to_string(), url.to_string());
        }
        self.save(&avatars).await
    }

    pub async fn remove(&self, user_id: &str) -> Result<(), AvatarStoreError> {
        self.set(user_id, "").await
    }

    /// Lenient read for lookups: any failure is logged and reads as empty.
    async fn load(&self) -> AvatarMap {
        self.read_map().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Unable to read avatar store");
            AvatarMap::new()
        })
    }

    /// Read for the write path. Only a missing file counts as empty, so an
    /// unreadable store is never overwritten with a partial map.
    async fn read_map(&self) -> Result<AvatarMap, AvatarStoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AvatarMap::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        if contents.trim().is_empty() {
            return Ok(AvatarMap::new());
        }
        Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Avatar store is not valid JSON");
            AvatarMap::new()
        }))
    }

    async fn save(&self, avatars: &AvatarMap) -> Result<(), AvatarStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(avatars)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> AvatarStoreError {
        AvatarStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
