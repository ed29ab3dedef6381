use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Keys for the records Mica keeps on disk. One file per key.
pub mod keys {
    pub const PROJECTS: &str = "projects";
    pub const LIBRARY: &str = "library";
    pub const PENDING_MESSAGE: &str = "pending_message";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
}

/// String-keyed JSON records on disk, the client-side analogue of browser
/// local storage.
///
/// Failures never reach the caller: an unreadable record reads as absent and
/// a failed write is logged and dropped. Write volume is bounded by direct
/// user action, so every mutation writes through immediately.
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        fs::create_dir_all(&root).ok();
        Self { root }
    }

    /// Temp-dir-backed store for tests and smoke runs.
    pub fn in_memory() -> Self {
        let mut path = std::env::temp_dir();
        path.push(format!("mica-{}", Uuid::new_v4()));
        Self::new(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let contents = fs::read_to_string(self.record_path(key)).ok()?;
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%err, key, "discarding unreadable record");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(%err, key, "failed to serialize record");
                return;
            }
        };
        if let Err(err) = fs::write(self.record_path(key), serialized) {
            tracing::error!(%err, key, "failed to persist record");
        }
    }

    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.record_path(key));
    }
}
