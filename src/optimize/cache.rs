//! Persistent, content-addressed cache of optimizer outputs
//!
//! The cache directory holds one JSON index (`cache.json`) mapping each
//! file's cache key to the hash of its last optimized input, plus one blob
//! per distinct hash holding the optimizer output for that input.
//!
//! # Invariants
//!
//! - Keys are paths relative to the cache directory, `/`-separated, so a
//!   cache survives moving the checkout.
//! - A hash covers the input bytes and the optimizer invocation, so changing
//!   either one misses.
//! - Blobs are written once and never rewritten or deleted.
//! - The index is only written by [`CacheStore::flush`].

use crate::error::{AppmakeError, AppmakeResult};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Index file name inside the cache directory
pub const INDEX_FILE_NAME: &str = "cache.json";

/// Hash of `contents` under the optimizer invocation `fingerprint`
pub fn content_hash(contents: &[u8], fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    hasher.update(fingerprint.as_bytes());
    hex::encode(hasher.finalize())
}

/// Path of the blob named `hash` inside cache directory `dir`
pub fn blob_in(dir: &Path, hash: &str) -> PathBuf {
    dir.join(hash)
}

/// Whether cache directory `dir` holds the blob named `hash`
pub async fn blob_exists(dir: &Path, hash: &str) -> bool {
    fs::try_exists(blob_in(dir, hash)).await.unwrap_or(false)
}

/// Key → hash index plus blob storage
#[derive(Debug)]
pub struct CacheStore {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl CacheStore {
    /// Load the index from `dir`.
    ///
    /// A missing, unreadable or corrupt index yields an empty store; the
    /// problem is logged and never returned.
    pub async fn load(dir: &Path) -> Self {
        let dir = absolute(dir);
        let index_path = dir.join(INDEX_FILE_NAME);

        let entries = match fs::read(&index_path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(entries) => {
                    debug!("Loaded {} cache entries from {}", entries.len(), index_path.display());
                    entries
                }
                Err(e) => {
                    warn!("Can't parse cache index {}: {}; starting empty", index_path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache index at {}; starting empty", index_path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Can't read cache index {}: {}; starting empty", index_path.display(), e);
                BTreeMap::new()
            }
        };

        Self { dir, entries }
    }

    /// Create the cache directory if needed
    pub async fn ensure_dir(&self) -> AppmakeResult<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppmakeError::io(format!("creating cache directory {}", self.dir.display()), e)
        })
    }

    /// Cache directory (absolute)
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the persisted index
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE_NAME)
    }

    /// Cache key for `path`: its location relative to the cache directory
    pub fn key_for(&self, path: &Path) -> String {
        let relative = relative_path(&absolute(path), &self.dir);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Hash recorded for `key`
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Path of the blob named `hash`
    pub fn blob_path(&self, hash: &str) -> PathBuf {
        blob_in(&self.dir, hash)
    }

    /// Whether the blob named `hash` exists
    pub async fn has_blob(&self, hash: &str) -> bool {
        blob_exists(&self.dir, hash).await
    }

    /// Store `bytes` as the blob for `hash` and point `key` at it.
    ///
    /// An existing blob is left untouched. New blobs land under a unique
    /// temporary name first, so two jobs with identical input never observe
    /// a half-written blob.
    pub async fn put(&mut self, key: &str, hash: &str, bytes: &[u8]) -> AppmakeResult<()> {
        let blob = self.blob_path(hash);
        if !self.has_blob(hash).await {
            let staging = self.dir.join(format!(".{}.{}", hash, uuid::Uuid::new_v4().simple()));
            fs::write(&staging, bytes)
                .await
                .map_err(|e| AppmakeError::CacheWrite {
                    path: staging.clone(),
                    source: e,
                })?;
            fs::rename(&staging, &blob)
                .await
                .map_err(|e| AppmakeError::CacheWrite {
                    path: blob.clone(),
                    source: e,
                })?;
        }

        self.entries.insert(key.to_string(), hash.to_string());
        Ok(())
    }

    /// Write the whole index to disk
    pub async fn flush(&self) -> AppmakeResult<()> {
        let path = self.index_path();
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&path, content)
            .await
            .map_err(|e| AppmakeError::CacheWrite { path, source: e })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically
fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// `path` expressed relative to `base`; both must be absolute
fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<Component> = path.components().collect();
    let base: Vec<Component> = base.components().collect();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
