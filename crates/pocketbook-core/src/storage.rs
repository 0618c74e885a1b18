//! Object store for profile pictures
//!
//! - `ObjectStore` trait defines the interface for blob backends
//! - `LocalObjectStore` keeps blobs under a local directory
//!
//! Each user has at most one blob, addressed by
//! `{user_id}/{user_id}/profile-picture.png` in the `profile-pictures` bucket.

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{Error, Result};

/// Bucket holding profile pictures
pub const PROFILE_BUCKET: &str = "profile-pictures";

/// Environment variable overriding the local store directory
pub const STORAGE_DIR_ENV: &str = "POCKETBOOK_STORAGE_DIR";

/// Environment variable with the base URL blobs are served from
pub const PUBLIC_URL_ENV: &str = "POCKETBOOK_PUBLIC_URL";

/// Object key of a user's profile picture
pub fn profile_picture_path(user_id: &str) -> String {
    format!("{}/{}/profile-picture.png", user_id, user_id)
}

/// Blob storage backend
pub trait ObjectStore: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Store (or replace) a blob
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch a blob, `None` if it does not exist
    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether a blob exists, without reading it
    fn exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Remove a blob, returning whether it existed
    fn remove(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Public URL of a blob, cache-busted with the given instant
    fn public_url(&self, bucket: &str, key: &str, at: DateTime<Utc>) -> String;
}

/// Reject keys that would escape the bucket directory
fn checked_key(key: &str) -> Result<&Path> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(Error::Storage(format!("Invalid object key: {}", key)));
    }
    Ok(path)
}

/// Local filesystem object store
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Result<Self> {
        let root = root.into();

        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create storage directory {}: {}",
                    root.display(),
                    e
                ))
            })?;
            info!("Created storage directory: {}", root.display());
        }

        Ok(Self {
            root,
            public_base: public_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Store configured from `POCKETBOOK_STORAGE_DIR` / `POCKETBOOK_PUBLIC_URL`,
    /// defaulting to the platform data directory
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var(STORAGE_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pocketbook")
                .join("storage"),
        };
        let public_base =
            std::env::var(PUBLIC_URL_ENV).unwrap_or_else(|_| "/storage".to_string());
        Self::new(root, public_base)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(checked_key(bucket)?).join(checked_key(key)?))
    }
}

impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        info!(bucket, key, size = bytes.len(), "Stored object");
        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let path = self.object_path(bucket, key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, bucket: &str, key: &str) -> Result<bool> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(bucket, key, "Removed object");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: &str, key: &str, at: DateTime<Utc>) -> String {
        format!(
            "{}/{}/{}?t={}",
            self.public_base,
            bucket,
            key,
            at.timestamp_millis()
        )
    }
}
