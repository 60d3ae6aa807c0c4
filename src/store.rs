//! Durable blob storage and dataset persistence.
//!
//! The dataset lives as a single blob under a (bucket, path) address.
//! `BlobStore` is the narrow seam over the bucket so the pipeline can be
//! tested against an in-memory store instead of real object storage.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::dataset::{codec, Dataset};
use crate::error::StoreError;

/// Key-value blob interface: `get` yields the blob or absence, `put`
/// replaces it whole. No partial-write states are ever observable.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, path: &str) -> io::Result<Option<Vec<u8>>>;
    async fn put(&self, path: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Blob store backed by a local directory (the "bucket").
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.root.join(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put(&self, path: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crashed put never leaves a torn blob.
        let tmp = target.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &target)
    }
}

/// In-memory blob store for tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, path: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blobs.lock().await.get(path).cloned())
    }

    async fn put(&self, path: &str, bytes: &[u8]) -> io::Result<()> {
        self.blobs.lock().await.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Loads and persists the observation table as one versioned blob.
pub struct DatasetStore {
    blob: Arc<dyn BlobStore>,
    path: String,
}

impl DatasetStore {
    pub fn new(blob: Arc<dyn BlobStore>, path: impl Into<String>) -> Self {
        Self {
            blob,
            path: path.into(),
        }
    }

    /// Retrieve the persisted dataset. An absent blob is first-run
    /// bootstrap and yields an empty table, not an error.
    pub async fn load(&self) -> Result<Dataset, StoreError> {
        match self.blob.get(&self.path).await? {
            Some(bytes) => Ok(Dataset::from_rows(codec::decode(&bytes)?)),
            None => Ok(Dataset::empty()),
        }
    }

    /// Deduplicate on the natural key (first occurrence wins, so rows
    /// already in the table beat same-key re-observations) and replace
    /// the blob. Returns the persisted row count.
    pub async fn save(&self, mut dataset: Dataset) -> Result<usize, StoreError> {
        dataset.dedup_by_key();
        info!(rows = dataset.len(), "writing dataset after dedup");
        let bytes = codec::encode(dataset.rows())?;
        self.blob.put(&self.path, &bytes).await?;
        Ok(dataset.len())
    }
}
