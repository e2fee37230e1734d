pub mod error;
pub mod filesystem;
pub mod memory;

pub use error::StorageError;
pub use filesystem::LocalStorage;
pub use memory::MemoryStorage;

use crate::config::Config;
use anyhow::bail;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// One directory entry as the protocol sees it. Ownership and permission
/// bits are synthesized at the listing layer, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: Option<u64>,
}

/// How a streamed write lands in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file contents entirely.
    Truncate,
    /// Extend existing contents.
    Append,
    /// Cut existing contents back to the offset, then extend.
    TruncateAt(u64),
}

/// Capability set the command handlers program against. All paths are
/// absolute logical paths; backends map them to their own layout.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    async fn list_dir(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError>;

    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    async fn delete(&self, path: &str, recursive: bool) -> Result<(), StorageError>;

    async fn size(&self, path: &str) -> Result<u64, StorageError>;

    async fn entry(&self, path: &str) -> Result<Option<StorageEntry>, StorageError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Lazy byte stream starting at `offset`. Finite; a fresh call is needed
    /// to read again.
    async fn read(
        &self,
        path: &str,
        offset: u64,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StorageError>;

    /// Drains `reader` into the file according to `mode`, returning the
    /// number of bytes written.
    async fn write(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        mode: WriteMode,
    ) -> Result<u64, StorageError>;
}

/// Selects a storage backend by its configured name.
pub fn create_storage(config: &Config) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match config.server.storage_backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        "filesystem" => Ok(Arc::new(LocalStorage::new(
            config.server.storage_root.clone().into(),
        ))),
        other => bail!("Unknown storage backend: {}", other),
    }
}

/// Parent of an absolute logical path; the root is its own parent.
pub fn parent_path(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Final component of an absolute logical path.
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}
