use crate::core_storage::error::StorageError;
use crate::core_storage::{StorageBackend, StorageEntry, WriteMode};
use async_trait::async_trait;
use log::debug;
use std::io::SeekFrom;
use std::path::{Component, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncSeekExt};

/// Storage backend rooted at a local directory. Logical paths are mapped
/// under the root; traversal components are rejected so no request can
/// escape it.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn physical(&self, logical: &str) -> Result<PathBuf, StorageError> {
        let relative = logical.trim_start_matches('/');
        let mut physical = self.root.clone();
        for component in PathBuf::from(relative).components() {
            match component {
                Component::Normal(part) => physical.push(part),
                Component::CurDir => {}
                _ => return Err(StorageError::NotFound(logical.to_string())),
            }
        }
        Ok(physical)
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(tokio::fs::metadata(self.physical(path)?).await.is_ok())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError> {
        let physical = self.physical(path)?;
        let metadata = tokio::fs::metadata(&physical)
            .await
            .map_err(|_| StorageError::NotFound(path.to_string()))?;
        if !metadata.is_dir() {
            return Err(StorageError::NotADirectory(path.to_string()));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&physical).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let metadata = entry.metadata().await?;
            let logical = if path == "/" {
                format!("/{}", name)
            } else {
                format!("{}/{}", path, name)
            };
            entries.push(StorageEntry {
                name,
                path: logical,
                is_dir: metadata.is_dir(),
                size: if metadata.is_dir() {
                    None
                } else {
                    Some(metadata.len())
                },
            });
        }
        Ok(entries)
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let physical = self.physical(path)?;
        if tokio::fs::metadata(&physical).await.is_ok() {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        tokio::fs::create_dir(&physical)
            .await
            .map_err(|_| StorageError::NotFound(path.to_string()))?;
        Ok(())
    }

    async fn delete(&self, path: &str, recursive: bool) -> Result<(), StorageError> {
        let physical = self.physical(path)?;
        let metadata = tokio::fs::metadata(&physical)
            .await
            .map_err(|_| StorageError::NotFound(path.to_string()))?;
        if metadata.is_dir() {
            if recursive {
                tokio::fs::remove_dir_all(&physical).await?;
            } else {
                let mut dir = tokio::fs::read_dir(&physical).await?;
                if dir.next_entry().await?.is_some() {
                    return Err(StorageError::DirectoryNotEmpty(path.to_string()));
                }
                tokio::fs::remove_dir(&physical).await?;
            }
        } else {
            tokio::fs::remove_file(&physical).await?;
        }
        Ok(())
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let physical = self.physical(path)?;
        let metadata = tokio::fs::metadata(&physical)
            .await
            .map_err(|_| StorageError::NotFound(path.to_string()))?;
        if metadata.is_dir() {
            return Err(StorageError::NotAFile(path.to_string()));
        }
        Ok(metadata.len())
    }

    async fn entry(&self, path: &str) -> Result<Option<StorageEntry>, StorageError> {
        let physical = self.physical(path)?;
        match tokio::fs::metadata(&physical).await {
            Ok(metadata) => Ok(Some(StorageEntry {
                name: crate::core_storage::base_name(path).to_string(),
                path: path.to_string(),
                is_dir: metadata.is_dir(),
                size: if metadata.is_dir() {
                    None
                } else {
                    Some(metadata.len())
                },
            })),
            Err(_) => Ok(None),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let physical_from = self.physical(from)?;
        let physical_to = self.physical(to)?;
        if tokio::fs::metadata(&physical_from).await.is_err() {
            return Err(StorageError::NotFound(from.to_string()));
        }
        tokio::fs::rename(&physical_from, &physical_to).await?;
        Ok(())
    }

    async fn read(
        &self,
        path: &str,
        offset: u64,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StorageError> {
        let physical = self.physical(path)?;
        let metadata = tokio::fs::metadata(&physical)
            .await
            .map_err(|_| StorageError::NotFound(path.to_string()))?;
        if metadata.is_dir() {
            return Err(StorageError::NotAFile(path.to_string()));
        }
        let mut file = File::open(&physical).await?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::new(file))
    }

    async fn write(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        mode: WriteMode,
    ) -> Result<u64, StorageError> {
        let physical = self.physical(path)?;
        if let Ok(metadata) = tokio::fs::metadata(&physical).await {
            if metadata.is_dir() {
                return Err(StorageError::NotAFile(path.to_string()));
            }
        }

        let mut file = match mode {
            WriteMode::Truncate => {
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&physical)
                    .await?
            }
            WriteMode::Append => {
                OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&physical)
                    .await?
            }
            WriteMode::TruncateAt(offset) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .open(&physical)
                    .await?;
                // Truncation never extends a shorter file.
                let len = file.metadata().await?.len();
                file.set_len(offset.min(len)).await?;
                let mut file = file;
                file.seek(SeekFrom::End(0)).await?;
                file
            }
        };

        let written = tokio::io::copy(reader, &mut file).await?;
        debug!("Wrote {} bytes to {:?}", written, physical);
        Ok(written)
    }
}
