use crate::core_storage::error::StorageError;
use crate::core_storage::{base_name, parent_path, StorageBackend, StorageEntry, WriteMode};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::RwLock;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// Storage backend holding the whole tree in process memory, keyed by
/// absolute logical path. Intended for tests and throwaway servers.
pub struct MemoryStorage {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn entry_for(&self, path: &str, node: &Node) -> StorageEntry {
        StorageEntry {
            name: base_name(path).to_string(),
            path: path.to_string(),
            is_dir: matches!(node, Node::Dir),
            size: match node {
                Node::Dir => None,
                Node::File(bytes) => Some(bytes.len() as u64),
            },
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn is_child_of(candidate: &str, dir: &str) -> bool {
    if candidate == dir {
        return false;
    }
    let rest = match dir {
        "/" => candidate.strip_prefix('/'),
        _ => candidate
            .strip_prefix(dir)
            .and_then(|r| r.strip_prefix('/')),
    };
    matches!(rest, Some(r) if !r.is_empty() && !r.contains('/'))
}

fn is_descendant_of(candidate: &str, dir: &str) -> bool {
    if candidate == dir {
        return false;
    }
    match dir {
        "/" => candidate.starts_with('/'),
        _ => candidate.starts_with(dir) && candidate.as_bytes().get(dir.len()) == Some(&b'/'),
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.nodes.read().unwrap().contains_key(path))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError> {
        let nodes = self.nodes.read().unwrap();
        match nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => return Err(StorageError::NotADirectory(path.to_string())),
            None => return Err(StorageError::NotFound(path.to_string())),
        }
        Ok(nodes
            .iter()
            .filter(|(p, _)| is_child_of(p, path))
            .map(|(p, node)| self.entry_for(p, node))
            .collect())
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let mut nodes = self.nodes.write().unwrap();
        if nodes.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        match nodes.get(parent_path(path)) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(StorageError::NotADirectory(parent_path(path).to_string()))
            }
            None => return Err(StorageError::NotFound(parent_path(path).to_string())),
        }
        nodes.insert(path.to_string(), Node::Dir);
        Ok(())
    }

    async fn delete(&self, path: &str, recursive: bool) -> Result<(), StorageError> {
        let mut nodes = self.nodes.write().unwrap();
        match nodes.get(path) {
            Some(Node::File(_)) => {
                nodes.remove(path);
                Ok(())
            }
            Some(Node::Dir) => {
                if path == "/" {
                    return Err(StorageError::DirectoryNotEmpty(path.to_string()));
                }
                let has_children = nodes.keys().any(|p| is_descendant_of(p, path));
                if has_children && !recursive {
                    return Err(StorageError::DirectoryNotEmpty(path.to_string()));
                }
                let doomed: Vec<String> = nodes
                    .keys()
                    .filter(|p| p.as_str() == path || is_descendant_of(p, path))
                    .cloned()
                    .collect();
                for p in doomed {
                    nodes.remove(&p);
                }
                Ok(())
            }
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let nodes = self.nodes.read().unwrap();
        match nodes.get(path) {
            Some(Node::File(bytes)) => Ok(bytes.len() as u64),
            Some(Node::Dir) => Err(StorageError::NotAFile(path.to_string())),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }

    async fn entry(&self, path: &str) -> Result<Option<StorageEntry>, StorageError> {
        let nodes = self.nodes.read().unwrap();
        Ok(nodes.get(path).map(|node| self.entry_for(path, node)))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let mut nodes = self.nodes.write().unwrap();
        if !nodes.contains_key(from) {
            return Err(StorageError::NotFound(from.to_string()));
        }
        let moved: Vec<(String, Node)> = nodes
            .iter()
            .filter(|(p, _)| p.as_str() == from || is_descendant_of(p, from))
            .map(|(p, n)| (p.clone(), n.clone()))
            .collect();
        for (p, _) in &moved {
            nodes.remove(p);
        }
        for (p, node) in moved {
            let new_path = format!("{}{}", to, &p[from.len()..]);
            nodes.insert(new_path, node);
        }
        Ok(())
    }

    async fn read(
        &self,
        path: &str,
        offset: u64,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StorageError> {
        let nodes = self.nodes.read().unwrap();
        match nodes.get(path) {
            Some(Node::File(bytes)) => {
                let start = (offset as usize).min(bytes.len());
                Ok(Box::new(Cursor::new(bytes[start..].to_vec())))
            }
            Some(Node::Dir) => Err(StorageError::NotAFile(path.to_string())),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }

    async fn write(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        mode: WriteMode,
    ) -> Result<u64, StorageError> {
        let mut incoming = Vec::new();
        reader.read_to_end(&mut incoming).await?;
        let written = incoming.len() as u64;

        let mut nodes = self.nodes.write().unwrap();
        match nodes.get(parent_path(path)) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(StorageError::NotADirectory(parent_path(path).to_string()))
            }
            None => return Err(StorageError::NotFound(parent_path(path).to_string())),
        }
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(StorageError::NotAFile(path.to_string()));
        }

        let existing = match nodes.remove(path) {
            Some(Node::File(bytes)) => bytes,
            _ => Vec::new(),
        };
        let contents = match mode {
            WriteMode::Truncate => incoming,
            WriteMode::Append => {
                let mut bytes = existing;
                bytes.extend_from_slice(&incoming);
                bytes
            }
            WriteMode::TruncateAt(offset) => {
                let mut bytes = existing;
                bytes.truncate(offset as usize);
                bytes.extend_from_slice(&incoming);
                bytes
            }
        };
        nodes.insert(path.to_string(), Node::File(contents));
        Ok(written)
    }
}
