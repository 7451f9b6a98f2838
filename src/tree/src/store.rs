//! Persistence collaborator
//!
//! The tree itself does no I/O. A [`TreeStore`] saves and loads whole
//! snapshots; a commit is either fully visible or not at all.

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::tree::Tree;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage backend for tree snapshots
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Load the last committed snapshot, if any
    async fn load(&self) -> Result<Option<Tree>>;

    /// Commit a snapshot atomically
    async fn commit(&self, tree: &Tree) -> Result<()>;
}

/// In-memory store holding the committed JSON snapshot
pub struct InMemoryTreeStore {
    snapshot: Arc<RwLock<Option<String>>>,
    config: TreeConfig,
}

impl InMemoryTreeStore {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Trees loaded from this store get `config`
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(None)),
            config,
        }
    }

    /// Size in bytes of the committed snapshot
    pub async fn snapshot_len(&self) -> usize {
        self.snapshot.read().await.as_ref().map(String::len).unwrap_or(0)
    }

    /// Replace the committed snapshot with raw JSON
    pub async fn import_json(&self, json: String) -> Result<()> {
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| TreeError::Storage(format!("rejected snapshot: {}", e)))?;
        *self.snapshot.write().await = Some(json);
        Ok(())
    }
}

impl Default for InMemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreeStore for InMemoryTreeStore {
    async fn load(&self) -> Result<Option<Tree>> {
        let snapshot = self.snapshot.read().await;
        match snapshot.as_deref() {
            Some(json) => Tree::from_json(json, self.config.clone()).map(Some),
            None => Ok(None),
        }
    }

    async fn commit(&self, tree: &Tree) -> Result<()> {
        let json = tree.to_json()?;
        debug!("Committing snapshot of {} items ({} bytes)", tree.len(), json.len());
        *self.snapshot.write().await = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ContainerKind;
    use folio_acl::Principal;

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let store = InMemoryTreeStore::new();
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(store.snapshot_len().await, 0);
    }

    #[tokio::test]
    async fn test_commit_then_load() {
        let store = InMemoryTreeStore::new();
        let mut tree = Tree::new();
        let folder = tree.create_container("f", Principal::user("alice"), ContainerKind::Folder);

        store.commit(&tree).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.item(folder).unwrap().name(), "f");
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let store = InMemoryTreeStore::new();
        assert!(matches!(
            store.import_json("not json".to_string()).await,
            Err(TreeError::Storage(_))
        ));
    }
}
