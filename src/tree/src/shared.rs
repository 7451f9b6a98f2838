//! Lock-guarded tree handle shared between callers
//!
//! Reads run in parallel under the read lock. Every mutation runs inside
//! [`SharedTree::transaction`], which holds the write lock from the first
//! check to the end of propagation and restores the previous state if the
//! closure fails.

use crate::container::{AddOutcome, ChildAddPolicy};
use crate::error::Result;
use crate::item::ItemId;
use crate::propagation::AclPropagationPolicy;
use crate::store::TreeStore;
use crate::tree::Tree;
use folio_acl::Principal;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cloneable handle to a tree behind a read/write lock
#[derive(Clone, Default)]
pub struct SharedTree {
    inner: Arc<RwLock<Tree>>,
}

impl SharedTree {
    /// Wrap a tree for shared use
    pub fn new(tree: Tree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Load the committed snapshot from `store`
    pub async fn load(store: &dyn TreeStore) -> Result<Option<Self>> {
        Ok(store.load().await?.map(Self::new))
    }

    /// Run `f` with shared read access
    pub fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Tree) -> T,
    {
        f(&*self.inner.read())
    }

    /// Run `f` as one unit of work
    ///
    /// If `f` returns an error every change it made is discarded. The restored
    /// tree carries a fresh epoch, so nothing cached during `f` is reused.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tree) -> Result<T>,
    {
        let mut guard = self.inner.write();
        let before = guard.clone();

        match f(&mut *guard) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Rolling back tree transaction: {}", e);
                *guard = before;
                Err(e)
            }
        }
    }

    /// Copy of the current tree
    pub fn snapshot(&self) -> Tree {
        self.inner.read().clone()
    }

    /// Commit the current state to `store`
    pub async fn commit(&self, store: &dyn TreeStore) -> Result<()> {
        let snapshot = self.snapshot();
        debug!("Committing tree at generation {}", snapshot.generation());
        store.commit(&snapshot).await
    }

    /// [`Tree::add_child`] as a single transaction
    pub fn add_child(
        &self,
        container: ItemId,
        child: ItemId,
        policy: &dyn ChildAddPolicy,
        acting: &Principal,
        acl_policy: &dyn AclPropagationPolicy,
    ) -> Result<AddOutcome> {
        self.transaction(|tree| tree.add_child(container, child, policy, acting, acl_policy))
    }

    /// [`Tree::remove_child`] as a single transaction
    pub fn remove_child(
        &self,
        container: ItemId,
        child: ItemId,
        acl_policy: &dyn AclPropagationPolicy,
    ) -> Result<bool> {
        self.transaction(|tree| tree.remove_child(container, child, acl_policy))
    }

    /// [`Tree::move_item`] as a single transaction
    pub fn move_item(&self, item: ItemId, from: ItemId, to: ItemId, acting: &Principal) -> Result<bool> {
        self.transaction(|tree| tree.move_item(item, from, to, acting))
    }
}
