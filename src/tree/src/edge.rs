//! Container membership edges

use crate::item::ItemId;
use chrono::{DateTime, Utc};
use folio_acl::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena identifier of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub(crate) u64);

impl EdgeId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-{}", self.0)
    }
}

/// "Item X is a member of container Y"
///
/// Identity is the `(item, container)` pair; the tree never stores two edges
/// for the same pair. Soft deletion is scoped to this membership only, so an
/// item can be deleted in one location and still visible in another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerEdge {
    pub(crate) id: EdgeId,
    pub(crate) item: ItemId,
    pub(crate) container: ItemId,
    pub(crate) owner: Principal,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) deleted: bool,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
}

impl ContainerEdge {
    pub(crate) fn new(id: EdgeId, item: ItemId, container: ItemId, owner: Principal) -> Self {
        Self {
            id,
            item,
            container,
            owner,
            created_at: Utc::now(),
            deleted: false,
            deleted_at: None,
        }
    }

    /// Arena id of the edge
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// The member
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// The container holding the member
    pub fn container(&self) -> ItemId {
        self.container
    }

    /// Principal that performed the add
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// When the membership was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the item is soft-deleted in this container only
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// When the membership was soft-deleted, if it is
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// The `(item, container)` pair that identifies this edge
    pub fn key(&self) -> (ItemId, ItemId) {
        (self.item, self.container)
    }

    pub(crate) fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
        self.deleted_at = if deleted { Some(Utc::now()) } else { None };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_delete_sets_timestamp() {
        let mut edge = ContainerEdge::new(EdgeId(1), ItemId::new(), ItemId::new(), Principal::user("alice"));
        assert!(!edge.is_deleted());
        assert!(edge.deleted_at().is_none());

        edge.set_deleted(true);
        assert!(edge.is_deleted());
        assert!(edge.deleted_at().is_some());

        edge.set_deleted(false);
        assert!(edge.deleted_at().is_none());
    }
}
