//! Items and container kinds
//!
//! An [`Item`] is anything that can live inside a container: a document or a
//! container (folder-like). Containers are distinguished by an explicit
//! [`ContainerKind`] tag that policies consult directly.

use crate::edge::EdgeId;
use chrono::{DateTime, Utc};
use folio_acl::{AccessControlList, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Kind of container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// A user's home folder
    Root,
    /// Other system-managed folders (templates, imports, gallery)
    System,
    /// Ordinary folder
    Folder,
    /// Notebook: a leaf container holding documents only
    Notebook,
    /// A user's top-level shared area
    SharedRoot,
    /// Root of a group's shared area
    SharedGroupRoot,
    /// Root of a one-to-one shared area
    SharedIndividualRoot,
    /// Folder living inside a shared area
    SharedFolder,
    /// Notebook living inside a shared area
    SharedNotebook,
}

impl ContainerKind {
    pub fn is_notebook(self) -> bool {
        matches!(self, Self::Notebook | Self::SharedNotebook)
    }

    /// Part of a sharing subtree
    pub fn is_shared(self) -> bool {
        matches!(
            self,
            Self::SharedRoot
                | Self::SharedGroupRoot
                | Self::SharedIndividualRoot
                | Self::SharedFolder
                | Self::SharedNotebook
        )
    }

    /// One of the reserved roots of a sharing area
    pub fn is_reserved_sharing_root(self) -> bool {
        matches!(
            self,
            Self::SharedRoot | Self::SharedGroupRoot | Self::SharedIndividualRoot
        )
    }

    /// Whether the container may be moved between parents
    pub fn is_relocatable(self) -> bool {
        !matches!(self, Self::Root | Self::System) && !self.is_reserved_sharing_root()
    }

    /// Whether elevated in-group roles are withheld below this container
    pub fn is_shared_collection(self) -> bool {
        matches!(self, Self::SharedNotebook)
    }

    /// Kind taken when the container is placed inside a sharing subtree
    pub fn shared_variant(self) -> Self {
        match self {
            Self::Folder => Self::SharedFolder,
            Self::Notebook => Self::SharedNotebook,
            other => other,
        }
    }
}

/// What an item is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Document,
    Container(ContainerKind),
}

/// An entity that can reside in containers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) owner: Principal,
    pub(crate) kind: ItemKind,
    pub(crate) deleted: bool,
    pub(crate) acl: AccessControlList,
    pub(crate) created_at: DateTime<Utc>,

    /// Memberships of this item, in insertion order
    pub(crate) parent_edges: Vec<EdgeId>,

    /// Memberships held by this container, in insertion order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) child_edges: Vec<EdgeId>,
}

impl Item {
    /// Create a detached item
    pub fn new(name: impl Into<String>, owner: Principal, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            owner,
            kind,
            deleted: false,
            acl: AccessControlList::new(),
            created_at: Utc::now(),
            parent_edges: Vec::new(),
            child_edges: Vec::new(),
        }
    }

    /// Create a detached document
    pub fn document(name: impl Into<String>, owner: Principal) -> Self {
        Self::new(name, owner, ItemKind::Document)
    }

    /// Create a detached container
    pub fn container(name: impl Into<String>, owner: Principal, kind: ContainerKind) -> Self {
        Self::new(name, owner, ItemKind::Container(kind))
    }

    /// Replace the initial ACL
    pub fn with_acl(mut self, acl: AccessControlList) -> Self {
        self.acl = acl;
        self
    }

    /// Unique id of the item
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Principal that created the item
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Document or container, with the container kind
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Container kind, or `None` for documents
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self.kind {
            ItemKind::Container(kind) => Some(kind),
            ItemKind::Document => None,
        }
    }

    /// Whether the item can hold children
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ItemKind::Container(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind, ItemKind::Document)
    }

    /// Whether the item is a notebook, shared or not
    pub fn is_notebook(&self) -> bool {
        self.container_kind().map(ContainerKind::is_notebook).unwrap_or(false)
    }

    /// Whether the item is a container inside a sharing area
    pub fn is_shared(&self) -> bool {
        self.container_kind().map(ContainerKind::is_shared).unwrap_or(false)
    }

    /// Whether the item is soft-deleted everywhere
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Access-control entries held by the item
    pub fn acl(&self) -> &AccessControlList {
        &self.acl
    }

    /// Mutable ACL, for direct grants
    ///
    /// Changes made here are not propagated; use an add or remove with a
    /// propagation policy for that.
    pub fn acl_mut(&mut self) -> &mut AccessControlList {
        &mut self.acl
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Ids of the edges placing this item in containers, oldest first
    pub fn parent_edge_ids(&self) -> &[EdgeId] {
        &self.parent_edges
    }

    /// Ids of indexed child edges; deferred edges are not listed here
    pub fn child_edge_ids(&self) -> &[EdgeId] {
        &self.child_edges
    }

    pub(crate) fn set_container_kind(&mut self, kind: ContainerKind) {
        if self.is_container() {
            self.kind = ItemKind::Container(kind);
        }
    }
}
