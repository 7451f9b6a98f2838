//! Arena storage for items and their membership edges
//!
//! Edges are stored once in the arena and referenced by [`EdgeId`] from both
//! endpoints: the member's parent-edge list and the container's child-edge
//! list. Structural mutation goes through `link`/`unlink`, which keep both
//! sides and the `(item, container)` index in step.

use crate::config::TreeConfig;
use crate::edge::{ContainerEdge, EdgeId};
use crate::error::{Result, TreeError};
use crate::item::{ContainerKind, Item, ItemId};
use folio_acl::Principal;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of linking an item into a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkOutcome {
    Created(EdgeId),
    Existing(EdgeId),
}

/// Where an edge sits on the container side
enum ContainerSide {
    Indexed(usize),
    Deferred(usize),
}

/// Serialized form of a [`Tree`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeRecord {
    items: BTreeMap<ItemId, Item>,
    edges: BTreeMap<EdgeId, ContainerEdge>,
    #[serde(default)]
    deferred: Vec<EdgeId>,
    next_edge: u64,
}

/// The container tree
///
/// A directed acyclic graph of items where a container may hold many items
/// and an item may sit in many containers.
///
/// Every tree instance carries an epoch that is fresh on construction, on
/// load and on clone. Together with the generation it identifies one exact
/// state of one instance.
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "TreeRecord", into = "TreeRecord")]
pub struct Tree {
    config: TreeConfig,
    epoch: Uuid,
    items: BTreeMap<ItemId, Item>,
    edges: BTreeMap<EdgeId, ContainerEdge>,
    edge_index: HashMap<(ItemId, ItemId), EdgeId>,
    deferred: Vec<EdgeId>,
    next_edge: u64,
    generation: u64,
}

impl From<TreeRecord> for Tree {
    fn from(record: TreeRecord) -> Self {
        let edge_index = record
            .edges
            .values()
            .map(|edge| (edge.key(), edge.id))
            .collect();

        Self {
            config: TreeConfig::default(),
            epoch: Uuid::new_v4(),
            items: record.items,
            edges: record.edges,
            edge_index,
            deferred: record.deferred,
            next_edge: record.next_edge,
            generation: 0,
        }
    }
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            epoch: Uuid::new_v4(),
            items: self.items.clone(),
            edges: self.edges.clone(),
            edge_index: self.edge_index.clone(),
            deferred: self.deferred.clone(),
            next_edge: self.next_edge,
            generation: self.generation,
        }
    }
}

impl From<Tree> for TreeRecord {
    fn from(tree: Tree) -> Self {
        Self {
            items: tree.items,
            edges: tree.edges,
            deferred: tree.deferred,
            next_edge: tree.next_edge,
        }
    }
}

impl Tree {
    /// Create an empty tree with default configuration
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with custom configuration
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            config,
            epoch: Uuid::new_v4(),
            items: BTreeMap::new(),
            edges: BTreeMap::new(),
            edge_index: HashMap::new(),
            deferred: Vec::new(),
            next_edge: 1,
            generation: 0,
        }
    }

    /// Configuration used by propagation, moves and caching
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replace the configuration; the graph is left untouched
    pub fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
    }

    /// Counter bumped on every structural change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identity of this tree instance
    ///
    /// Fresh for every constructed, loaded or cloned tree, so two instances
    /// at the same generation are never mistaken for one another.
    pub fn epoch(&self) -> Uuid {
        self.epoch
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Insert a detached item
    ///
    /// Any edge references the item carries are discarded; membership is only
    /// ever created through `add_child`.
    pub fn insert_item(&mut self, mut item: Item) -> ItemId {
        item.parent_edges.clear();
        item.child_edges.clear();
        let id = item.id;
        self.items.insert(id, item);
        self.bump();
        id
    }

    /// Create a detached document owned by `owner`
    pub fn create_document(&mut self, name: impl Into<String>, owner: Principal) -> ItemId {
        self.insert_item(Item::document(name, owner))
    }

    /// Create a detached container of the given kind
    pub fn create_container(
        &mut self,
        name: impl Into<String>,
        owner: Principal,
        kind: ContainerKind,
    ) -> ItemId {
        self.insert_item(Item::container(name, owner, kind))
    }

    /// Look up an item, `None` when absent
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Look up an item
    ///
    /// # Returns
    ///
    /// The item, or [`TreeError::ItemNotFound`]
    pub fn item(&self, id: ItemId) -> Result<&Item> {
        self.items.get(&id).ok_or(TreeError::ItemNotFound(id))
    }

    /// Mutable access to an item, for ACL and metadata edits
    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut Item> {
        self.items.get_mut(&id).ok_or(TreeError::ItemNotFound(id))
    }

    /// Look up an item that must be a container
    pub fn container(&self, id: ItemId) -> Result<&Item> {
        let item = self.item(id)?;
        if !item.is_container() {
            return Err(TreeError::NotAContainer(id));
        }
        Ok(item)
    }

    /// Whether an item with this id exists
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the tree holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in id order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub(crate) fn set_container_kind(&mut self, id: ItemId, kind: ContainerKind) -> Result<()> {
        self.item_mut(id)?.set_container_kind(kind);
        self.bump();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Look up an edge by id
    pub fn edge(&self, id: EdgeId) -> Option<&ContainerEdge> {
        self.edges.get(&id)
    }

    /// All edges in allocation order
    pub fn edges(&self) -> impl Iterator<Item = &ContainerEdge> {
        self.edges.values()
    }

    /// Number of membership edges, deferred ones included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The membership edge of `item` in `container`, if any
    pub fn edge_between(&self, item: ItemId, container: ItemId) -> Option<&ContainerEdge> {
        self.edge_index
            .get(&(item, container))
            .and_then(|id| self.edges.get(id))
    }

    /// Parent edges of `item` in insertion order
    pub fn parent_edges(&self, item: ItemId) -> Vec<&ContainerEdge> {
        self.items
            .get(&item)
            .map(|i| {
                i.parent_edges
                    .iter()
                    .filter_map(|id| self.edges.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Containers holding `item`, in insertion order
    pub fn parents(&self, item: ItemId) -> Vec<ItemId> {
        self.parent_edges(item).iter().map(|e| e.container).collect()
    }

    /// The parent of `item` when it has exactly one
    pub fn single_parent(&self, item: ItemId) -> Option<ItemId> {
        match self.parent_edges(item).as_slice() {
            [only] => Some(only.container),
            _ => None,
        }
    }

    /// The parent into which the item's owner placed it
    pub fn owner_parent(&self, item: ItemId) -> Option<ItemId> {
        let owner = &self.items.get(&item)?.owner;
        self.parent_edges(item)
            .into_iter()
            .find(|e| &e.owner == owner)
            .map(|e| e.container)
    }

    /// Child edges of `container`, including deferred ones, in insertion order
    pub fn child_edges(&self, container: ItemId) -> Vec<&ContainerEdge> {
        let Some(item) = self.items.get(&container) else {
            return Vec::new();
        };

        let indexed = item.child_edges.iter().filter_map(|id| self.edges.get(id));
        let deferred = self
            .deferred
            .iter()
            .filter_map(|id| self.edges.get(id))
            .filter(|e| e.container == container);

        indexed.chain(deferred).collect()
    }

    /// Members of `container`, deferred ones included, in insertion order
    pub fn children(&self, container: ItemId) -> Vec<ItemId> {
        self.child_edges(container).iter().map(|e| e.item).collect()
    }

    /// Children not soft-deleted, either in this location or as items
    pub fn visible_children(&self, container: ItemId) -> Vec<ItemId> {
        self.child_edges(container)
            .into_iter()
            .filter(|e| !e.deleted)
            .filter(|e| self.items.get(&e.item).map(|i| !i.deleted).unwrap_or(false))
            .map(|e| e.item)
            .collect()
    }

    /// Whether `item` is a member of `container`
    pub fn is_child_of(&self, item: ItemId, container: ItemId) -> bool {
        self.edge_index.contains_key(&(item, container))
    }

    /// Number of edges waiting to be indexed on their container side
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Move deferred edges into their containers' child lists
    pub fn flush_deferred(&mut self) -> usize {
        let deferred = std::mem::take(&mut self.deferred);
        let mut flushed = 0;

        for edge_id in deferred {
            let Some(container) = self.edges.get(&edge_id).map(|e| e.container) else {
                warn!("Dropping deferred reference to missing {}", edge_id);
                continue;
            };
            if let Some(item) = self.items.get_mut(&container) {
                item.child_edges.push(edge_id);
                flushed += 1;
            } else {
                warn!("Deferred {} points at missing container {}", edge_id, container);
            }
        }

        if flushed > 0 {
            debug!("Flushed {} deferred child edges", flushed);
        }
        flushed
    }

    /// Create the `(item, container)` edge on both sides
    ///
    /// Performs no policy or cycle checks. An existing edge for the pair is
    /// reported instead of duplicated.
    pub(crate) fn link(
        &mut self,
        item: ItemId,
        container: ItemId,
        owner: Principal,
        defer_container_index: bool,
    ) -> Result<LinkOutcome> {
        if let Some(existing) = self.edge_index.get(&(item, container)) {
            return Ok(LinkOutcome::Existing(*existing));
        }
        for id in [item, container] {
            if !self.items.contains_key(&id) {
                return Err(TreeError::ItemNotFound(id));
            }
        }

        let edge_id = EdgeId(self.next_edge);
        self.next_edge += 1;

        self.item_mut(item)?.parent_edges.push(edge_id);
        if defer_container_index {
            self.deferred.push(edge_id);
        } else {
            self.item_mut(container)?.child_edges.push(edge_id);
        }

        self.edges
            .insert(edge_id, ContainerEdge::new(edge_id, item, container, owner));
        self.edge_index.insert((item, container), edge_id);
        self.bump();

        debug!("Linked {} into {} as {}", item, container, edge_id);
        Ok(LinkOutcome::Created(edge_id))
    }

    /// Delete the `(item, container)` edge from both sides
    ///
    /// Both sides are detached or neither is: if the edge cannot be found on
    /// either side nothing is changed and `false` is returned.
    pub(crate) fn unlink(&mut self, item: ItemId, container: ItemId) -> bool {
        let Some(&edge_id) = self.edge_index.get(&(item, container)) else {
            return false;
        };

        let item_side = self
            .items
            .get(&item)
            .and_then(|i| i.parent_edges.iter().position(|e| *e == edge_id));

        let container_side = self
            .items
            .get(&container)
            .and_then(|c| c.child_edges.iter().position(|e| *e == edge_id))
            .map(ContainerSide::Indexed)
            .or_else(|| {
                self.deferred
                    .iter()
                    .position(|e| *e == edge_id)
                    .map(ContainerSide::Deferred)
            });

        let (Some(item_pos), Some(container_pos)) = (item_side, container_side) else {
            warn!(
                "Refusing to unlink {}: {} is missing from one side",
                item, edge_id
            );
            return false;
        };

        if let Some(i) = self.items.get_mut(&item) {
            i.parent_edges.remove(item_pos);
        }
        match container_pos {
            ContainerSide::Indexed(pos) => {
                if let Some(c) = self.items.get_mut(&container) {
                    c.child_edges.remove(pos);
                }
            }
            ContainerSide::Deferred(pos) => {
                self.deferred.remove(pos);
            }
        }

        self.edges.remove(&edge_id);
        self.edge_index.remove(&(item, container));
        self.bump();

        debug!("Unlinked {} from {} ({})", item, container, edge_id);
        true
    }

    // ------------------------------------------------------------------
    // Soft delete and destruction
    // ------------------------------------------------------------------

    /// Soft-delete (or restore) `item` within `container` only
    ///
    /// Returns `false` if the item is not a member of the container.
    pub fn mark_deleted_in(&mut self, container: ItemId, item: ItemId, deleted: bool) -> Result<bool> {
        self.item(item)?;
        self.item(container)?;

        let Some(edge_id) = self.edge_index.get(&(item, container)).copied() else {
            return Ok(false);
        };
        match self.edges.get_mut(&edge_id) {
            Some(edge) => {
                edge.set_deleted(deleted);
                Ok(true)
            }
            None => Err(TreeError::InconsistentGraph(format!(
                "index references missing {}",
                edge_id
            ))),
        }
    }

    /// Whether `item` is soft-deleted within `container`
    pub fn is_deleted_in(&self, container: ItemId, item: ItemId) -> bool {
        self.edge_between(item, container)
            .map(ContainerEdge::is_deleted)
            .unwrap_or(false)
    }

    /// Soft-delete (or restore) the item everywhere
    pub fn set_deleted(&mut self, item: ItemId, deleted: bool) -> Result<()> {
        self.item_mut(item)?.deleted = deleted;
        Ok(())
    }

    /// Remove an item and all of its parent edges
    ///
    /// Containers must be emptied first. Edge removal here does not propagate
    /// ACL changes.
    pub fn destroy(&mut self, id: ItemId) -> Result<Item> {
        let item = self.item(id)?;
        if item.is_container() && !self.child_edges(id).is_empty() {
            return Err(TreeError::ContainerNotEmpty(id));
        }

        for container in self.parents(id) {
            if !self.unlink(id, container) {
                return Err(TreeError::InconsistentGraph(format!(
                    "could not detach {} from {}",
                    id, container
                )));
            }
        }

        let removed = self.items.remove(&id).ok_or(TreeError::ItemNotFound(id))?;
        self.bump();
        info!("Destroyed item {} ('{}')", id, removed.name);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Integrity and snapshots
    // ------------------------------------------------------------------

    /// Check the whole graph: consistent references and no cycles
    ///
    /// Every stored edge must be listed exactly once on its item's parent
    /// side and exactly once on its container's child side (indexed or
    /// deferred), and every listed reference must resolve to an edge that
    /// points back at the listing item.
    pub fn verify_acyclic(&self) -> Result<()> {
        self.verify_references()?;

        let mut graph: DiGraph<ItemId, EdgeId> = DiGraph::new();
        let nodes: HashMap<ItemId, NodeIndex> = self
            .items
            .keys()
            .map(|id| (*id, graph.add_node(*id)))
            .collect();

        for edge in self.edges.values() {
            let (Some(&child), Some(&parent)) = (nodes.get(&edge.item), nodes.get(&edge.container)) else {
                return Err(inconsistent(format!("{} references a missing item", edge.id)));
            };
            graph.add_edge(parent, child, edge.id);
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            let at = graph[cycle.node_id()];
            warn!("Cycle detected through {}", at);
            TreeError::InconsistentGraph(format!("cycle through {}", at))
        })
    }

    fn verify_references(&self) -> Result<()> {
        if self.edge_index.len() != self.edges.len() {
            return Err(inconsistent(format!(
                "{} edges share an (item, container) pair",
                self.edges.len() - self.edge_index.len()
            )));
        }

        let mut item_side: HashSet<EdgeId> = HashSet::with_capacity(self.edges.len());
        let mut container_side: HashSet<EdgeId> = HashSet::with_capacity(self.edges.len());

        for (id, item) in &self.items {
            for edge_id in &item.parent_edges {
                match self.edges.get(edge_id) {
                    Some(edge) if edge.item == *id => {}
                    Some(_) => {
                        return Err(inconsistent(format!(
                            "{} lists {} as a parent edge of another item", id, edge_id
                        )));
                    }
                    None => {
                        return Err(inconsistent(format!(
                            "item {} references missing {}", id, edge_id
                        )));
                    }
                }
                if !item_side.insert(*edge_id) {
                    return Err(inconsistent(format!("{} is listed twice on its item side", edge_id)));
                }
            }

            for edge_id in &item.child_edges {
                match self.edges.get(edge_id) {
                    Some(edge) if edge.container == *id => {}
                    Some(_) => {
                        return Err(inconsistent(format!(
                            "{} lists {} as a child edge of another container", id, edge_id
                        )));
                    }
                    None => {
                        return Err(inconsistent(format!(
                            "container {} references missing {}", id, edge_id
                        )));
                    }
                }
                if !container_side.insert(*edge_id) {
                    return Err(inconsistent(format!("{} is listed twice on its container side", edge_id)));
                }
            }
        }

        for edge_id in &self.deferred {
            if !self.edges.contains_key(edge_id) {
                return Err(inconsistent(format!("deferred list references missing {}", edge_id)));
            }
            if !container_side.insert(*edge_id) {
                return Err(inconsistent(format!("{} is listed twice on its container side", edge_id)));
            }
        }

        for edge_id in self.edges.keys() {
            if !item_side.contains(edge_id) {
                return Err(inconsistent(format!("{} is missing from its item's parent edges", edge_id)));
            }
            if !container_side.contains(edge_id) {
                return Err(inconsistent(format!("{} is missing from its container's child edges", edge_id)));
            }
        }
        Ok(())
    }

    /// Serialize the tree to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a tree from JSON
    ///
    /// The whole graph is verified when `config.verify_on_load` is set.
    pub fn from_json(json: &str, config: TreeConfig) -> Result<Self> {
        let mut tree: Tree = serde_json::from_str(json)?;
        tree.config = config;

        if tree.config.verify_on_load {
            tree.verify_acyclic()?;
        }
        Ok(tree)
    }
}

fn inconsistent(message: String) -> TreeError {
    warn!("Integrity check failed: {}", message);
    TreeError::InconsistentGraph(message)
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Principal {
        Principal::user("alice")
    }

    #[test]
    fn test_link_and_unlink_both_sides() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());

        let outcome = tree.link(doc, folder, alice(), false).unwrap();
        assert!(matches!(outcome, LinkOutcome::Created(_)));
        assert_eq!(tree.children(folder), vec![doc]);
        assert_eq!(tree.parents(doc), vec![folder]);

        assert!(tree.unlink(doc, folder));
        assert!(tree.children(folder).is_empty());
        assert!(tree.parents(doc).is_empty());
        assert_eq!(tree.edge_count(), 0);
        assert!(!tree.unlink(doc, folder));
    }

    #[test]
    fn test_link_reports_existing_edge() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());

        let LinkOutcome::Created(first) = tree.link(doc, folder, alice(), false).unwrap() else {
            panic!("expected a new edge");
        };
        let again = tree.link(doc, folder, Principal::user("bob"), false).unwrap();
        assert_eq!(again, LinkOutcome::Existing(first));
        assert_eq!(tree.edge_count(), 1);
    }

    #[test]
    fn test_unlink_refuses_half_present_edge() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());
        tree.link(doc, folder, alice(), false).unwrap();

        // corrupt the container side
        tree.items.get_mut(&folder).unwrap().child_edges.clear();

        assert!(!tree.unlink(doc, folder));
        assert_eq!(tree.parents(doc), vec![folder]);
        assert_eq!(tree.edge_count(), 1);
    }

    #[test]
    fn test_deferred_edges_visible_then_flushed() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());

        tree.link(doc, folder, alice(), true).unwrap();
        assert_eq!(tree.deferred_count(), 1);
        assert!(tree.get(folder).unwrap().child_edge_ids().is_empty());
        assert_eq!(tree.children(folder), vec![doc]);

        assert_eq!(tree.flush_deferred(), 1);
        assert_eq!(tree.deferred_count(), 0);
        assert_eq!(tree.get(folder).unwrap().child_edge_ids().len(), 1);

        // deferred edges can also be unlinked before a flush
        let other = tree.create_document("e", alice());
        tree.link(other, folder, alice(), true).unwrap();
        assert!(tree.unlink(other, folder));
        assert_eq!(tree.deferred_count(), 0);
    }

    #[test]
    fn test_single_and_owner_parent() {
        let mut tree = Tree::new();
        let mine = tree.create_container("mine", alice(), ContainerKind::Folder);
        let theirs = tree.create_container("theirs", Principal::user("bob"), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());

        tree.link(doc, theirs, Principal::user("bob"), false).unwrap();
        assert_eq!(tree.single_parent(doc), Some(theirs));
        assert_eq!(tree.owner_parent(doc), None);

        tree.link(doc, mine, alice(), false).unwrap();
        assert_eq!(tree.single_parent(doc), None);
        assert_eq!(tree.owner_parent(doc), Some(mine));
    }

    #[test]
    fn test_soft_delete_is_per_membership() {
        let mut tree = Tree::new();
        let a = tree.create_container("a", alice(), ContainerKind::Folder);
        let b = tree.create_container("b", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());
        tree.link(doc, a, alice(), false).unwrap();
        tree.link(doc, b, alice(), false).unwrap();

        assert!(tree.mark_deleted_in(a, doc, true).unwrap());
        assert!(tree.is_deleted_in(a, doc));
        assert!(!tree.is_deleted_in(b, doc));
        assert!(tree.visible_children(a).is_empty());
        assert_eq!(tree.visible_children(b), vec![doc]);
        // membership is kept
        assert_eq!(tree.children(a), vec![doc]);

        tree.set_deleted(doc, true).unwrap();
        assert!(tree.visible_children(b).is_empty());
    }

    #[test]
    fn test_destroy_cascades_edges() {
        let mut tree = Tree::new();
        let a = tree.create_container("a", alice(), ContainerKind::Folder);
        let b = tree.create_container("b", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());
        tree.link(doc, a, alice(), false).unwrap();
        tree.link(doc, b, alice(), false).unwrap();

        assert!(matches!(tree.destroy(a), Err(TreeError::ContainerNotEmpty(_))));

        let removed = tree.destroy(doc).unwrap();
        assert_eq!(removed.name(), "d");
        assert_eq!(tree.edge_count(), 0);
        assert!(tree.children(a).is_empty());
        assert!(tree.destroy(a).is_ok());
    }

    #[test]
    fn test_verify_acyclic_detects_cycle() {
        let mut tree = Tree::new();
        let a = tree.create_container("a", alice(), ContainerKind::Folder);
        let b = tree.create_container("b", alice(), ContainerKind::Folder);
        tree.link(b, a, alice(), false).unwrap();
        assert!(tree.verify_acyclic().is_ok());

        tree.link(a, b, alice(), false).unwrap();
        assert!(matches!(tree.verify_acyclic(), Err(TreeError::InconsistentGraph(_))));
    }

    #[test]
    fn test_json_snapshot_rebuilds_index() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());
        tree.link(doc, folder, alice(), false).unwrap();

        let json = tree.to_json().unwrap();
        let loaded = Tree::from_json(&json, TreeConfig::default()).unwrap();

        assert!(loaded.is_child_of(doc, folder));
        assert_eq!(loaded.children(folder), vec![doc]);
        assert_eq!(loaded.get(doc).unwrap().name(), "d");
    }

    #[test]
    fn test_from_json_rejects_cyclic_snapshot() {
        let mut tree = Tree::new();
        let a = tree.create_container("a", alice(), ContainerKind::Folder);
        let b = tree.create_container("b", alice(), ContainerKind::Folder);
        tree.link(b, a, alice(), false).unwrap();
        tree.link(a, b, alice(), false).unwrap();
        let json = tree.to_json().unwrap();

        assert!(Tree::from_json(&json, TreeConfig::default()).is_err());

        let lenient = TreeConfig {
            verify_on_load: false,
            ..Default::default()
        };
        assert!(Tree::from_json(&json, lenient).is_ok());
    }

    #[test]
    fn test_verify_rejects_one_sided_edges() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());
        tree.link(doc, folder, alice(), false).unwrap();
        assert!(tree.verify_acyclic().is_ok());

        // orphaned on the container side
        let mut orphan = tree.clone();
        orphan.items.get_mut(&folder).unwrap().child_edges.clear();
        assert!(matches!(orphan.verify_acyclic(), Err(TreeError::InconsistentGraph(_))));

        // orphaned on the item side
        let mut orphan = tree.clone();
        orphan.items.get_mut(&doc).unwrap().parent_edges.clear();
        assert!(matches!(orphan.verify_acyclic(), Err(TreeError::InconsistentGraph(_))));

        // dangling deferred reference
        let mut dangling = tree.clone();
        dangling.deferred.push(EdgeId(99));
        assert!(matches!(dangling.verify_acyclic(), Err(TreeError::InconsistentGraph(_))));
    }

    #[test]
    fn test_from_json_rejects_orphaned_edge() {
        let mut tree = Tree::new();
        let folder = tree.create_container("f", alice(), ContainerKind::Folder);
        let doc = tree.create_document("d", alice());
        tree.link(doc, folder, alice(), true).unwrap();
        tree.deferred.clear();
        let json = tree.to_json().unwrap();

        assert!(matches!(
            Tree::from_json(&json, TreeConfig::default()),
            Err(TreeError::InconsistentGraph(_))
        ));
    }

    #[test]
    fn test_clone_and_load_get_fresh_epoch() {
        let tree = Tree::new();
        let copy = tree.clone();
        assert_ne!(tree.epoch(), copy.epoch());
        assert_eq!(tree.generation(), copy.generation());

        let loaded = Tree::from_json(&tree.to_json().unwrap(), TreeConfig::default()).unwrap();
        assert_ne!(tree.epoch(), loaded.epoch());
    }
}
