//! ACL propagation strategies
//!
//! A propagation policy runs after an edge is created or removed and decides
//! how the parent's ACL is merged into, or retracted from, the child and its
//! descendants.
//!
//! Merging pushes each node's ACL, minus public entries, down to its
//! children. Below a shared collection, grants held by elevated in-group
//! roles are withheld as well.
//!
//! Retraction is conservative: the candidate set is the entries the parent
//! and child have in common, minus public entries. A node only loses a
//! candidate entry when none of its current parents still holds it, so an
//! item never loses rights still supplied by another parent.

mod inherit;
mod not_from_containers;
mod null;
mod share;

pub use inherit::InheritFromParent;
pub use not_from_containers::NotFromContainers;
pub use null::NullPropagation;
pub use share::ShareIntoContainer;

use crate::error::Result;
use crate::item::ItemId;
use crate::tree::Tree;
use folio_acl::AccessControlList;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Strategy invoked on edge creation and removal
pub trait AclPropagationPolicy: Send + Sync {
    /// Policy name for logging
    fn name(&self) -> &'static str;

    /// Called after `child` was added to `parent`
    fn on_add(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()>;

    /// Called after `child` was removed from `parent`
    fn on_remove(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()>;

    /// Whether adding under a shared container also converts the child's kind
    fn propagates_type(&self) -> bool {
        true
    }
}

/// Selects one of the built-in policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationPolicyKind {
    #[default]
    Inherit,
    Share,
    NotFromContainers,
    Null,
}

impl PropagationPolicyKind {
    pub fn policy(self) -> &'static dyn AclPropagationPolicy {
        match self {
            Self::Inherit => &InheritFromParent,
            Self::Share => &ShareIntoContainer,
            Self::NotFromContainers => &NotFromContainers,
            Self::Null => &NullPropagation,
        }
    }
}

/// How far below the child a merge or retraction reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reach {
    /// The child and every descendant
    Subtree,
    /// The child and its immediate children
    OneLevel,
}

/// What a node passes on to its children
fn inheritable(tree: &Tree, node: ItemId) -> Result<AccessControlList> {
    let item = tree.item(node)?;
    let acl = item.acl().without_public();

    let below_shared_collection = item
        .container_kind()
        .map(|kind| kind.is_shared_collection())
        .unwrap_or(false);

    if below_shared_collection {
        let config = tree.config();
        Ok(acl.without_principals(|p| config.is_elevated(p)))
    } else {
        Ok(acl)
    }
}

/// Merge `parent`'s inheritable ACL into `child`, then down the subtree
///
/// Nodes are visited parents first, so a node reached through several
/// containers in the subtree receives the union of what each of them passes
/// on. Returns the number of entries added across all nodes.
pub(crate) fn merge_down(tree: &mut Tree, parent: ItemId, child: ItemId, reach: Reach) -> Result<usize> {
    let mut pending: HashMap<ItemId, AccessControlList> = HashMap::new();
    pending.insert(child, inheritable(tree, parent)?);

    let order = affected_in_order(tree, child, reach)?;
    let mut added = 0;

    for node in &order {
        let Some(grant) = pending.remove(node) else {
            continue;
        };
        added += tree.item_mut(*node)?.acl_mut().union_with(&grant);

        let descend = match reach {
            Reach::Subtree => true,
            Reach::OneLevel => *node == child,
        };
        if !descend || !tree.item(*node)?.is_container() {
            continue;
        }

        let pushed = inheritable(tree, *node)?;
        for below in tree.children(*node) {
            pending.entry(below).or_default().union_with(&pushed);
        }
    }

    debug!(
        "Merged ACL of {} into {} nodes below it ({} entries added)",
        parent,
        order.len(),
        added
    );
    Ok(added)
}

/// Retract what `child` shared with `parent`, after the edge was removed
///
/// Returns the number of entries removed across all nodes.
pub(crate) fn retract_down(tree: &mut Tree, parent: ItemId, child: ItemId, reach: Reach) -> Result<usize> {
    let candidates = tree
        .item(parent)?
        .acl()
        .intersection(tree.item(child)?.acl())
        .without_public();

    if candidates.is_empty() {
        return Ok(0);
    }

    let mut removed = 0;
    for node in affected_in_order(tree, child, reach)? {
        let mut still_supplied = AccessControlList::new();
        for above in tree.parents(node) {
            still_supplied.union_with(tree.item(above)?.acl());
        }

        let retract = candidates.difference(&still_supplied);
        if !retract.is_empty() {
            removed += tree.item_mut(node)?.acl_mut().remove_all(&retract);
        }
    }

    debug!(
        "Retracted ACL of {} from {} ({} entries removed)",
        parent, child, removed
    );
    Ok(removed)
}

/// `child` and the nodes below it within `reach`, parents before children
///
/// Uses Kahn's algorithm restricted to the affected nodes. Corrupted cyclic
/// data leaves some nodes unsorted; those are appended in discovery order.
fn affected_in_order(tree: &Tree, child: ItemId, reach: Reach) -> Result<Vec<ItemId>> {
    let mut discovered = vec![child];
    let mut members: HashSet<ItemId> = HashSet::from([child]);
    let mut queue = VecDeque::from([(child, 0usize)]);

    while let Some((node, depth)) = queue.pop_front() {
        if reach == Reach::OneLevel && depth >= 1 {
            continue;
        }
        for below in tree.children(node) {
            if members.insert(below) {
                discovered.push(below);
                queue.push_back((below, depth + 1));
            }
        }
    }

    let mut in_degree: HashMap<ItemId, usize> = HashMap::with_capacity(discovered.len());
    for node in &discovered {
        let count = tree
            .parents(*node)
            .into_iter()
            .filter(|p| members.contains(p))
            .count();
        in_degree.insert(*node, count);
    }

    let mut ready: VecDeque<ItemId> = discovered
        .iter()
        .copied()
        .filter(|n| in_degree.get(n).copied() == Some(0))
        .collect();
    let mut ordered = Vec::with_capacity(discovered.len());
    let mut placed: HashSet<ItemId> = HashSet::new();

    while let Some(node) = ready.pop_front() {
        placed.insert(node);
        ordered.push(node);
        for below in tree.children(node) {
            if let Some(degree) = in_degree.get_mut(&below) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 && !placed.contains(&below) {
                    ready.push_back(below);
                }
            }
        }
    }

    if ordered.len() < discovered.len() {
        warn!("Cycle below {} while retracting ACL entries", child);
        ordered.extend(discovered.into_iter().filter(|n| !placed.contains(n)));
    }
    Ok(ordered)
}
