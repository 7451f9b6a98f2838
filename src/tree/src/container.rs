//! Container operations: adding, removing and moving children
//!
//! Every add runs its checks in a fixed order before touching the graph:
//! self-loop, container-ness, the child-add policy, then the prospective
//! cycle check. A rejected add leaves the tree exactly as it was.

use crate::edge::EdgeId;
use crate::error::{Result, TreeError};
use crate::item::{ContainerKind, Item, ItemId};
use crate::propagation::AclPropagationPolicy;
use crate::traversal::{would_create_cycle, CycleCheck};
use crate::tree::{LinkOutcome, Tree};
use folio_acl::Principal;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Decides which items a container may hold
pub trait ChildAddPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_add(&self, parent: &Item, child: &Item) -> bool;
}

/// Notebooks hold documents only, and home folders are never nested
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChildAddPolicy;

impl ChildAddPolicy for DefaultChildAddPolicy {
    fn name(&self) -> &'static str {
        "default"
    }

    fn can_add(&self, parent: &Item, child: &Item) -> bool {
        if parent.is_notebook() && !child.is_document() {
            return false;
        }
        child.container_kind() != Some(ContainerKind::Root)
    }
}

/// Accepts any combination
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveChildAddPolicy;

impl ChildAddPolicy for PermissiveChildAddPolicy {
    fn name(&self) -> &'static str {
        "permissive"
    }

    fn can_add(&self, _parent: &Item, _child: &Item) -> bool {
        true
    }
}

/// Result of a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new membership edge was created
    Added(EdgeId),
    /// The item was already in the container; nothing changed
    AlreadyPresent(EdgeId),
}

impl AddOutcome {
    pub fn edge_id(self) -> EdgeId {
        match self {
            Self::Added(id) | Self::AlreadyPresent(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Self::Added(_))
    }
}

/// Options for [`Tree::add_child_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Park the edge instead of appending it to the container's child list
    /// until [`Tree::flush_deferred`] runs
    pub defer_container_index: bool,
}

impl Tree {
    /// Validate adding `child` to `container` without mutating anything
    pub fn check_add(
        &self,
        container: ItemId,
        child: ItemId,
        policy: &dyn ChildAddPolicy,
    ) -> Result<()> {
        if container == child {
            return Err(TreeError::SelfParent(child));
        }

        let parent = self.container(container)?;
        let member = self.item(child)?;

        if !policy.can_add(parent, member) {
            return Err(TreeError::PolicyViolation {
                policy: policy.name(),
                parent: container,
                child,
            });
        }

        match would_create_cycle(self, container, child) {
            CycleCheck::Acyclic => Ok(()),
            CycleCheck::WouldCycle => Err(TreeError::CycleDetected {
                parent: container,
                child,
            }),
            CycleCheck::Inconsistent => Err(TreeError::InconsistentGraph(format!(
                "cannot prove adding {} under {} is acyclic",
                child, container
            ))),
        }
    }

    /// Add `child` to `container`
    ///
    /// Adding an existing membership again is a no-op reported as
    /// [`AddOutcome::AlreadyPresent`].
    ///
    /// # Arguments
    ///
    /// * `policy` - Decides which items the container may hold
    /// * `acting` - Principal recorded as the owner of the new edge
    /// * `acl_policy` - How ACL entries flow from the container into the child
    ///
    /// # Returns
    ///
    /// The outcome with the membership's edge id, or the first check that failed
    pub fn add_child(
        &mut self,
        container: ItemId,
        child: ItemId,
        policy: &dyn ChildAddPolicy,
        acting: &Principal,
        acl_policy: &dyn AclPropagationPolicy,
    ) -> Result<AddOutcome> {
        self.add_child_with(container, child, policy, acting, acl_policy, AddOptions::default())
    }

    /// Like [`Tree::add_child`], with control over container-side indexing
    pub fn add_child_with(
        &mut self,
        container: ItemId,
        child: ItemId,
        policy: &dyn ChildAddPolicy,
        acting: &Principal,
        acl_policy: &dyn AclPropagationPolicy,
        options: AddOptions,
    ) -> Result<AddOutcome> {
        if let Err(e) = self.check_add(container, child, policy) {
            warn!("Rejected adding {} to {}: {}", child, container, e);
            return Err(e);
        }

        let edge_id = match self.link(child, container, acting.clone(), options.defer_container_index)? {
            LinkOutcome::Existing(edge_id) => {
                debug!("{} is already in {}", child, container);
                return Ok(AddOutcome::AlreadyPresent(edge_id));
            }
            LinkOutcome::Created(edge_id) => edge_id,
        };

        if acl_policy.propagates_type() {
            self.propagate_shared_kind(container, child)?;
        }
        acl_policy.on_add(self, container, child)?;

        info!(
            "Added {} to {} as {} (acl policy '{}')",
            child,
            container,
            edge_id,
            acl_policy.name()
        );
        Ok(AddOutcome::Added(edge_id))
    }

    /// Remove `child` from `container`
    ///
    /// Returns `Ok(false)` when there is no such membership or it could not be
    /// detached from both sides.
    pub fn remove_child(
        &mut self,
        container: ItemId,
        child: ItemId,
        acl_policy: &dyn AclPropagationPolicy,
    ) -> Result<bool> {
        if !self.unlink(child, container) {
            return Ok(false);
        }

        acl_policy.on_remove(self, container, child)?;
        info!(
            "Removed {} from {} (acl policy '{}')",
            child,
            container,
            acl_policy.name()
        );
        Ok(true)
    }

    /// Move `item` from `from` into `to`
    ///
    /// Returns `Ok(false)` for moves that are not allowed: the item is not in
    /// `from`, `from` and `to` are the same, the item is a fixed container,
    /// either end is a reserved sharing root, or the move crosses between a
    /// shared and a non-shared area. Structural and policy violations on the
    /// destination are reported as errors before anything is removed.
    pub fn move_item(&mut self, item: ItemId, from: ItemId, to: ItemId, acting: &Principal) -> Result<bool> {
        if !self.may_move(item, from, to, true)? {
            return Ok(false);
        }
        self.relocate(item, from, to, acting)
    }

    /// Move without the sharing-area restrictions
    ///
    /// Reproduces historical behaviour that allowed items to leave or enter
    /// reserved sharing roots. Not part of the default build.
    #[cfg(any(test, feature = "unsafe-move"))]
    pub fn move_item_unchecked_sharing(
        &mut self,
        item: ItemId,
        from: ItemId,
        to: ItemId,
        acting: &Principal,
    ) -> Result<bool> {
        if !self.may_move(item, from, to, false)? {
            return Ok(false);
        }
        warn!("Moving {} from {} to {} without sharing checks", item, from, to);
        self.relocate(item, from, to, acting)
    }

    fn may_move(&self, item: ItemId, from: ItemId, to: ItemId, sharing_checks: bool) -> Result<bool> {
        if from == to || !self.is_child_of(item, from) {
            debug!("Ignoring move of {} from {} to {}", item, from, to);
            return Ok(false);
        }

        if let Some(kind) = self.item(item)?.container_kind() {
            if !kind.is_relocatable() {
                warn!("Refusing to move fixed container {} ({:?})", item, kind);
                return Ok(false);
            }
        }

        if sharing_checks {
            let source = self.container(from)?;
            let target = self.container(to)?;
            let reserved = |i: &Item| {
                i.container_kind()
                    .map(ContainerKind::is_reserved_sharing_root)
                    .unwrap_or(false)
            };

            if reserved(source) || reserved(target) {
                warn!("Refusing to move {} across a reserved sharing root", item);
                return Ok(false);
            }
            if source.is_shared() != target.is_shared() {
                warn!("Refusing to move {} between shared and private areas", item);
                return Ok(false);
            }
        }

        self.check_add(to, item, &DefaultChildAddPolicy)?;
        Ok(true)
    }

    fn relocate(&mut self, item: ItemId, from: ItemId, to: ItemId, acting: &Principal) -> Result<bool> {
        let policy = self.config().move_policy.policy();

        if !self.remove_child(from, item, policy)? {
            return Ok(false);
        }
        self.add_child(to, item, &DefaultChildAddPolicy, acting, policy)?;
        Ok(true)
    }

    /// Convert `child` and the containers below it to their shared kinds
    /// when `container` is part of a sharing area
    fn propagate_shared_kind(&mut self, container: ItemId, child: ItemId) -> Result<()> {
        if !self.item(container)?.is_shared() {
            return Ok(());
        }

        let mut worklist = vec![child];
        let mut visited: HashSet<ItemId> = HashSet::from([child]);

        while let Some(node) = worklist.pop() {
            let Some(kind) = self.item(node)?.container_kind() else {
                continue;
            };

            let shared = kind.shared_variant();
            if shared != kind {
                debug!("{} becomes {:?} inside shared {}", node, shared, container);
                self.set_container_kind(node, shared)?;
            }

            for below in self.children(node) {
                if visited.insert(below) {
                    worklist.push(below);
                }
            }
        }
        Ok(())
    }
}
