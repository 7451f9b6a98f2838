use super::{merge_down, retract_down, AclPropagationPolicy, Reach};
use crate::error::Result;
use crate::item::ItemId;
use crate::tree::Tree;
use tracing::debug;

/// Inherits on add, but only retracts when a document is detached
///
/// Container-level grants are never stripped by this policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFromContainers;

impl AclPropagationPolicy for NotFromContainers {
    fn name(&self) -> &'static str {
        "not_from_containers"
    }

    fn on_add(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()> {
        merge_down(tree, parent, child, Reach::Subtree).map(|_| ())
    }

    fn on_remove(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()> {
        if !tree.item(child)?.is_document() {
            debug!("Keeping ACL of container {} removed from {}", child, parent);
            return Ok(());
        }
        retract_down(tree, parent, child, Reach::Subtree).map(|_| ())
    }
}
