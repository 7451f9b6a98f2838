use super::{merge_down, retract_down, AclPropagationPolicy, Reach};
use crate::error::Result;
use crate::item::ItemId;
use crate::tree::Tree;

/// Default policy: children inherit their container's grants
///
/// Adding merges the parent's ACL down the whole subtree; removing retracts
/// the entries the child shared with the parent it left, from the child and
/// everything below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InheritFromParent;

impl AclPropagationPolicy for InheritFromParent {
    fn name(&self) -> &'static str {
        "inherit"
    }

    fn on_add(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()> {
        merge_down(tree, parent, child, Reach::Subtree).map(|_| ())
    }

    fn on_remove(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()> {
        retract_down(tree, parent, child, Reach::Subtree).map(|_| ())
    }
}
