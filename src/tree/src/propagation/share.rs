use super::{merge_down, retract_down, AclPropagationPolicy, Reach};
use crate::error::Result;
use crate::item::ItemId;
use crate::tree::Tree;

/// Policy used when sharing an item into another principal's collection
///
/// Same merge algebra as [`InheritFromParent`](super::InheritFromParent), but
/// it stops one level below the child and never converts container kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareIntoContainer;

impl AclPropagationPolicy for ShareIntoContainer {
    fn name(&self) -> &'static str {
        "share"
    }

    fn on_add(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()> {
        merge_down(tree, parent, child, Reach::OneLevel).map(|_| ())
    }

    fn on_remove(&self, tree: &mut Tree, parent: ItemId, child: ItemId) -> Result<()> {
        retract_down(tree, parent, child, Reach::OneLevel).map(|_| ())
    }

    fn propagates_type(&self) -> bool {
        false
    }
}
