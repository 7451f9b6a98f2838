use super::AclPropagationPolicy;
use crate::error::Result;
use crate::item::ItemId;
use crate::tree::Tree;

/// Leaves every ACL untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPropagation;

impl AclPropagationPolicy for NullPropagation {
    fn name(&self) -> &'static str {
        "null"
    }

    fn on_add(&self, _tree: &mut Tree, _parent: ItemId, _child: ItemId) -> Result<()> {
        Ok(())
    }

    fn on_remove(&self, _tree: &mut Tree, _parent: ItemId, _child: ItemId) -> Result<()> {
        Ok(())
    }
}
