//! Error types for the container tree

use crate::item::ItemId;
use folio_acl::AclError;
use thiserror::Error;

/// Container tree errors
#[derive(Debug, Error)]
pub enum TreeError {
    /// An item cannot be its own parent
    #[error("Structural violation: item {0} cannot be added to itself")]
    SelfParent(ItemId),

    /// The prospective edge would close a cycle
    #[error("Structural violation: adding {child} under {parent} would create a cycle")]
    CycleDetected { parent: ItemId, child: ItemId },

    /// A child-add policy refused the addition
    #[error("Policy violation: '{policy}' refused adding {child} to {parent}")]
    PolicyViolation {
        policy: &'static str,
        parent: ItemId,
        child: ItemId,
    },

    /// The live graph is cyclic or has dangling references
    #[error("Inconsistent graph: {0}")]
    InconsistentGraph(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Operation requires a container
    #[error("Item {0} is not a container")]
    NotAContainer(ItemId),

    /// Container still holds children
    #[error("Container {0} still has children")]
    ContainerNotEmpty(ItemId),

    /// Access-control error
    #[error("ACL error: {0}")]
    Acl(#[from] AclError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence collaborator error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TreeError {
    /// Self-parenting or cycle creation
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::SelfParent(_) | Self::CycleDetected { .. })
    }

    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation { .. })
    }
}

/// Result type for container tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
