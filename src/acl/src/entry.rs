//! Access-control entries

use crate::permission::Permission;
use crate::principal::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `(principal, permission)` grant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccessControlEntry {
    /// Who holds the grant
    pub principal: Principal,

    /// What is granted
    pub permission: Permission,
}

impl AccessControlEntry {
    /// Create a new entry
    pub fn new(principal: Principal, permission: Permission) -> Self {
        Self {
            principal,
            permission,
        }
    }

    /// Whether this entry publishes the item to the anonymous principal
    pub fn is_public(&self) -> bool {
        self.principal.is_anonymous()
    }
}

impl fmt::Display for AccessControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.principal, self.permission)
    }
}
