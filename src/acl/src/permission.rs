//! Opaque permission values and exact set algebra over them

use crate::error::{AclError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An opaque permission value
///
/// The tree never interprets permissions; it only compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Create a permission from its textual value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Create a permission, rejecting empty values
    pub fn try_new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AclError::EmptyPermission);
        }
        Ok(Self(value))
    }

    /// Returns the textual value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unordered collection of permissions
///
/// Backed by an ordered set so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Create an empty permission set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a permission, returning `true` if it was not already present
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.permissions.insert(permission)
    }

    /// Remove a permission by equality, returning `true` if it was present
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.permissions.remove(permission)
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Set union
    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        Self {
            permissions: self.permissions.union(&other.permissions).cloned().collect(),
        }
    }

    /// In-place set union
    pub fn union_with(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Permissions present in both sets
    pub fn intersection(&self, other: &PermissionSet) -> PermissionSet {
        Self {
            permissions: self
                .permissions
                .intersection(&other.permissions)
                .cloned()
                .collect(),
        }
    }

    /// Permissions present in `self` but not in `other`
    pub fn difference(&self, other: &PermissionSet) -> PermissionSet {
        Self {
            permissions: self
                .permissions
                .difference(&other.permissions)
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.permissions.extend(iter);
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::btree_set::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.into_iter()
    }
}
