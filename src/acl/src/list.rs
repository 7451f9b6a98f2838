//! Per-item access-control lists
//!
//! An [`AccessControlList`] is a set of [`AccessControlEntry`] values. The
//! operations here are exact: union, intersection and removal all work by
//! entry equality, which conservative ACL retraction relies on.

use crate::entry::AccessControlEntry;
use crate::permission::{Permission, PermissionSet};
use crate::principal::Principal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of access-control entries attached to an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessControlList {
    entries: BTreeSet<AccessControlEntry>,
}

impl AccessControlList {
    /// Create an empty ACL
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, returning `true` if it was not already present
    pub fn insert(&mut self, entry: AccessControlEntry) -> bool {
        self.entries.insert(entry)
    }

    /// Grant `permission` to `principal`
    pub fn grant(&mut self, principal: Principal, permission: Permission) -> bool {
        self.insert(AccessControlEntry::new(principal, permission))
    }

    /// Remove an entry by equality, returning `true` if it was present
    pub fn remove(&mut self, entry: &AccessControlEntry) -> bool {
        self.entries.remove(entry)
    }

    /// Remove every entry of `other` from this ACL, returning how many were removed
    pub fn remove_all(&mut self, other: &AccessControlList) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !other.entries.contains(e));
        before - self.entries.len()
    }

    pub fn contains(&self, entry: &AccessControlEntry) -> bool {
        self.entries.contains(entry)
    }

    /// Whether `principal` holds `permission`
    pub fn grants(&self, principal: &Principal, permission: &Permission) -> bool {
        self.entries
            .iter()
            .any(|e| &e.principal == principal && &e.permission == permission)
    }

    /// Set union
    pub fn union(&self, other: &AccessControlList) -> AccessControlList {
        Self {
            entries: self.entries.union(&other.entries).cloned().collect(),
        }
    }

    /// In-place set union, returning how many entries were added
    pub fn union_with(&mut self, other: &AccessControlList) -> usize {
        let before = self.entries.len();
        self.entries.extend(other.entries.iter().cloned());
        self.entries.len() - before
    }

    /// Entries present in both ACLs
    pub fn intersection(&self, other: &AccessControlList) -> AccessControlList {
        Self {
            entries: self.entries.intersection(&other.entries).cloned().collect(),
        }
    }

    /// Entries present in `self` but not in `other`
    pub fn difference(&self, other: &AccessControlList) -> AccessControlList {
        Self {
            entries: self.entries.difference(&other.entries).cloned().collect(),
        }
    }

    /// Copy of this ACL without anonymous/public entries
    pub fn without_public(&self) -> AccessControlList {
        self.filtered(|e| !e.is_public())
    }

    /// Copy of this ACL without entries whose principal matches `predicate`
    pub fn without_principals<F>(&self, mut predicate: F) -> AccessControlList
    where
        F: FnMut(&Principal) -> bool,
    {
        self.filtered(|e| !predicate(&e.principal))
    }

    /// Copy of this ACL keeping only entries matching `keep`
    pub fn filtered<F>(&self, mut keep: F) -> AccessControlList
    where
        F: FnMut(&AccessControlEntry) -> bool,
    {
        Self {
            entries: self.entries.iter().filter(|e| keep(*e)).cloned().collect(),
        }
    }

    /// Permissions held by `principal`
    pub fn permissions_for(&self, principal: &Principal) -> PermissionSet {
        self.entries
            .iter()
            .filter(|e| &e.principal == principal)
            .map(|e| e.permission.clone())
            .collect()
    }

    /// Distinct principals holding at least one entry
    pub fn principals(&self) -> BTreeSet<&Principal> {
        self.entries.iter().map(|e| &e.principal).collect()
    }

    /// Whether any entry is held by the anonymous principal
    pub fn is_published(&self) -> bool {
        self.entries.iter().any(AccessControlEntry::is_public)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessControlEntry> {
        self.entries.iter()
    }
}

impl FromIterator<AccessControlEntry> for AccessControlList {
    fn from_iter<I: IntoIterator<Item = AccessControlEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<AccessControlEntry> for AccessControlList {
    fn extend<I: IntoIterator<Item = AccessControlEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for AccessControlList {
    type Item = AccessControlEntry;
    type IntoIter = std::collections::btree_set::IntoIter<AccessControlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AccessControlList {
    type Item = &'a AccessControlEntry;
    type IntoIter = std::collections::btree_set::Iter<'a, AccessControlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
