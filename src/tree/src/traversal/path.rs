//! Ordered paths from an ancestor down to an item

use crate::item::{Item, ItemId};
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A path through the parent graph
///
/// Ordered from the topmost ancestor down to the item the search started
/// from, both endpoints included. An empty path means "no path known".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemPath(Vec<ItemId>);

impl ItemPath {
    /// The empty path
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a path from nodes ordered top-down
    pub fn new(nodes: Vec<ItemId>) -> Self {
        Self(nodes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ItemId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ItemId] {
        &self.0
    }

    /// The topmost ancestor
    pub fn top(&self) -> Option<ItemId> {
        self.0.first().copied()
    }

    /// The node the search started from
    pub fn start(&self) -> Option<ItemId> {
        self.0.last().copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.0.contains(&id)
    }

    /// The node directly above `id` on this path
    pub fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        let pos = self.0.iter().position(|n| *n == id)?;
        pos.checked_sub(1).map(|above| self.0[above])
    }

    /// First node, from the top, whose item matches `predicate`
    pub fn first_match<P>(&self, tree: &Tree, mut predicate: P) -> Option<ItemId>
    where
        P: FnMut(&Item) -> bool,
    {
        self.0
            .iter()
            .copied()
            .find(|id| tree.get(*id).map(&mut predicate).unwrap_or(false))
    }

    /// Join two paths at their first common node
    ///
    /// The path in which the common node sits deeper supplies everything down
    /// to that node; the other supplies what lies below it. When both place it
    /// at the same depth the lexicographically smaller upper part wins, then
    /// the smaller lower part, so the operation is symmetric. Paths without a
    /// common node merge to the empty path.
    pub fn merge(&self, other: &ItemPath) -> ItemPath {
        let Some((i, j)) = self
            .0
            .iter()
            .enumerate()
            .find_map(|(i, n)| other.0.iter().position(|m| m == n).map(|j| (i, j)))
        else {
            return ItemPath::empty();
        };

        let self_is_upper = match i.cmp(&j) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self.0[..=i].cmp(&other.0[..=j]) {
                Ordering::Less => true,
                Ordering::Greater => false,
                // same upper part: keep the smaller lower part
                Ordering::Equal => other.0[j + 1..] <= self.0[i + 1..],
            },
        };

        let (upper, split_upper, lower, split_lower) = if self_is_upper {
            (&self.0, i, &other.0, j)
        } else {
            (&other.0, j, &self.0, i)
        };

        let mut merged = upper[..=split_upper].to_vec();
        merged.extend_from_slice(&lower[split_lower + 1..]);
        ItemPath(merged)
    }

    /// Item names along the path, falling back to ids for missing items
    pub fn names(&self, tree: &Tree) -> Vec<String> {
        self.0
            .iter()
            .map(|id| {
                tree.get(*id)
                    .map(|item| item.name().to_string())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect()
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ItemId::to_string).collect();
        write!(f, "{}", parts.join(" / "))
    }
}

impl<'a> IntoIterator for &'a ItemPath {
    type Item = &'a ItemId;
    type IntoIter = std::slice::Iter<'a, ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<ItemPath> for Vec<ItemId> {
    fn from(path: ItemPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<ItemId> {
        (0..n).map(|_| ItemId::new()).collect()
    }

    #[test]
    fn test_accessors() {
        let n = ids(3);
        let path = ItemPath::new(n.clone());

        assert_eq!(path.top(), Some(n[0]));
        assert_eq!(path.start(), Some(n[2]));
        assert_eq!(path.parent_of(n[2]), Some(n[1]));
        assert_eq!(path.parent_of(n[0]), None);
        assert_eq!(path.parent_of(ItemId::new()), None);
        assert!(ItemPath::empty().top().is_none());
    }

    #[test]
    fn test_merge_via_intermediate() {
        // root -> folder -> notebook and notebook -> doc
        let n = ids(4);
        let upper = ItemPath::new(vec![n[0], n[1], n[2]]);
        let lower = ItemPath::new(vec![n[2], n[3]]);

        let expected = ItemPath::new(n.clone());
        assert_eq!(upper.merge(&lower), expected);
        assert_eq!(lower.merge(&upper), expected);
    }

    #[test]
    fn test_merge_without_overlap_is_empty() {
        let a = ItemPath::new(ids(2));
        let b = ItemPath::new(ids(2));
        assert!(a.merge(&b).is_empty());
        assert!(b.merge(&a).is_empty());
    }

    #[test]
    fn test_merge_equal_depth_is_symmetric() {
        let n = ids(5);
        let a = ItemPath::new(vec![n[0], n[2], n[3]]);
        let b = ItemPath::new(vec![n[1], n[2], n[4]]);

        let ab = a.merge(&b);
        assert_eq!(ab, b.merge(&a));
        assert_eq!(ab.len(), 3);
        assert_eq!(ab.as_slice()[1], n[2]);
    }
}
