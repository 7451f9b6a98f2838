//! Breadcrumb resolution with caching
//!
//! A breadcrumb is the shortest path from a root container down to an item.
//! Results are cached per `(item, root, viewer)` and tagged with the epoch
//! and generation of the tree they were computed against, so any structural
//! change, or a different tree instance, makes them stale.

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::item::{Item, ItemId};
use crate::traversal::{foreign_sharing_boundary, ItemPath, ParentTraversal};
use crate::tree::Tree;
use dashmap::DashMap;
use folio_acl::Principal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Default cache TTL (60 seconds)
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    item: ItemId,
    root: ItemId,
    viewer: Option<Principal>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    path: ItemPath,
    epoch: Uuid,
    generation: u64,
    created_at: Instant,
}

impl CacheEntry {
    fn new(path: ItemPath, tree: &Tree) -> Self {
        Self {
            path,
            epoch: tree.epoch(),
            generation: tree.generation(),
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    /// The cached path if it was computed against this exact tree state
    fn get(&self, tree: &Tree, ttl: Duration) -> Option<&ItemPath> {
        let same_state = self.epoch == tree.epoch() && self.generation == tree.generation();
        if !same_state || self.is_expired(ttl) {
            None
        } else {
            Some(&self.path)
        }
    }
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Entries found expired or computed against an older tree
    pub stale: usize,
    /// Total number of entries in cache
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.stale;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Resolves breadcrumbs for navigation display
pub struct BreadcrumbResolver {
    cache: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    stats: Arc<DashMap<&'static str, usize>>,
}

impl BreadcrumbResolver {
    /// Create a resolver with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a resolver with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            ttl,
            stats: Arc::new(DashMap::new()),
        }
    }

    /// Create a resolver using the configured TTL
    pub fn from_config(config: &TreeConfig) -> Self {
        Self::with_ttl(config.breadcrumb_cache_ttl())
    }

    /// Shortest path from `root` down to `item`
    ///
    /// Returns an empty path when `root` is not an ancestor of `item`, and
    /// [`TreeError::InconsistentGraph`] when the traversal hit a cycle.
    pub fn breadcrumb(&self, tree: &Tree, item: ItemId, root: ItemId) -> Result<ItemPath> {
        self.resolve(tree, item, root, None)
    }

    /// Breadcrumb as seen by `user`
    ///
    /// Ascent stops at sharing roots owned by other principals.
    pub fn breadcrumb_for(
        &self,
        tree: &Tree,
        item: ItemId,
        root: ItemId,
        user: &Principal,
    ) -> Result<ItemPath> {
        self.resolve(tree, item, root, Some(user))
    }

    /// Breadcrumb from `root` to `item` passing through `via`
    ///
    /// Used for items reached through a particular container, such as a
    /// document shared through a notebook.
    pub fn breadcrumb_via(&self, tree: &Tree, item: ItemId, via: ItemId, root: ItemId) -> Result<ItemPath> {
        let lower = self.breadcrumb(tree, item, via)?;
        let upper = self.breadcrumb(tree, via, root)?;

        if lower.is_empty() || upper.is_empty() {
            return Ok(ItemPath::empty());
        }
        Ok(upper.merge(&lower))
    }

    fn resolve(
        &self,
        tree: &Tree,
        item: ItemId,
        root: ItemId,
        viewer: Option<&Principal>,
    ) -> Result<ItemPath> {
        if !tree.contains(item) {
            return Err(TreeError::ItemNotFound(item));
        }

        let key = CacheKey {
            item,
            root,
            viewer: viewer.cloned(),
        };
        if let Some(entry) = self.cache.get(&key) {
            if let Some(path) = entry.get(tree, self.ttl) {
                self.increment_stat("hits");
                return Ok(path.clone());
            }
            self.increment_stat("stale");
        } else {
            self.increment_stat("misses");
        }

        let path = Self::resolve_uncached(tree, item, root, viewer)?;
        self.cache.insert(key, CacheEntry::new(path.clone(), tree));
        Ok(path)
    }

    fn resolve_uncached(
        tree: &Tree,
        item: ItemId,
        root: ItemId,
        viewer: Option<&Principal>,
    ) -> Result<ItemPath> {
        let mut traversal = ParentTraversal::new(tree);
        let target = |candidate: &Item| candidate.id() == root;

        let path = match viewer {
            Some(user) => traversal.shortest_path_to(item, target, foreign_sharing_boundary(tree, user)),
            None => traversal.shortest_path_to(item, target, |_| false),
        };

        if traversal.is_cycle_detected() {
            warn!("Breadcrumb for {} under {} hit an inconsistent graph", item, root);
            return Err(TreeError::InconsistentGraph(format!(
                "cannot resolve path from {} to {}",
                root, item
            )));
        }

        debug!("Resolved breadcrumb for {} under {} ({} nodes)", item, root, path.len());
        Ok(path)
    }

    /// Clears the cache
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.stats.clear();
    }

    /// Removes expired entries from the cache
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.cache.retain(|_, entry| !entry.is_expired(ttl));
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            stale: self.get_stat("stale"),
            entries: self.cache.len(),
        }
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }

    /// Get the cache TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the number of cached entries
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for BreadcrumbResolver {
    fn default() -> Self {
        Self::new()
    }
}
