//! Breadth-first search up the parent graph

use super::path::ItemPath;
use crate::edge::ContainerEdge;
use crate::item::{Item, ItemId};
use crate::tree::Tree;
use folio_acl::Principal;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// Result of one exploration
struct Search {
    /// Nodes in discovery order, start included
    order: Vec<ItemId>,
    /// Child through which each node was first reached
    predecessor: HashMap<ItemId, ItemId>,
    /// Upward edges followed, keyed by the lower node
    explored: HashMap<ItemId, Vec<ItemId>>,
    found: Option<ItemId>,
}

/// Cycle-safe walker over the parent relation
///
/// Every query resets [`is_cycle_detected`](Self::is_cycle_detected). When it
/// reports `true` the query's answer is "unknown": the graph is cyclic or an
/// edge could not be resolved, and the returned path is empty.
pub struct ParentTraversal<'a> {
    tree: &'a Tree,
    cycle_detected: bool,
}

impl<'a> ParentTraversal<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            cycle_detected: false,
        }
    }

    /// Whether the last query found the graph inconsistent
    pub fn is_cycle_detected(&self) -> bool {
        self.cycle_detected
    }

    /// Shortest path from the nearest ancestor matching `predicate` down to `start`
    ///
    /// `start` itself is tested first. Edges for which `terminator` returns
    /// `true` are not followed. Among equally short paths the first one found
    /// in parent-edge insertion order wins.
    pub fn shortest_path_to<P, T>(&mut self, start: ItemId, predicate: P, terminator: T) -> ItemPath
    where
        P: FnMut(&Item) -> bool,
        T: FnMut(&ContainerEdge) -> bool,
    {
        let Some(search) = self.run(start, predicate, terminator, true) else {
            return ItemPath::empty();
        };
        let Some(found) = search.found else {
            return ItemPath::empty();
        };

        let mut nodes = vec![found];
        let mut current = found;
        while let Some(below) = search.predecessor.get(&current) {
            nodes.push(*below);
            current = *below;
        }
        ItemPath::new(nodes)
    }

    /// Shortest path from `target` down to `start`
    pub fn shortest_path_to_item(&mut self, start: ItemId, target: ItemId) -> ItemPath {
        self.shortest_path_to(start, |item| item.id() == target, |_| false)
    }

    /// Whether `target` is `start` or one of its ancestors
    pub fn reaches(&mut self, start: ItemId, target: ItemId) -> bool {
        !self.shortest_path_to_item(start, target).is_empty()
    }

    /// All ancestors of `start` in breadth-first order
    ///
    /// Empty when the graph is inconsistent.
    pub fn ancestors(&mut self, start: ItemId) -> Vec<ItemId> {
        match self.run(start, |_| false, |_| false, false) {
            Some(search) => search.order.into_iter().skip(1).collect(),
            None => Vec::new(),
        }
    }

    fn run<P, T>(
        &mut self,
        start: ItemId,
        mut predicate: P,
        mut terminator: T,
        stop_on_match: bool,
    ) -> Option<Search>
    where
        P: FnMut(&Item) -> bool,
        T: FnMut(&ContainerEdge) -> bool,
    {
        self.cycle_detected = false;
        let tree = self.tree;

        let Some(start_item) = tree.get(start) else {
            return self.inconsistent(format!("start item {} is missing", start));
        };

        let mut search = Search {
            order: vec![start],
            predecessor: HashMap::new(),
            explored: HashMap::new(),
            found: None,
        };

        if predicate(start_item) {
            search.found = Some(start);
            if stop_on_match {
                return Some(search);
            }
        }

        let mut queue = VecDeque::from([start]);
        let mut distance: HashMap<ItemId, usize> = HashMap::from([(start, 0)]);

        'bfs: while let Some(node) = queue.pop_front() {
            let depth = distance.get(&node).copied().unwrap_or_default();
            let Some(item) = tree.get(node) else {
                return self.inconsistent(format!("item {} is missing", node));
            };

            for edge_id in item.parent_edge_ids() {
                let Some(edge) = tree.edge(*edge_id) else {
                    return self.inconsistent(format!("{} on {} is dangling", edge_id, node));
                };
                if edge.item() != node {
                    return self.inconsistent(format!("{} hangs from {} but names {}", edge_id, node, edge.item()));
                }
                if terminator(edge) {
                    continue;
                }

                let up = edge.container();
                let Some(parent) = tree.get(up) else {
                    return self.inconsistent(format!("{} points at missing {}", edge_id, up));
                };
                search.explored.entry(node).or_default().push(up);

                if distance.contains_key(&up) {
                    continue;
                }
                distance.insert(up, depth + 1);
                search.predecessor.insert(up, node);
                search.order.push(up);

                if search.found.is_none() && predicate(parent) {
                    search.found = Some(up);
                    if stop_on_match {
                        break 'bfs;
                    }
                }
                queue.push_back(up);
            }
        }

        if explored_has_cycle(start, &search.explored) {
            return self.inconsistent(format!("cycle above {}", start));
        }
        Some(search)
    }

    fn inconsistent(&mut self, reason: String) -> Option<Search> {
        warn!("Parent traversal aborted: {}", reason);
        self.cycle_detected = true;
        None
    }
}

/// Three-colour DFS over the explored upward edges
fn explored_has_cycle(start: ItemId, explored: &HashMap<ItemId, Vec<ItemId>>) -> bool {
    let mut finished: HashSet<ItemId> = HashSet::new();
    let mut on_stack: HashSet<ItemId> = HashSet::from([start]);
    let mut stack: Vec<(ItemId, usize)> = vec![(start, 0)];

    while let Some((node, next)) = stack.last_mut() {
        let node = *node;
        let above = explored.get(&node).map(Vec::as_slice).unwrap_or(&[]);

        if *next == above.len() {
            on_stack.remove(&node);
            finished.insert(node);
            stack.pop();
            continue;
        }

        let target = above[*next];
        *next += 1;

        if on_stack.contains(&target) {
            return true;
        }
        if !finished.contains(&target) {
            on_stack.insert(target);
            stack.push((target, 0));
        }
    }

    false
}

/// Terminator that refuses to climb into another principal's sharing root
///
/// Used for breadcrumbs, so a user never sees a path through a sharing area
/// that belongs to someone else.
pub fn foreign_sharing_boundary<'t>(
    tree: &'t Tree,
    user: &'t Principal,
) -> impl FnMut(&ContainerEdge) -> bool + 't {
    move |edge| {
        tree.get(edge.container())
            .map(|container| {
                container
                    .container_kind()
                    .map(|kind| kind.is_reserved_sharing_root())
                    .unwrap_or(false)
                    && container.owner() != user
            })
            .unwrap_or(false)
    }
}
