//! Prospective cycle check run before an edge is inserted

use crate::item::ItemId;
use crate::tree::Tree;
use std::collections::HashMap;

/// Outcome of checking a hypothetical `(child, parent)` edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleCheck {
    /// The edge keeps the graph acyclic
    Acyclic,
    /// The edge would close a cycle through `parent`
    WouldCycle,
    /// The existing graph is already cyclic or has dangling references
    Inconsistent,
}

impl CycleCheck {
    pub fn is_acyclic(self) -> bool {
        matches!(self, Self::Acyclic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    Gray,
    Black,
}

struct Frame {
    node: ItemId,
    upward: Vec<ItemId>,
    next: usize,
}

/// Would adding `child` to `parent` create a cycle?
///
/// Depth-first search from `parent` up through parent edges, over the current
/// graph plus the hypothetical edge `child -> parent`. Reaching `parent` again
/// while it is still on the stack means the new edge closes a cycle; any other
/// back edge means the stored graph is already cyclic.
pub fn would_create_cycle(tree: &Tree, parent: ItemId, child: ItemId) -> CycleCheck {
    if parent == child {
        return CycleCheck::WouldCycle;
    }

    let Some(start) = upward(tree, parent, parent, child) else {
        return CycleCheck::Inconsistent;
    };

    let mut colour: HashMap<ItemId, Colour> = HashMap::new();
    colour.insert(parent, Colour::Gray);
    let mut stack = vec![Frame {
        node: parent,
        upward: start,
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.upward.len() {
            colour.insert(frame.node, Colour::Black);
            stack.pop();
            continue;
        }

        let target = frame.upward[frame.next];
        frame.next += 1;

        match colour.get(&target) {
            Some(Colour::Gray) if target == parent => return CycleCheck::WouldCycle,
            Some(Colour::Gray) => return CycleCheck::Inconsistent,
            Some(Colour::Black) => {}
            None => {
                let Some(next) = upward(tree, target, parent, child) else {
                    return CycleCheck::Inconsistent;
                };
                colour.insert(target, Colour::Gray);
                stack.push(Frame {
                    node: target,
                    upward: next,
                    next: 0,
                });
            }
        }
    }

    CycleCheck::Acyclic
}

/// Containers directly above `node`, including the hypothetical edge
///
/// `None` when the node or one of its edges cannot be resolved.
fn upward(tree: &Tree, node: ItemId, parent: ItemId, child: ItemId) -> Option<Vec<ItemId>> {
    let item = tree.get(node)?;
    let mut containers = Vec::with_capacity(item.parent_edge_ids().len() + 1);

    for edge_id in item.parent_edge_ids() {
        let edge = tree.edge(*edge_id)?;
        if edge.item() != node || !tree.contains(edge.container()) {
            return None;
        }
        containers.push(edge.container());
    }

    if node == child {
        containers.push(parent);
    }
    Some(containers)
}
