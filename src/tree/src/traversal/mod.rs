//! Cycle-safe traversal of the parent graph
//!
//! Two separate checks live here:
//! - [`would_create_cycle`], a depth-first check over a *prospective* edge,
//!   run before anything is inserted
//! - [`ParentTraversal`], a breadth-first shortest-path search over the live
//!   graph that reports corruption through `is_cycle_detected()` instead of
//!   failing

mod cycle;
mod engine;
mod path;

pub use cycle::{would_create_cycle, CycleCheck};
pub use engine::{foreign_sharing_boundary, ParentTraversal};
pub use path::ItemPath;
