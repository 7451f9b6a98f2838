//! # Folio Tree
//!
//! Hierarchical container tree with access-control propagation.
//!
//! ## Features
//!
//! - **Multi-parent graph**: items may live in several containers at once;
//!   memberships are explicit edges with their own owner and soft-delete flag
//! - **Cycle safety**: every add is checked against the prospective graph,
//!   and reads report corrupted (cyclic) data instead of looping
//! - **Shortest paths**: breadth-first breadcrumb search with optional
//!   boundaries and path merging
//! - **ACL propagation**: pluggable strategies that merge grants down the tree
//!   on add and conservatively retract them on removal
//! - **Shared handle**: lock-guarded transactions with rollback and an async
//!   persistence collaborator
//!
//! ## Module Structure
//!
//! ```text
//! tree/
//! ├── item/          - Items, ids and container kinds
//! ├── edge/          - Membership edges
//! ├── tree/          - Arena storage and integrity checks
//! ├── container/     - Add, remove and move operations
//! ├── traversal/     - Cycle checks, BFS search and paths
//! ├── propagation/   - ACL propagation policies
//! ├── breadcrumb/    - Cached breadcrumb resolution
//! ├── shared/        - Transactional shared handle
//! └── store/         - Persistence collaborator
//! ```
//!
//! ## Example
//!
//! ```rust
//! use folio_acl::{Permission, Principal};
//! use folio_tree::{ContainerKind, DefaultChildAddPolicy, InheritFromParent, Tree};
//!
//! let alice = Principal::user("alice");
//! let mut tree = Tree::new();
//! let folder = tree.create_container("Projects", alice.clone(), ContainerKind::Folder);
//! let doc = tree.create_document("Plan", alice.clone());
//!
//! tree.item_mut(folder)?
//!     .acl_mut()
//!     .grant(Principal::user("bob"), Permission::new("READ"));
//! tree.add_child(folder, doc, &DefaultChildAddPolicy, &alice, &InheritFromParent)?;
//!
//! assert!(tree.item(doc)?.acl().grants(&Principal::user("bob"), &Permission::new("READ")));
//! # Ok::<(), folio_tree::TreeError>(())
//! ```

pub mod breadcrumb;
pub mod config;
pub mod container;
pub mod edge;
pub mod error;
pub mod item;
pub mod propagation;
pub mod shared;
pub mod store;
pub mod traversal;
pub mod tree;

pub use breadcrumb::{BreadcrumbResolver, CacheStats};
pub use config::TreeConfig;
pub use container::{
    AddOptions, AddOutcome, ChildAddPolicy, DefaultChildAddPolicy, PermissiveChildAddPolicy,
};
pub use edge::{ContainerEdge, EdgeId};
pub use error::{Result, TreeError};
pub use item::{ContainerKind, Item, ItemId, ItemKind};
pub use propagation::{
    AclPropagationPolicy, InheritFromParent, NotFromContainers, NullPropagation,
    PropagationPolicyKind, ShareIntoContainer,
};
pub use shared::SharedTree;
pub use store::{InMemoryTreeStore, TreeStore};
pub use traversal::{foreign_sharing_boundary, would_create_cycle, CycleCheck, ItemPath, ParentTraversal};
pub use tree::Tree;
