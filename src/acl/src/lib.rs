//! # Folio ACL
//!
//! Access-control primitives shared by the container tree.
//!
//! ## Features
//!
//! - **Principals**: users, groups, roles and the reserved anonymous/public identity
//! - **Permission sets**: exact set algebra over opaque permission values
//! - **Access-control lists**: per-item `(principal, permission)` grants with
//!   union, intersection and selective removal
//!
//! ## Example
//!
//! ```rust
//! use folio_acl::{AccessControlEntry, AccessControlList, Permission, Principal};
//!
//! let mut folder = AccessControlList::new();
//! folder.insert(AccessControlEntry::new(Principal::user("alice"), Permission::new("READ")));
//! folder.insert(AccessControlEntry::new(Principal::Anonymous, Permission::new("READ")));
//!
//! let inherited = folder.without_public();
//! assert_eq!(inherited.len(), 1);
//! ```

pub mod entry;
pub mod error;
pub mod list;
pub mod permission;
pub mod principal;

pub use entry::AccessControlEntry;
pub use error::{AclError, Result};
pub use list::AccessControlList;
pub use permission::{Permission, PermissionSet};
pub use principal::{Principal, ANONYMOUS};
