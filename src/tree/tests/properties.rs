//! Property-based tests for structural and ACL invariants

use folio_acl::{Permission, Principal};
use folio_tree::{
    AddOutcome, ContainerKind, InheritFromParent, ItemId, NullPropagation,
    PermissiveChildAddPolicy, Tree, TreeError,
};
use proptest::prelude::*;

const NODES: usize = 8;

fn forest() -> (Tree, Vec<ItemId>) {
    let owner = Principal::user("alice");
    let mut tree = Tree::new();
    let ids = (0..NODES)
        .map(|i| tree.create_container(format!("f{}", i), owner.clone(), ContainerKind::Folder))
        .collect();
    (tree, ids)
}

fn ops() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..NODES, 0..NODES), 0..40)
}

proptest! {
    #[test]
    fn prop_adds_never_create_cycles(ops in ops()) {
        let (mut tree, ids) = forest();
        let acting = Principal::user("alice");

        for (p, c) in ops {
            let edges_before = tree.edge_count();
            match tree.add_child(ids[p], ids[c], &PermissiveChildAddPolicy, &acting, &NullPropagation) {
                Ok(AddOutcome::Added(_)) => prop_assert_eq!(tree.edge_count(), edges_before + 1),
                Ok(AddOutcome::AlreadyPresent(_)) => prop_assert_eq!(tree.edge_count(), edges_before),
                Err(e) => {
                    prop_assert!(e.is_structural(), "unexpected error: {}", e);
                    prop_assert_eq!(tree.edge_count(), edges_before);
                }
            }
        }

        prop_assert!(tree.verify_acyclic().is_ok());
    }

    #[test]
    fn prop_repeated_adds_are_idempotent(ops in ops()) {
        let (mut tree, ids) = forest();
        let acting = Principal::user("alice");

        for (p, c) in &ops {
            let _ = tree.add_child(ids[*p], ids[*c], &PermissiveChildAddPolicy, &acting, &NullPropagation);
        }
        let edges = tree.edge_count();

        for (p, c) in &ops {
            match tree.add_child(ids[*p], ids[*c], &PermissiveChildAddPolicy, &acting, &NullPropagation) {
                Ok(outcome) => prop_assert!(!outcome.is_new()),
                Err(TreeError::SelfParent(_)) | Err(TreeError::CycleDetected { .. }) => {}
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
        }
        prop_assert_eq!(tree.edge_count(), edges);
    }

    #[test]
    fn prop_removal_keeps_rights_of_remaining_parent(
        from_a in prop::collection::btree_set("[a-e]", 0..5),
        from_b in prop::collection::btree_set("[a-e]", 0..5),
        public_a in any::<bool>(),
    ) {
        let owner = Principal::user("owner");
        let read = Permission::new("READ");
        let mut tree = Tree::new();
        let a = tree.create_container("A", owner.clone(), ContainerKind::Folder);
        let b = tree.create_container("B", owner.clone(), ContainerKind::Folder);
        let item = tree.create_document("I", owner.clone());

        for name in &from_a {
            tree.item_mut(a).unwrap().acl_mut().grant(Principal::user(name.as_str()), read.clone());
        }
        for name in &from_b {
            tree.item_mut(b).unwrap().acl_mut().grant(Principal::user(name.as_str()), read.clone());
        }
        if public_a {
            tree.item_mut(a).unwrap().acl_mut().grant(Principal::Anonymous, read.clone());
            tree.item_mut(item).unwrap().acl_mut().grant(Principal::Anonymous, read.clone());
        }

        tree.add_child(a, item, &PermissiveChildAddPolicy, &owner, &InheritFromParent).unwrap();
        tree.add_child(b, item, &PermissiveChildAddPolicy, &owner, &InheritFromParent).unwrap();
        tree.remove_child(a, item, &InheritFromParent).unwrap();

        let acl = tree.item(item).unwrap().acl();
        for name in &from_b {
            prop_assert!(acl.grants(&Principal::user(name.as_str()), &read));
        }
        for name in from_a.difference(&from_b) {
            prop_assert!(!acl.grants(&Principal::user(name.as_str()), &read));
        }
        prop_assert_eq!(acl.is_published(), public_a);
    }
}
