//! Transactions on the shared handle and snapshot persistence

use folio_acl::{Permission, Principal};
use folio_tree::{
    BreadcrumbResolver, ContainerKind, DefaultChildAddPolicy, InMemoryTreeStore, InheritFromParent,
    SharedTree, Tree, TreeConfig, TreeError, TreeStore,
};
use std::sync::Arc;

fn alice() -> Principal {
    Principal::user("alice")
}

#[tokio::test]
async fn test_commit_is_visible_only_after_commit() {
    let store = InMemoryTreeStore::new();
    let shared = SharedTree::new(Tree::new());

    let folder = shared
        .transaction(|tree| Ok(tree.create_container("f", alice(), ContainerKind::Folder)))
        .unwrap();
    shared.commit(&store).await.unwrap();

    let doc = shared
        .transaction(|tree| Ok(tree.create_document("d", alice())))
        .unwrap();
    shared
        .add_child(folder, doc, &DefaultChildAddPolicy, &alice(), &InheritFromParent)
        .unwrap();

    let committed = store.load().await.unwrap().unwrap();
    assert!(committed.contains(folder));
    assert!(!committed.contains(doc));

    shared.commit(&store).await.unwrap();
    let committed = store.load().await.unwrap().unwrap();
    assert_eq!(committed.children(folder), vec![doc]);
}

#[tokio::test]
async fn test_round_trip_preserves_edges_and_acls() {
    let store = InMemoryTreeStore::new();
    let mut tree = Tree::new();
    let folder = tree.create_container("f", alice(), ContainerKind::Folder);
    let doc = tree.create_document("d", alice());
    tree.item_mut(folder)
        .unwrap()
        .acl_mut()
        .grant(Principal::group("lab"), Permission::new("READ"));
    tree.add_child(folder, doc, &DefaultChildAddPolicy, &alice(), &InheritFromParent)
        .unwrap();
    tree.mark_deleted_in(folder, doc, true).unwrap();

    let shared = SharedTree::new(tree);
    shared.commit(&store).await.unwrap();

    let loaded = SharedTree::load(&store).await.unwrap().unwrap();
    loaded.read(|tree| {
        assert!(tree.is_child_of(doc, folder));
        assert!(tree.is_deleted_in(folder, doc));
        assert!(tree
            .item(doc)
            .unwrap()
            .acl()
            .grants(&Principal::group("lab"), &Permission::new("READ")));
        assert!(tree.verify_acyclic().is_ok());
    });
}

#[tokio::test]
async fn test_loaded_tree_uses_store_config() {
    let config = TreeConfig {
        breadcrumb_cache_ttl_secs: 5,
        ..Default::default()
    };
    let store = InMemoryTreeStore::with_config(config.clone());
    store.commit(&Tree::new()).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.config(), &config);
}

#[test]
fn test_transaction_rolls_back_partial_work() {
    let mut tree = Tree::new();
    let a = tree.create_container("a", alice(), ContainerKind::Folder);
    let b = tree.create_container("b", alice(), ContainerKind::Folder);
    tree.add_child(a, b, &DefaultChildAddPolicy, &alice(), &InheritFromParent)
        .unwrap();
    let shared = SharedTree::new(tree);
    let generation = shared.read(|tree| tree.generation());

    let result = shared.transaction(|tree| {
        let doc = tree.create_document("d", alice());
        tree.add_child(b, doc, &DefaultChildAddPolicy, &alice(), &InheritFromParent)?;
        // closes a cycle, so the whole unit is discarded
        tree.add_child(b, a, &DefaultChildAddPolicy, &alice(), &InheritFromParent)
    });

    assert!(matches!(result, Err(TreeError::CycleDetected { .. })));
    shared.read(|tree| {
        assert_eq!(tree.len(), 2);
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.generation(), generation);
    });
}

#[test]
fn test_rolled_back_paths_are_not_served_from_cache() {
    let mut tree = Tree::new();
    let root = tree.create_container("root", alice(), ContainerKind::Folder);
    let a = tree.create_container("a", alice(), ContainerKind::Folder);
    let b = tree.create_container("b", alice(), ContainerKind::Folder);
    let doc = tree.create_document("d", alice());
    for (parent, child) in [(root, a), (root, b), (a, doc)] {
        tree.add_child(parent, child, &DefaultChildAddPolicy, &alice(), &InheritFromParent)
            .unwrap();
    }
    let shared = SharedTree::new(tree);
    let resolver = BreadcrumbResolver::new();

    let result: Result<(), TreeError> = shared.transaction(|tree| {
        tree.add_child(root, doc, &DefaultChildAddPolicy, &alice(), &InheritFromParent)?;
        assert_eq!(resolver.breadcrumb(tree, doc, root)?.len(), 2);
        Err(TreeError::Storage("aborted".to_string()))
    });
    assert!(result.is_err());

    shared
        .add_child(b, doc, &DefaultChildAddPolicy, &alice(), &InheritFromParent)
        .unwrap();
    let path = shared.read(|tree| resolver.breadcrumb(tree, doc, root)).unwrap();
    assert_eq!(path.len(), 3);
    assert!(!shared.read(|tree| tree.is_child_of(doc, root)));
}

#[test]
fn test_concurrent_adds_under_one_container() {
    let mut tree = Tree::new();
    let folder = tree.create_container("f", alice(), ContainerKind::Folder);
    tree.item_mut(folder)
        .unwrap()
        .acl_mut()
        .grant(Principal::user("x"), Permission::new("READ"));
    let shared = Arc::new(SharedTree::new(tree));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                shared.transaction(|tree| {
                    let doc = tree.create_document(format!("d{}", i), alice());
                    tree.add_child(folder, doc, &DefaultChildAddPolicy, &alice(), &InheritFromParent)?;
                    Ok(doc)
                })
            })
        })
        .collect();

    let docs: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    shared.read(|tree| {
        assert_eq!(tree.children(folder).len(), 8);
        for doc in &docs {
            assert!(tree
                .item(*doc)
                .unwrap()
                .acl()
                .grants(&Principal::user("x"), &Permission::new("READ")));
        }
    });
}
