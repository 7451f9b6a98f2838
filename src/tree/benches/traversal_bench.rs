/// Benchmarks for the container tree
///
/// Measures performance of:
/// - Shortest-path search over deep chains and wide DAGs
/// - Prospective cycle checks
/// - ACL propagation over wide and deep subtrees
/// - Cached breadcrumb lookups

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use folio_acl::{Permission, Principal};
use folio_tree::{
    would_create_cycle, AclPropagationPolicy, BreadcrumbResolver, ContainerKind, InheritFromParent,
    ItemId, NullPropagation, ParentTraversal, PermissiveChildAddPolicy, Tree,
};

fn owner() -> Principal {
    Principal::user("bench")
}

/// root -> f1 -> ... -> f{depth} -> doc
fn chain(depth: usize) -> (Tree, ItemId, ItemId) {
    let mut tree = Tree::new();
    let root = tree.create_container("root", owner(), ContainerKind::Root);
    let mut parent = root;
    for i in 0..depth {
        let folder = tree.create_container(format!("f{}", i), owner(), ContainerKind::Folder);
        tree.add_child(parent, folder, &PermissiveChildAddPolicy, &owner(), &NullPropagation)
            .unwrap();
        parent = folder;
    }
    let doc = tree.create_document("doc", owner());
    tree.add_child(parent, doc, &PermissiveChildAddPolicy, &owner(), &NullPropagation)
        .unwrap();
    (tree, root, doc)
}

/// root with `width` folders, each holding `width` documents
fn wide(width: usize) -> (Tree, ItemId) {
    let mut tree = Tree::new();
    let root = tree.create_container("root", owner(), ContainerKind::Folder);
    for i in 0..width {
        let folder = tree.create_container(format!("f{}", i), owner(), ContainerKind::Folder);
        tree.add_child(root, folder, &PermissiveChildAddPolicy, &owner(), &NullPropagation)
            .unwrap();
        for j in 0..width {
            let doc = tree.create_document(format!("d{}-{}", i, j), owner());
            tree.add_child(folder, doc, &PermissiveChildAddPolicy, &owner(), &NullPropagation)
                .unwrap();
        }
    }
    (tree, root)
}

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");

    for depth in [10, 100, 1000] {
        let (tree, root, doc) = chain(depth);
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, _| {
            b.iter(|| {
                ParentTraversal::new(&tree).shortest_path_to_item(black_box(doc), black_box(root))
            });
        });
    }

    group.finish();
}

fn bench_cycle_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_check");

    for depth in [10, 100, 1000] {
        let (tree, root, doc) = chain(depth);
        let parent = tree.single_parent(doc).unwrap();
        group.bench_with_input(BenchmarkId::new("would_cycle", depth), &depth, |b, _| {
            b.iter(|| would_create_cycle(&tree, black_box(parent), black_box(root)));
        });
    }

    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");
    group.sample_size(20);

    for width in [10, 50] {
        let (mut base, root) = wide(width);
        let top = base.create_container("top", owner(), ContainerKind::Folder);
        base.item_mut(top)
            .unwrap()
            .acl_mut()
            .grant(Principal::group("lab"), Permission::new("READ"));

        group.bench_with_input(BenchmarkId::new("inherit_wide", width), &width, |b, _| {
            b.iter(|| {
                let mut tree = base.clone();
                InheritFromParent.on_add(&mut tree, black_box(top), black_box(root)).unwrap();
                tree
            });
        });
    }

    group.finish();
}

fn bench_breadcrumb_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("breadcrumb");
    let (tree, root, doc) = chain(100);
    let resolver = BreadcrumbResolver::new();

    group.bench_function("cached", |b| {
        b.iter(|| resolver.breadcrumb(&tree, black_box(doc), black_box(root)).unwrap());
    });

    group.bench_function("uncached", |b| {
        b.iter(|| {
            resolver.clear_cache();
            resolver.breadcrumb(&tree, black_box(doc), black_box(root)).unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_shortest_path,
    bench_cycle_check,
    bench_propagation,
    bench_breadcrumb_cache,
);

criterion_main!(benches);
