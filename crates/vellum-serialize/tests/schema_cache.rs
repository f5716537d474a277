//! Integration tests: schema tree memoization through the engine.

mod common;

use std::sync::Arc;

use common::{Order, Status};
use serde_json::json;
use vellum_serialize::{
    ClassDescriptor, Engine, FieldDescriptor, GroupSet, MemoryCache, NoCache, SchemaCache,
    TypeDescriptor,
};

#[test]
fn test_repeated_calls_reuse_the_tree() {
    let cache = Arc::new(MemoryCache::new());
    let engine = Engine::builder()
        .register::<Order>()
        .cache(cache.clone())
        .build();
    let ctx = engine.context::<Order>();

    let first = ctx.tree().unwrap();
    let lookups = engine.registry().lookups();
    let hits = cache.stats().hits;

    let second = ctx.tree().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.registry().lookups(), lookups);
    assert_eq!(cache.stats().hits, hits + 1);

    // Resolution goes through the same tree.
    let order = ctx.from(json!({"id": 1, "status": "CLOSED"})).unwrap();
    assert_eq!(order.status, Status::Closed);
    assert_eq!(engine.registry().lookups(), lookups);
}

#[test]
fn test_group_sets_are_keyed_separately() {
    let cache = Arc::new(MemoryCache::new());
    let engine = Engine::builder()
        .register::<Order>()
        .cache(cache.clone())
        .build();

    let public = engine.tree("Order", &GroupSet::new()).unwrap();
    let admin = engine.tree("Order", &GroupSet::single("admin")).unwrap();
    assert!(!Arc::ptr_eq(&public, &admin));

    // Order under both group sets plus LineItem under the default request.
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.invalidate("Order"), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_group_order_does_not_matter() {
    let engine = Engine::builder().register::<Order>().build();
    let ab = engine
        .tree("Order", &GroupSet::from(["public", "admin"]))
        .unwrap();
    let ba = engine
        .tree("Order", &GroupSet::from(["admin", "public", "admin"]))
        .unwrap();
    assert!(Arc::ptr_eq(&ab, &ba));
}

#[test]
fn test_engines_share_the_global_cache() {
    let class = || {
        ClassDescriptor::new("SharedGlobalClass")
            .field(FieldDescriptor::of("x", TypeDescriptor::int()))
    };
    let first = Engine::builder()
        .class(class())
        .cache(MemoryCache::global())
        .build();
    let second = Engine::builder()
        .class(class())
        .cache(MemoryCache::global())
        .build();

    let a = first.tree("SharedGlobalClass", &GroupSet::new()).unwrap();
    let lookups = second.registry().lookups();
    let b = second.tree("SharedGlobalClass", &GroupSet::new()).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(second.registry().lookups(), lookups);
}

#[test]
fn test_shared_cache_separates_diverging_registries() {
    let cache = Arc::new(MemoryCache::new());
    let by_id = Engine::builder()
        .class(
            ClassDescriptor::new("User").field(FieldDescriptor::of("id", TypeDescriptor::int())),
        )
        .cache(cache.clone())
        .build();
    let by_name = Engine::builder()
        .class(
            ClassDescriptor::new("User")
                .field(FieldDescriptor::of("name", TypeDescriptor::string())),
        )
        .cache(cache.clone())
        .build();

    let out = by_id.dynamic("User").convert(json!({"id": 1})).unwrap();
    assert_eq!(out, json!({"id": 1}));
    let out = by_name.dynamic("User").convert(json!({"name": "x"})).unwrap();
    assert_eq!(out, json!({"name": "x"}));

    assert_eq!(cache.len(), 2);
    let a = by_id.tree("User", &GroupSet::new()).unwrap();
    let b = by_name.tree("User", &GroupSet::new()).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(a.field("id").is_some());
    assert!(b.field("name").is_some());
}

#[test]
fn test_private_caches_are_isolated() {
    let class = ClassDescriptor::new("Isolated")
        .field(FieldDescriptor::of("x", TypeDescriptor::int()));
    let first = Engine::builder().class(class.clone()).build();
    let second = Engine::builder().class(class).build();
    let a = first.tree("Isolated", &GroupSet::new()).unwrap();
    let b = second.tree("Isolated", &GroupSet::new()).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_no_cache_rebuilds_every_time() {
    let engine = Engine::builder()
        .register::<Order>()
        .cache(Arc::new(NoCache))
        .build();
    let a = engine.tree("Order", &GroupSet::new()).unwrap();
    let b = engine.tree("Order", &GroupSet::new()).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.outline(), b.outline());
    assert!(!engine.cache().has(&vellum_serialize::SchemaKey::new(
        "Order",
        &GroupSet::new()
    )));
}

#[test]
fn test_concurrent_builds_agree() {
    let engine = Engine::builder().register::<Order>().build();
    let outlines: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.tree("Order", &GroupSet::new()).unwrap().outline()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(outlines.windows(2).all(|w| w[0] == w[1]));
}
