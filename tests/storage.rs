//! Tests for storage module

use std::collections::HashSet;

use routedrill::storage::*;
use routedrill::PracticeRoute;

fn route(minutes: f64) -> PracticeRoute {
    PracticeRoute {
        duration_minutes: minutes,
        polyline: "_p~iF~ps|U".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_memory_store_get_set_clear() {
    let mut store = MemoryStore::new();
    assert!(store.get("k").is_none());

    store.set("k", "v");
    assert_eq!(store.get("k").as_deref(), Some("v"));

    store.set("k", "v2");
    assert_eq!(store.get("k").as_deref(), Some("v2"));

    store.clear("k");
    assert!(store.get("k").is_none());

    // Clearing a missing key is fine
    store.clear("k");
}

#[test]
fn test_file_store_roundtrip() {
    let root = std::env::temp_dir().join(format!("routedrill-store-{}", std::process::id()));
    let mut store = FileStore::new(&root);

    assert!(store.get("routes").is_none());

    store.set("routes", "[1, 2]");
    assert_eq!(store.get("routes").as_deref(), Some("[1, 2]"));

    // A second store over the same directory sees the value
    let other = FileStore::new(&root);
    assert_eq!(other.get("routes").as_deref(), Some("[1, 2]"));

    store.clear("routes");
    assert!(store.get("routes").is_none());
    store.clear("routes");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_saved_routes_roundtrip() {
    let mut store = MemoryStore::new();
    assert!(load_saved_routes(&store).is_empty());

    append_saved_route(&mut store, route(28.0));
    append_saved_route(&mut store, route(35.5));

    let routes = load_saved_routes(&store);
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].duration_minutes, 28.0);
    assert_eq!(routes[1].duration_minutes, 35.5);
}

#[test]
fn test_delete_saved_route_by_index() {
    let mut store = MemoryStore::new();
    append_saved_route(&mut store, route(28.0));
    append_saved_route(&mut store, route(35.5));

    assert!(delete_saved_route(&mut store, 0));
    let routes = load_saved_routes(&store);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].duration_minutes, 35.5);

    // Out of range deletes nothing
    assert!(!delete_saved_route(&mut store, 5));
    assert_eq!(load_saved_routes(&store).len(), 1);
}

#[test]
fn test_corrupt_saved_routes_degrade_to_empty() {
    let mut store = MemoryStore::new();
    store.set(SAVED_ROUTES_KEY, "definitely not json");

    assert!(load_saved_routes(&store).is_empty());

    // Appending over the corrupt value starts a fresh array
    append_saved_route(&mut store, route(30.0));
    assert_eq!(load_saved_routes(&store).len(), 1);
}

#[test]
fn test_seen_ids_roundtrip_sorted() {
    let mut store = MemoryStore::new();
    assert!(load_seen_ids(&store).is_empty());

    let seen: HashSet<u64> = [31, 7, 19].into_iter().collect();
    save_seen_ids(&mut store, &seen);

    assert_eq!(store.get(SEEN_SET_KEY).as_deref(), Some("[7,19,31]"));
    assert_eq!(load_seen_ids(&store), seen);
}

#[test]
fn test_corrupt_seen_ids_degrade_to_empty() {
    let mut store = MemoryStore::new();
    store.set(SEEN_SET_KEY, "[1, \"two\", 3]");
    assert!(load_seen_ids(&store).is_empty());
}

#[test]
fn test_saved_route_survives_serialization_verbatim() {
    let mut store = MemoryStore::new();
    let mut saved = route(31.0);
    saved.include_motorway = true;
    saved.distance_meters = 18_500.0;
    append_saved_route(&mut store, saved.clone());

    let restored = &load_saved_routes(&store)[0];
    assert_eq!(restored.polyline, saved.polyline);
    assert_eq!(restored.include_motorway, saved.include_motorway);
    assert_eq!(restored.distance_meters, saved.distance_meters);
}
