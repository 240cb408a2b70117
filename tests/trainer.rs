//! Tests for trainer module

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use routedrill::storage::{KeyValueStore, MemoryStore, SEEN_SET_KEY};
use routedrill::{Annotation, AnnotationKind, TrainerScheduler};

fn junction(id: u64) -> Annotation {
    Annotation::new(
        id,
        55.63 + id as f64 * 0.001,
        12.64,
        AnnotationKind::PriorityToRight,
    )
}

fn catalog(ids: &[u64]) -> Vec<Annotation> {
    ids.iter().map(|&id| junction(id)).collect()
}

fn scheduler(
    ids: &[u64],
    store: MemoryStore,
    seed: u64,
) -> TrainerScheduler<MemoryStore> {
    let mut rng = StdRng::seed_from_u64(seed);
    TrainerScheduler::with_rng(catalog(ids), store, &mut rng)
}

#[test]
fn test_initialize_yields_full_permutation() {
    let ids: Vec<u64> = (1..=20).collect();
    let trainer = scheduler(&ids, MemoryStore::new(), 7);

    let order = trainer.order_ids();
    assert_eq!(order.len(), 20);

    let unique: HashSet<u64> = order.iter().copied().collect();
    assert_eq!(unique, ids.iter().copied().collect());
}

#[test]
fn test_initialize_unseen_precede_seen() {
    let mut store = MemoryStore::new();
    store.set(SEEN_SET_KEY, "[2, 4]");

    let trainer = scheduler(&[1, 2, 3, 4], store, 11);
    let order = trainer.order_ids();
    assert_eq!(order.len(), 4);

    let front: HashSet<u64> = order[..2].iter().copied().collect();
    let back: HashSet<u64> = order[2..].iter().copied().collect();
    assert_eq!(front, HashSet::from([1, 3]));
    assert_eq!(back, HashSet::from([2, 4]));

    assert_eq!(trainer.seen_count(), 2);
    assert!(!trainer.is_completed());
}

#[test]
fn test_marking_every_item_completes() {
    let ids: Vec<u64> = (1..=5).collect();
    let mut trainer = scheduler(&ids, MemoryStore::new(), 3);

    for _ in 0..5 {
        trainer.mark_current_seen();
    }

    assert!(trainer.is_completed());
    assert_eq!(trainer.seen_count(), 5);

    let persisted: Vec<u64> =
        serde_json::from_str(&trainer.store().get(SEEN_SET_KEY).unwrap()).unwrap();
    assert_eq!(persisted, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_mark_is_write_through() {
    let mut trainer = scheduler(&[1, 2, 3], MemoryStore::new(), 3);
    let first = trainer.current().unwrap().id;

    trainer.mark_current_seen();

    // The store already holds the mark, not just the in-memory set
    let persisted: Vec<u64> =
        serde_json::from_str(&trainer.store().get(SEEN_SET_KEY).unwrap()).unwrap();
    assert_eq!(persisted, vec![first]);
}

#[test]
fn test_completing_mark_keeps_cursor() {
    let mut trainer = scheduler(&[1, 2], MemoryStore::new(), 3);

    trainer.mark_current_seen();
    let cursor_before = trainer.cursor();
    trainer.mark_current_seen();

    assert!(trainer.is_completed());
    assert_eq!(trainer.cursor(), cursor_before);

    // Further marks are inert once completed
    trainer.mark_current_seen();
    assert_eq!(trainer.seen_count(), 2);
}

#[test]
fn test_skip_advances_circularly_and_never_completes() {
    let mut trainer = scheduler(&[1, 2, 3], MemoryStore::new(), 5);

    let order = trainer.order_ids();
    for expected in [1usize, 2, 0, 1] {
        trainer.skip();
        assert_eq!(trainer.cursor(), expected);
    }
    assert!(!trainer.is_completed());
    assert_eq!(trainer.seen_count(), 0);
    assert_eq!(trainer.order_ids(), order);
}

#[test]
fn test_mark_wraps_past_the_end() {
    let mut trainer = scheduler(&[1, 2, 3], MemoryStore::new(), 5);

    // Skip to the last item, then mark it: the cursor wraps to 0
    trainer.skip();
    trainer.skip();
    assert_eq!(trainer.cursor(), 2);
    trainer.mark_current_seen();
    assert_eq!(trainer.cursor(), 0);
    assert!(!trainer.is_completed());
}

#[test]
fn test_previous_clamps_at_first_item() {
    let mut trainer = scheduler(&[1, 2, 3], MemoryStore::new(), 5);

    trainer.previous();
    assert_eq!(trainer.cursor(), 0);

    trainer.skip();
    trainer.skip();
    trainer.previous();
    assert_eq!(trainer.cursor(), 1);
}

#[test]
fn test_reset_clears_everything() {
    let mut trainer = scheduler(&[1, 2], MemoryStore::new(), 9);
    trainer.mark_current_seen();
    trainer.mark_current_seen();
    assert!(trainer.is_completed());

    trainer.reset();

    assert!(!trainer.is_completed());
    assert_eq!(trainer.cursor(), 0);
    assert_eq!(trainer.seen_count(), 0);
    assert_eq!(trainer.store().get(SEEN_SET_KEY).unwrap(), "[]");
}

#[test]
fn test_completed_immediately_when_catalog_already_covered() {
    let mut store = MemoryStore::new();
    store.set(SEEN_SET_KEY, "[1, 2, 3]");

    let trainer = scheduler(&[1, 2, 3], store, 2);
    assert!(trainer.is_completed());
    assert_eq!(trainer.seen_count(), 3);
}

#[test]
fn test_corrupt_persisted_progress_starts_empty() {
    let mut store = MemoryStore::new();
    store.set(SEEN_SET_KEY, "{not valid json");

    let trainer = scheduler(&[1, 2, 3], store, 2);
    assert_eq!(trainer.seen_count(), 0);
    assert!(!trainer.is_completed());
}

#[test]
fn test_stale_persisted_ids_are_tolerated() {
    let mut store = MemoryStore::new();
    // 99 belonged to an older catalog
    store.set(SEEN_SET_KEY, "[1, 99]");

    let mut trainer = scheduler(&[1, 2], store, 2);
    assert_eq!(trainer.seen_count(), 1);
    assert!(!trainer.is_completed());

    // Marking the one genuinely unseen item completes the catalog
    assert!(!trainer.current_is_seen());
    trainer.mark_current_seen();
    assert!(trainer.is_completed());
}

#[test]
fn test_empty_catalog_is_inert() {
    let mut trainer = scheduler(&[], MemoryStore::new(), 1);

    assert!(trainer.current().is_none());
    assert!(!trainer.is_completed());
    trainer.mark_current_seen();
    trainer.skip();
    assert_eq!(trainer.cursor(), 0);
    assert!(!trainer.is_completed());
}

#[test]
fn test_same_seed_same_order() {
    let ids: Vec<u64> = (1..=10).collect();
    let a = scheduler(&ids, MemoryStore::new(), 42);
    let b = scheduler(&ids, MemoryStore::new(), 42);
    assert_eq!(a.order_ids(), b.order_ids());
}
