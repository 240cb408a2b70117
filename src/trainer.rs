//! Spaced-exposure trainer over a junction catalog.
//!
//! Presents every catalog item exactly once per pass, front-loading the ones
//! the trainee has not reviewed yet. The traversal order is computed once at
//! session start (shuffled unseen items followed by shuffled seen items) and
//! never reshuffled mid-session, so progress feels deterministic while the
//! session lasts. The seen set is the only cross-session state: it is
//! persisted write-through on every mark, so a crash cannot lose progress
//! already recorded.

use std::collections::HashSet;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::storage::{load_seen_ids, save_seen_ids, KeyValueStore};
use crate::Annotation;

/// Scheduler drilling a fixed annotation catalog to completion.
///
/// The catalog is a read-only snapshot taken at construction; the injected
/// store carries the seen set across sessions.
#[derive(Debug)]
pub struct TrainerScheduler<S: KeyValueStore> {
    /// Session traversal order: shuffled unseen, then shuffled seen.
    order: Vec<Annotation>,
    /// Ids of the current catalog, for completion checks.
    catalog_ids: HashSet<u64>,
    /// Reviewed ids, including any persisted by earlier sessions. May
    /// contain stale ids from an older catalog; those are ignored.
    seen: HashSet<u64>,
    cursor: usize,
    completed: bool,
    store: S,
}

impl<S: KeyValueStore> TrainerScheduler<S> {
    /// Build a session over `catalog`, loading persisted progress from
    /// `store` and shuffling with the thread-local generator.
    pub fn new(catalog: Vec<Annotation>, store: S) -> Self {
        let mut rng = rand::thread_rng();
        Self::with_rng(catalog, store, &mut rng)
    }

    /// Like [`TrainerScheduler::new`] with an injectable random source, so
    /// tests can seed the shuffle.
    pub fn with_rng(catalog: Vec<Annotation>, store: S, rng: &mut impl Rng) -> Self {
        let seen = load_seen_ids(&store);
        let catalog_ids: HashSet<u64> = catalog.iter().map(|a| a.id).collect();

        let (mut unseen, mut reviewed): (Vec<Annotation>, Vec<Annotation>) =
            catalog.into_iter().partition(|a| !seen.contains(&a.id));
        unseen.shuffle(rng);
        reviewed.shuffle(rng);

        let completed =
            !catalog_ids.is_empty() && catalog_ids.iter().all(|id| seen.contains(id));

        let reviewed_count = reviewed.len();
        let mut order = unseen;
        order.append(&mut reviewed);
        info!(
            "trainer session: {} items, {} already seen",
            order.len(),
            reviewed_count
        );

        Self {
            order,
            catalog_ids,
            seen,
            cursor: 0,
            completed,
            store,
        }
    }

    /// The item under the cursor, if the catalog is non-empty.
    pub fn current(&self) -> Option<&Annotation> {
        self.order.get(self.cursor)
    }

    /// Mark the current item reviewed and persist immediately.
    ///
    /// When the seen set now covers the full catalog the session becomes
    /// [completed](Self::is_completed) and the cursor stays put; otherwise
    /// the cursor advances circularly to the next item.
    pub fn mark_current_seen(&mut self) {
        if self.completed {
            return;
        }
        let Some(current) = self.current() else {
            return;
        };

        self.seen.insert(current.id);
        save_seen_ids(&mut self.store, &self.seen);

        if self.catalog_ids.iter().all(|id| self.seen.contains(id)) {
            info!("trainer catalog fully reviewed");
            self.completed = true;
            return;
        }

        self.advance();
    }

    /// Advance to the next item without recording a review.
    ///
    /// Wraps past the end; can never complete the session.
    pub fn skip(&mut self) {
        self.advance();
    }

    /// Step the cursor back one item, clamped at the first.
    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Clear all progress: empty seen set (persisted), cursor at the first
    /// item, completion cleared.
    pub fn reset(&mut self) {
        self.seen.clear();
        save_seen_ids(&mut self.store, &self.seen);
        self.cursor = 0;
        self.completed = false;
    }

    fn advance(&mut self) {
        if self.order.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.order.len();
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Catalog size.
    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// Reviewed items counted against the current catalog; persisted ids
    /// that no longer exist in the catalog are not counted.
    pub fn seen_count(&self) -> usize {
        self.seen
            .iter()
            .filter(|id| self.catalog_ids.contains(id))
            .count()
    }

    /// Whether the current item was already reviewed (possibly in an
    /// earlier session).
    pub fn current_is_seen(&self) -> bool {
        self.current().is_some_and(|a| self.seen.contains(&a.id))
    }

    /// The session traversal order, by id.
    pub fn order_ids(&self) -> Vec<u64> {
        self.order.iter().map(|a| a.id).collect()
    }

    /// The backing store, for inspection.
    pub fn store(&self) -> &S {
        &self.store
    }
}
