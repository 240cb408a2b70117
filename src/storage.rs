//! Persistence port and stores for saved routes and trainer progress.
//!
//! Persistence is a get/set/clear contract keyed by fixed strings; callers
//! inject the store so tests substitute [`MemoryStore`]. All reads are
//! best-effort: missing or corrupt data degrades to an empty default with a
//! warning, never an error. The trainer's seen set is the only entity that
//! must survive restarts, so it is written through on every mutation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::PracticeRoute;

/// Storage key for the saved-routes array.
pub const SAVED_ROUTES_KEY: &str = "saved_routes";

/// Storage key for the trainer's seen-id collection.
pub const SEEN_SET_KEY: &str = "hojre_trainer_seen";

/// Minimal persistence contract: string values under fixed string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn clear(&mut self, key: &str);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn clear(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// File-backed store: one JSON file per key under a root directory.
///
/// Every operation is best-effort; IO failures log a warning and behave
/// like a missing key. Startup is never blocked by a broken store.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if let Err(e) = fs::create_dir_all(&root) {
            warn!("could not create store directory {}: {}", root.display(), e);
        }
        Self { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("could not read store key {key}: {e}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = fs::write(self.path_for(key), value) {
            warn!("could not write store key {key}: {e}");
        }
    }

    fn clear(&mut self, key: &str) {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not clear store key {key}: {e}"),
        }
    }
}

// ============================================================================
// Saved routes
// ============================================================================

/// Load the saved-routes array. Missing or corrupt data yields an empty list.
pub fn load_saved_routes(store: &impl KeyValueStore) -> Vec<PracticeRoute> {
    let Some(raw) = store.get(SAVED_ROUTES_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(routes) => routes,
        Err(e) => {
            warn!("saved routes unparsable, starting empty: {e}");
            Vec::new()
        }
    }
}

/// Append a route to the saved-routes array and persist it.
pub fn append_saved_route(store: &mut impl KeyValueStore, route: PracticeRoute) {
    let mut routes = load_saved_routes(store);
    routes.push(route);
    write_saved_routes(store, &routes);
}

/// Delete the saved route at `index`. Returns whether anything was removed.
pub fn delete_saved_route(store: &mut impl KeyValueStore, index: usize) -> bool {
    let mut routes = load_saved_routes(store);
    if index >= routes.len() {
        return false;
    }
    routes.remove(index);
    write_saved_routes(store, &routes);
    true
}

fn write_saved_routes(store: &mut impl KeyValueStore, routes: &[PracticeRoute]) {
    match serde_json::to_string(routes) {
        Ok(json) => store.set(SAVED_ROUTES_KEY, &json),
        Err(e) => warn!("could not serialize saved routes: {e}"),
    }
}

// ============================================================================
// Trainer seen set
// ============================================================================

/// Load the trainer's seen-id set. Missing or corrupt data yields empty.
pub fn load_seen_ids(store: &impl KeyValueStore) -> HashSet<u64> {
    let Some(raw) = store.get(SEEN_SET_KEY) else {
        return HashSet::new();
    };
    match serde_json::from_str::<Vec<u64>>(&raw) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!("seen set unparsable, starting empty: {e}");
            HashSet::new()
        }
    }
}

/// Persist the seen-id set as a sorted JSON array.
pub fn save_seen_ids(store: &mut impl KeyValueStore, seen: &HashSet<u64>) {
    let mut ids: Vec<u64> = seen.iter().copied().collect();
    ids.sort_unstable();
    match serde_json::to_string(&ids) {
        Ok(json) => store.set(SEEN_SET_KEY, &json),
        Err(e) => warn!("could not serialize seen set: {e}"),
    }
}
