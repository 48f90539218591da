//! The observable state store.
//!
//! One `Store` instance owns the canonical state tree. Components read
//! deep copies, submit typed partial updates, and watch dot-delimited
//! paths for changes. The store is constructed explicitly and passed by
//! reference from the application composition root; there is no ambient
//! global instance.
//!
//! Commits run synchronously and atomically: between the start of
//! [`Store::set_state`] and the last subscriber notification no other
//! update can interleave. Because `set_state` takes `&mut self`, a
//! subscriber callback cannot re-enter the store during notification;
//! callers that want to update state in reaction to a change queue the
//! follow-up patch instead of nesting it.

use crate::error::Result;
use crate::persist::SnapshotStorage;
use crate::state::{
    deep_merge, value_at, Connection, Session, SessionPatch, StatePatch, StatePath, StateTree,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Unique identifier for a registered subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

/// Callback invoked with `(new, old)` snapshots when a watched path changes.
pub type SubscriberFn = Box<dyn FnMut(&StateTree, &StateTree)>;

struct Subscription {
    id: SubscriptionId,
    path: StatePath,
    callback: SubscriberFn,
}

/// The restricted subset of the tree written to durable storage.
#[derive(Serialize)]
struct PersistedSections<'a> {
    session: &'a Session,
    connection: &'a Connection,
    ui: &'a crate::state::UiState,
    filters: &'a crate::state::Filters,
}

/// Central state container with path-scoped change notification and
/// incremental persistence.
pub struct Store {
    /// Canonical tree. Exclusively owned; consumers get clones.
    tree: StateTree,

    snapshots: Box<dyn SnapshotStorage>,

    /// Registration order is notification order.
    subscriptions: Vec<Subscription>,

    next_id: u64,
}

impl Store {
    /// Open a store over the given snapshot storage.
    ///
    /// A missing, unreadable, or malformed persisted snapshot is discarded
    /// with a warning and built-in defaults are used; initialization never
    /// fails because of snapshot problems. A well-formed snapshot is
    /// deep-merged over the defaults, so a stale or partial snapshot can
    /// override default keys but never remove one.
    pub fn open(snapshots: Box<dyn SnapshotStorage>) -> Self {
        let tree = match Self::restore(snapshots.as_ref()) {
            Some(tree) => tree,
            None => StateTree::default(),
        };
        Self {
            tree,
            snapshots,
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Open a store with no durable storage (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self::open(Box::new(crate::persist::MemorySnapshots::new()))
    }

    fn restore(snapshots: &dyn SnapshotStorage) -> Option<StateTree> {
        let raw = match snapshots.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("failed to read persisted snapshot: {} (using defaults)", e);
                return None;
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => {
                // Only the persisted subset may come back from storage;
                // anything else in the file is ignored.
                let mut restricted = serde_json::Map::new();
                for section in StateTree::PERSISTED_SECTIONS {
                    if let Some(value) = map.get(section) {
                        restricted.insert(section.to_string(), value.clone());
                    }
                }
                Value::Object(restricted)
            }
            Ok(other) => {
                warn!(
                    "persisted snapshot is not an object ({}), using defaults",
                    other
                );
                return None;
            }
            Err(e) => {
                warn!("malformed persisted snapshot: {} (using defaults)", e);
                return None;
            }
        };

        let defaults =
            serde_json::to_value(StateTree::default()).expect("default tree serializes");
        let merged = deep_merge(&defaults, &parsed);
        match serde_json::from_value(merged) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!("persisted snapshot has invalid shape: {} (using defaults)", e);
                None
            }
        }
    }

    /// A deep, independent copy of the current tree.
    ///
    /// Mutating the result never affects the store.
    pub fn state(&self) -> StateTree {
        self.tree.clone()
    }

    /// Merge a partial update into the tree, persist the restricted
    /// subset, and notify subscribers whose watched path changed.
    ///
    /// Mapping values merge recursively; scalars and arrays replace
    /// wholesale. The merge is non-mutating: on any failure the previous
    /// tree remains current. Persistence failures are logged and
    /// swallowed; the commit still happens.
    pub fn set_state(&mut self, patch: StatePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let old_value = serde_json::to_value(&self.tree)?;
        let new_value = deep_merge(&old_value, &patch.into_value());
        let new_tree: StateTree = serde_json::from_value(new_value.clone())
            .map_err(|e| crate::error::StoreError::Deserialization(e.to_string()))?;

        let old_tree = std::mem::replace(&mut self.tree, new_tree);
        debug!("state committed");

        self.persist();
        self.notify(&old_value, &new_value, old_tree);
        Ok(())
    }

    /// Watch the sub-value at `path`. The callback fires after every
    /// commit in which that sub-value differs, by deep structural
    /// equality, between the pre- and post-update trees.
    ///
    /// Callbacks fire in registration order. Multiple subscriptions may
    /// share a path.
    pub fn subscribe(
        &mut self,
        path: StatePath,
        callback: impl FnMut(&StateTree, &StateTree) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            path,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns false if the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Reset session and connection state and drop the persisted snapshot.
    pub fn logout(&mut self) -> Result<()> {
        self.set_state(
            StatePatch::new()
                .session(SessionPatch {
                    uid: Some(None),
                    username: Some(String::new()),
                    role: Some(crate::state::Role::User),
                    authenticated: Some(false),
                })
                .connection(crate::state::ConnectionPatch {
                    connected: Some(false),
                    url: Some(String::new()),
                    database: Some(String::new()),
                }),
        )?;
        if let Err(e) = self.snapshots.clear() {
            warn!("failed to clear persisted snapshot on logout: {}", e);
        }
        Ok(())
    }

    fn persist(&mut self) {
        let subset = PersistedSections {
            session: &self.tree.session,
            connection: &self.tree.connection,
            ui: &self.tree.ui,
            filters: &self.tree.filters,
        };
        let serialized = match serde_json::to_string(&subset) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize persisted subset: {}", e);
                return;
            }
        };
        if let Err(e) = self.snapshots.save(&serialized) {
            warn!("failed to write persisted snapshot: {}", e);
        }
    }

    /// Evaluate every distinct registered path exactly once against the
    /// old/new pair, then fire all callbacks on changed paths in
    /// registration order. A panicking callback is caught and logged and
    /// does not stop the remaining callbacks.
    fn notify(&mut self, old_value: &Value, new_value: &Value, old_tree: StateTree) {
        if self.subscriptions.is_empty() {
            return;
        }

        let mut changed: HashMap<StatePath, bool> = HashMap::new();
        for sub in &self.subscriptions {
            if !changed.contains_key(&sub.path) {
                let was = value_at(old_value, &sub.path);
                let now = value_at(new_value, &sub.path);
                changed.insert(sub.path.clone(), was != now);
            }
        }

        let new_snapshot = self.tree.clone();
        for sub in &mut self.subscriptions {
            if !changed.get(&sub.path).copied().unwrap_or(false) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                (sub.callback)(&new_snapshot, &old_tree)
            }));
            if result.is_err() {
                warn!(path = %sub.path, "subscriber panicked during notification");
            }
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}
