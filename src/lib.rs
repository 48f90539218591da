//! # Rollcall
//!
//! Client-side state synchronization core for an attendance-tracking
//! service: one versioned state tree shared by independent UI components,
//! fed by overlapping data loads, observed through path-scoped
//! subscriptions, and persisted incrementally.
//!
//! ## Core Concepts
//!
//! - **Store**: owns the canonical state tree; merges typed partial
//!   updates, persists a restricted subset, notifies path subscribers
//! - **Loader**: fetches record collections from the remote API and
//!   commits each independently
//! - **Hierarchy**: derives a parent/child location tree from the flat
//!   collection
//! - **Grouping**: derives an owner-keyed view of open attendance events
//!
//! ## Example
//!
//! ```ignore
//! use rollcall::{build_hierarchy, FileSnapshots, Loader, StatePath, Store};
//!
//! let mut store = Store::open(Box::new(FileSnapshots::new("./state.json")));
//!
//! store.subscribe(StatePath::parse("locations")?, |new, _old| {
//!     let tree = build_hierarchy(&new.locations);
//!     // re-render from `tree`
//! });
//!
//! Loader::new(&api).load_all(&mut store)?;
//! ```

pub mod api;
pub mod error;
pub mod grouping;
pub mod hierarchy;
pub mod loader;
pub mod persist;
pub mod state;
pub mod store;
pub mod types;

// Re-exports
pub use api::{Collection, FilterClause, RecordApi, SearchFilter};
pub use error::{Result, StoreError};
pub use grouping::{group_by_owner, group_by_owner_name, OpenEntry, OwnerGroup, OwnerKey};
pub use hierarchy::{build_hierarchy, LocationHierarchy, LocationNode};
pub use loader::{recompute_stats, Loader};
pub use persist::{FileSnapshots, MemorySnapshots, SnapshotStorage};
pub use state::{
    Connection, ConnectionPatch, Filters, FiltersPatch, Occupancy, Role, Session, SessionPatch,
    StatePatch, StatePath, StateTree, Stats, UiPatch, UiState,
};
pub use store::{Store, SubscriberFn, SubscriptionId};
pub use types::*;
