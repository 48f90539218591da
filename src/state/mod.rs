//! The state tree and its typed partial updates.
//!
//! The tree is a single rooted structure of independent top-level sections.
//! Updates are expressed as [`StatePatch`] values built from per-section
//! patch types, so a partial update can only name fields the schema
//! actually has; the merge itself happens at the JSON layer (see `merge`).

mod merge;
mod path;

pub use path::StatePath;

pub(crate) use merge::{deep_merge, value_at};

use crate::types::{
    AttendanceEvent, LocationId, LocationRecord, PersonId, PersonRecord, PersonTypeId,
    PersonTypeRecord,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Access role granted at login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Officer,
    Manager,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Identity and login state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: Option<u64>,
    pub username: String,
    pub role: Role,
    pub authenticated: bool,
}

/// Transport/connection status.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub connected: bool,
    pub url: String,
    pub database: String,
}

/// View state consumed by UI components.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub current_view: String,
    pub selected_location: Option<LocationId>,
    pub selected_person: Option<PersonId>,
    pub selected_person_type: Option<PersonTypeId>,
    pub sidebar_collapsed: bool,
    pub theme: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_view: "dashboard".to_string(),
            selected_location: None,
            selected_person: None,
            selected_person_type: None,
            sidebar_collapsed: false,
            theme: "light".to_string(),
        }
    }
}

/// Active filters for record queries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub person_type: Option<PersonTypeId>,
    pub location: Option<LocationId>,
    pub search_term: String,
}

/// Occupancy summary for one location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub code: String,
    pub current: u32,
    pub capacity: u32,
    pub percentage: u32,
}

/// Derived counters recomputed after each full load.
///
/// The occupancy summaries live in a list, not a map, so that a
/// recomputation replaces them wholesale under the merge rules; a map
/// would merge key-by-key and keep entries for locations that no longer
/// exist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_persons: u64,
    pub total_locations: u64,
    pub currently_checked_in: u64,
    pub today_attendance: u64,
    pub location_occupancy: Vec<Occupancy>,
}

impl Stats {
    /// Look up the occupancy summary for a location code.
    pub fn occupancy(&self, code: &str) -> Option<&Occupancy> {
        self.location_occupancy.iter().find(|o| o.code == code)
    }
}

/// The canonical state tree owned by the [`Store`](crate::Store).
///
/// Every top-level section merges independently; no section's update
/// requires reading another section. Consumers only ever receive clones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTree {
    pub session: Session,
    pub connection: Connection,
    pub locations: Vec<LocationRecord>,
    pub persons: Vec<PersonRecord>,
    pub person_types: Vec<PersonTypeRecord>,
    pub attendance: Vec<AttendanceEvent>,
    pub ui: UiState,
    pub filters: Filters,
    pub stats: Stats,
}

impl StateTree {
    /// Names of the top-level sections, in schema order.
    pub const SECTIONS: [&'static str; 9] = [
        "session",
        "connection",
        "locations",
        "persons",
        "person_types",
        "attendance",
        "ui",
        "filters",
        "stats",
    ];

    /// Sections written to durable storage. Bulk record collections are
    /// deliberately excluded; they are refetched on every start.
    pub(crate) const PERSISTED_SECTIONS: [&'static str; 4] =
        ["session", "connection", "ui", "filters"];
}

/// Partial update to the session section.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<Option<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
}

/// Partial update to the connection section.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConnectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Partial update to the UI section.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UiPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_location: Option<Option<LocationId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_person: Option<Option<PersonId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_person_type: Option<Option<PersonTypeId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Partial update to the filters section.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FiltersPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_type: Option<Option<PersonTypeId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<LocationId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

/// A partial update to the state tree, built section by section.
///
/// Collection setters always replace the whole collection (arrays are
/// never merged element-wise); section setters merge key-by-key.
#[derive(Clone, Debug, Default)]
pub struct StatePatch {
    sections: Map<String, Value>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn session(self, patch: SessionPatch) -> Self {
        self.insert("session", &patch)
    }

    pub fn connection(self, patch: ConnectionPatch) -> Self {
        self.insert("connection", &patch)
    }

    pub fn ui(self, patch: UiPatch) -> Self {
        self.insert("ui", &patch)
    }

    pub fn filters(self, patch: FiltersPatch) -> Self {
        self.insert("filters", &patch)
    }

    /// Recomputation writes every counter, and the occupancy list is an
    /// array, so the resulting merge carries nothing over from before.
    pub fn stats(self, stats: Stats) -> Self {
        self.insert("stats", &stats)
    }

    pub fn locations(self, records: Vec<LocationRecord>) -> Self {
        self.insert("locations", &records)
    }

    pub fn persons(self, records: Vec<PersonRecord>) -> Self {
        self.insert("persons", &records)
    }

    pub fn person_types(self, records: Vec<PersonTypeRecord>) -> Self {
        self.insert("person_types", &records)
    }

    pub fn attendance(self, events: Vec<AttendanceEvent>) -> Self {
        self.insert("attendance", &events)
    }

    /// Build a patch from a raw JSON object.
    ///
    /// The object must only contain known top-level sections; deeper shape
    /// errors surface when the merged tree fails to deserialize in
    /// [`Store::set_state`](crate::Store::set_state), leaving the tree
    /// untouched.
    pub fn from_value(value: Value) -> crate::error::Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(crate::error::StoreError::Deserialization(format!(
                    "patch must be a JSON object, got {}",
                    other
                )))
            }
        };
        for key in map.keys() {
            if !StateTree::SECTIONS.contains(&key.as_str()) {
                return Err(crate::error::StoreError::Deserialization(format!(
                    "unknown top-level section '{}'",
                    key
                )));
            }
        }
        Ok(Self { sections: map })
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Object(self.sections)
    }

    fn insert(mut self, key: &str, section: &impl Serialize) -> Self {
        let value = serde_json::to_value(section).expect("state sections serialize to plain JSON");
        self.sections.insert(key.to_string(), value);
        self
    }
}
