//! Core record types shared across the state tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a location record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationId(pub u64);

impl fmt::Debug for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationId({})", self.0)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a person record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

impl fmt::Debug for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonId({})", self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a person-type record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonTypeId(pub u64);

impl fmt::Debug for PersonTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonTypeId({})", self.0)
    }
}

/// Unique identifier for an attendance event.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an attendance event was recorded by hand or by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    Automatic,
    Manual,
}

impl Default for ActionOrigin {
    fn default() -> Self {
        ActionOrigin::Manual
    }
}

impl ActionOrigin {
    /// Sort rank for grouped views: automatic entries order before manual.
    pub(crate) fn sort_rank(self) -> u8 {
        match self {
            ActionOrigin::Automatic => 0,
            ActionOrigin::Manual => 1,
        }
    }
}

/// A physical location where attendance is tracked.
///
/// `parent` links locations into a hierarchy; a reference that does not
/// resolve within the same collection is treated as absent (the record
/// becomes a root when the hierarchy is built).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: LocationId,

    pub name: String,

    /// Short code, unique within the collection.
    pub code: String,

    /// Optional parent location.
    #[serde(default)]
    pub parent: Option<LocationId>,

    /// Maximum capacity, if enforced.
    #[serde(default)]
    pub capacity: Option<u32>,

    /// Number of people currently checked in here.
    #[serde(default)]
    pub occupancy: u32,

    #[serde(default)]
    pub building: Option<String>,

    #[serde(default)]
    pub floor: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

/// A tracked person.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: PersonId,

    pub name: String,

    /// Badge/identifier code, unique within the collection.
    pub code: String,

    #[serde(default)]
    pub person_type: Option<PersonTypeId>,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Whether the person currently has an open attendance event.
    #[serde(default)]
    pub checked_in: bool,

    #[serde(default)]
    pub current_location: Option<LocationId>,
}

/// A category of persons (employee, visitor, contractor, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonTypeRecord {
    pub id: PersonTypeId,
    pub name: String,
    pub code: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A single check-in, possibly still open.
///
/// An absent `check_out` means the event is currently open. The backend
/// guarantees check-out is after check-in and at most one open event per
/// person; this crate does not re-validate either.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: EventId,

    /// Owning person. Optional because some device feeds emit events
    /// before the person record is provisioned.
    #[serde(default)]
    pub person: Option<PersonId>,

    pub person_name: String,

    #[serde(default)]
    pub location: Option<LocationId>,

    pub location_name: String,

    pub check_in: DateTime<Utc>,

    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,

    #[serde(default)]
    pub worked_hours: Option<f64>,

    #[serde(default)]
    pub origin: ActionOrigin,
}

impl AttendanceEvent {
    /// An event with no check-out is still open.
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_origin_sort_rank() {
        assert!(ActionOrigin::Automatic.sort_rank() < ActionOrigin::Manual.sort_rank());
    }

    #[test]
    fn test_event_open() {
        let mut event = AttendanceEvent {
            id: EventId(1),
            person: Some(PersonId(7)),
            person_name: "Alice".into(),
            location: Some(LocationId(3)),
            location_name: "Lab".into(),
            check_in: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            check_out: None,
            worked_hours: None,
            origin: ActionOrigin::Automatic,
        };
        assert!(event.is_open());

        event.check_out = Some(Utc.with_ymd_and_hms(2024, 6, 1, 17, 0, 0).unwrap());
        assert!(!event.is_open());
    }

    #[test]
    fn test_location_defaults_on_sparse_input() {
        // Records coming off the wire often omit optional fields entirely.
        let record: LocationRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Main Building", "code": "MAIN"}"#).unwrap();

        assert_eq!(record.parent, None);
        assert_eq!(record.occupancy, 0);
        assert!(record.active);
    }
}
