//! Load orchestration over the record API.
//!
//! A full load issues one independent fetch per collection and commits
//! each result into the store as soon as it arrives; collections never
//! wait on each other and are never rolled back. After all collections
//! commit, derived statistics are recomputed once from the current state.

use crate::api::{Collection, RecordApi, SearchFilter};
use crate::error::{Result, StoreError};
use crate::state::{Occupancy, StatePatch, Stats};
use crate::store::Store;
use crate::types::{AttendanceEvent, EventId, LocationId, LocationRecord, PersonId, PersonRecord, PersonTypeRecord};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

const LOCATION_FIELDS: &[&str] = &[
    "id", "name", "code", "parent", "capacity", "occupancy", "building", "floor", "active",
];

const PERSON_FIELDS: &[&str] = &[
    "id", "name", "code", "person_type", "active", "checked_in", "current_location",
];

const PERSON_TYPE_FIELDS: &[&str] = &["id", "name", "code", "active"];

const ATTENDANCE_FIELDS: &[&str] = &[
    "id", "person", "person_name", "location", "location_name", "check_in", "check_out",
    "worked_hours", "origin",
];

/// Thin orchestration over a [`RecordApi`].
pub struct Loader<'a> {
    api: &'a dyn RecordApi,
}

impl<'a> Loader<'a> {
    pub fn new(api: &'a dyn RecordApi) -> Self {
        Self { api }
    }

    /// Fetch every collection and commit each success independently.
    ///
    /// Partial failure: the first fetch error is returned, but state
    /// written by other successful fetches stays committed; the store is
    /// never rolled back. Statistics are only recomputed when every
    /// collection loaded.
    pub fn load_all(&self, store: &mut Store) -> Result<()> {
        let mut first_error = None;

        for collection in Collection::ALL {
            if let Err(e) = self.load_collection(store, collection) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        recompute_stats(store)
    }

    /// Fetch one collection and commit it under its own top-level key.
    ///
    /// Exposed separately so callers control the order results are
    /// applied in; a fetch resolving late still writes when applied.
    pub fn load_collection(&self, store: &mut Store, collection: Collection) -> Result<()> {
        debug!(%collection, "fetching collection");
        let patch = match collection {
            Collection::Locations => {
                let records: Vec<LocationRecord> = self.fetch(collection, LOCATION_FIELDS)?;
                StatePatch::new().locations(records)
            }
            Collection::Persons => {
                let records: Vec<PersonRecord> = self.fetch(collection, PERSON_FIELDS)?;
                StatePatch::new().persons(records)
            }
            Collection::PersonTypes => {
                let records: Vec<PersonTypeRecord> =
                    self.fetch(collection, PERSON_TYPE_FIELDS)?;
                StatePatch::new().person_types(records)
            }
            Collection::Attendance => {
                let events: Vec<AttendanceEvent> = self.fetch(collection, ATTENDANCE_FIELDS)?;
                StatePatch::new().attendance(events)
            }
        };
        store.set_state(patch)
    }

    /// Record a manual check-in for a person at a location.
    ///
    /// Pass-through to the API; the store only observes the new event on
    /// the next load.
    pub fn check_in(
        &self,
        person: PersonId,
        location: LocationId,
        at: DateTime<Utc>,
    ) -> Result<EventId> {
        let id = self.api.create(
            Collection::Attendance,
            json!({
                "person": person.0,
                "location": location.0,
                "check_in": at.to_rfc3339(),
                "origin": "manual",
            }),
        )?;
        Ok(EventId(id))
    }

    /// Close an open attendance event.
    pub fn check_out(&self, event: EventId, at: DateTime<Utc>) -> Result<bool> {
        self.api.write(
            Collection::Attendance,
            &[event.0],
            json!({ "check_out": at.to_rfc3339() }),
        )
    }

    /// Search, read, and decode one collection. Any failure, including a
    /// record that does not decode, counts as a fetch failure for that
    /// collection.
    fn fetch<T: DeserializeOwned>(&self, collection: Collection, fields: &[&str]) -> Result<Vec<T>> {
        let ids = self.api.search(collection, &SearchFilter::all())?;
        let raw = self.api.read(collection, &ids, fields)?;

        raw.into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| StoreError::fetch(collection, format!("bad record: {}", e)))
            })
            .collect()
    }
}

/// Recompute derived statistics from the current state and commit them.
///
/// Counts and one occupancy summary per location, sorted by code so
/// dashboards can join against the location collection. The summary list
/// is rebuilt from scratch, so a location dropped by the backend
/// disappears from it on the next recomputation.
pub fn recompute_stats(store: &mut Store) -> Result<()> {
    let state = store.state();
    let today = Utc::now().date_naive();

    let mut occupancy: Vec<Occupancy> = state
        .locations
        .iter()
        .map(|location| {
            let capacity = location.capacity.unwrap_or(0);
            let percentage = if capacity > 0 {
                ((location.occupancy as f64 / capacity as f64) * 100.0).round() as u32
            } else {
                0
            };
            Occupancy {
                code: location.code.clone(),
                current: location.occupancy,
                capacity,
                percentage,
            }
        })
        .collect();
    occupancy.sort_by(|a, b| a.code.cmp(&b.code));

    let stats = Stats {
        total_persons: state.persons.len() as u64,
        total_locations: state.locations.len() as u64,
        currently_checked_in: state.attendance.iter().filter(|e| e.is_open()).count() as u64,
        today_attendance: state
            .attendance
            .iter()
            .filter(|e| e.check_in.date_naive() == today)
            .count() as u64,
        location_occupancy: occupancy,
    };

    store.set_state(StatePatch::new().stats(stats))
}
