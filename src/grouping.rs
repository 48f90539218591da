//! Grouping of attendance events by their owner.
//!
//! Derived on demand from the flat attendance collection, never stored.
//! Only currently-open events (no check-out) contribute entries.

use crate::types::{ActionOrigin, AttendanceEvent, EventId, LocationId, PersonId};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Grouping key: the person id when the event carries one, otherwise the
/// display name.
///
/// Ids order before name-keyed fallback groups so iteration over a mixed
/// set stays deterministic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OwnerKey {
    Person(PersonId),
    Name(String),
}

/// One open location entry inside an owner's group.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenEntry {
    pub event: EventId,
    pub location: Option<LocationId>,
    pub location_name: String,
    pub origin: ActionOrigin,
    pub since: DateTime<Utc>,
}

/// All open entries for one owner.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerGroup {
    pub person: Option<PersonId>,
    pub person_name: String,
    pub entries: Vec<OpenEntry>,
}

/// Group open attendance events by owner, keyed by person id.
///
/// Events without a person id fall back to a name key rather than being
/// dropped. Within each group, entries sort automatic-origin first, then
/// ascending by location name (case-sensitive ordinal), with the event id
/// as final tiebreak. The output is structurally equal for any permutation
/// of the same input, and repeated calls are idempotent.
pub fn group_by_owner(events: &[AttendanceEvent]) -> BTreeMap<OwnerKey, OwnerGroup> {
    let mut groups: BTreeMap<OwnerKey, OwnerGroup> = BTreeMap::new();

    for event in events {
        if !event.is_open() {
            continue;
        }
        let key = match event.person {
            Some(id) => OwnerKey::Person(id),
            None => OwnerKey::Name(event.person_name.clone()),
        };
        let group = groups.entry(key).or_insert_with(|| OwnerGroup {
            person: event.person,
            person_name: event.person_name.clone(),
            entries: Vec::new(),
        });
        group.entries.push(open_entry(event));
    }

    sort_entries(&mut groups);
    groups
}

/// Compatibility mode reproducing the legacy behavior of grouping by
/// display name: two different person ids sharing a name merge into one
/// group. Kept only for parity with the original frontend; prefer
/// [`group_by_owner`].
pub fn group_by_owner_name(events: &[AttendanceEvent]) -> BTreeMap<String, OwnerGroup> {
    let mut groups: BTreeMap<String, OwnerGroup> = BTreeMap::new();

    for event in events {
        if !event.is_open() {
            continue;
        }
        let group = groups
            .entry(event.person_name.clone())
            .or_insert_with(|| OwnerGroup {
                person: event.person,
                person_name: event.person_name.clone(),
                entries: Vec::new(),
            });
        group.entries.push(open_entry(event));
    }

    for group in groups.values_mut() {
        sort_group(group);
    }
    groups
}

fn open_entry(event: &AttendanceEvent) -> OpenEntry {
    OpenEntry {
        event: event.id,
        location: event.location,
        location_name: event.location_name.clone(),
        origin: event.origin,
        since: event.check_in,
    }
}

fn sort_entries(groups: &mut BTreeMap<OwnerKey, OwnerGroup>) {
    for group in groups.values_mut() {
        sort_group(group);
    }
}

fn sort_group(group: &mut OwnerGroup) {
    group.entries.sort_by(|a, b| {
        a.origin
            .sort_rank()
            .cmp(&b.origin.sort_rank())
            .then_with(|| a.location_name.cmp(&b.location_name))
            .then_with(|| a.event.cmp(&b.event))
    });
}
