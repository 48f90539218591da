//! The remote record API boundary.
//!
//! The backend exposes generic CRUD/search over named record collections;
//! this crate only defines the trait and treats any rejected call as a
//! fetch failure. Transport, login, and retries live behind the
//! implementation.

use crate::error::Result;
use serde_json::Value;
use std::fmt;

/// The named record collections the client works with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Locations,
    Persons,
    PersonTypes,
    Attendance,
}

impl Collection {
    /// All collections, in the order a full load fetches them.
    pub const ALL: [Collection; 4] = [
        Collection::PersonTypes,
        Collection::Locations,
        Collection::Persons,
        Collection::Attendance,
    ];

    /// Backend model name for this collection.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Collection::Locations => "attendance.location",
            Collection::Persons => "extended.attendance.person",
            Collection::PersonTypes => "person.type",
            Collection::Attendance => "extended.attendance.record",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Locations => "locations",
            Collection::Persons => "persons",
            Collection::PersonTypes => "person_types",
            Collection::Attendance => "attendance",
        };
        write!(f, "{}", name)
    }
}

/// One `(field, operator, value)` clause of a search filter.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

/// Search criteria: a conjunction of clauses. Empty matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilter {
    clauses: Vec<FilterClause>,
}

impl SearchFilter {
    /// A filter matching every record in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a clause, builder-style.
    pub fn with(mut self, field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        self.clauses.push(FilterClause {
            field: field.into(),
            operator: operator.into(),
            value,
        });
        self
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Generic record API over named collections.
///
/// Implementations translate these calls onto the actual transport. Every
/// error return is treated by the loader as a failed fetch for that
/// collection; already-committed collections are never rolled back.
pub trait RecordApi {
    /// Find ids of records matching the filter.
    fn search(&self, collection: Collection, filter: &SearchFilter) -> Result<Vec<u64>>;

    /// Read the given fields of the given records.
    fn read(&self, collection: Collection, ids: &[u64], fields: &[&str]) -> Result<Vec<Value>>;

    /// Create a record from field values; returns the new id.
    fn create(&self, collection: Collection, values: Value) -> Result<u64>;

    /// Update fields on existing records.
    fn write(&self, collection: Collection, ids: &[u64], values: Value) -> Result<bool>;
}
