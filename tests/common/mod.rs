//! Shared mock record API for integration tests.
#![allow(dead_code)]

use rollcall::{Collection, RecordApi, Result, SearchFilter, StoreError};
use serde_json::{json, Value};
use std::cell::RefCell;

/// In-memory backend serving canned records per collection, with optional
/// per-collection failure injection.
#[derive(Default)]
pub struct MockApi {
    pub locations: Vec<Value>,
    pub persons: Vec<Value>,
    pub person_types: Vec<Value>,
    pub attendance: Vec<Value>,
    /// Collections whose fetches fail.
    pub fail: Vec<Collection>,
    pub created: RefCell<Vec<(Collection, Value)>>,
    pub written: RefCell<Vec<(Collection, Vec<u64>, Value)>>,
}

impl MockApi {
    pub fn with_sample_data() -> Self {
        Self {
            locations: vec![
                json!({"id": 1, "name": "Main Building", "code": "MAIN"}),
                json!({"id": 2, "name": "Lab", "code": "LAB", "parent": 1,
                       "capacity": 10, "occupancy": 2}),
                json!({"id": 3, "name": "Library", "code": "LIB", "parent": 1,
                       "capacity": 40, "occupancy": 10}),
            ],
            persons: vec![
                json!({"id": 1, "name": "Alice", "code": "P001", "person_type": 1,
                       "checked_in": true, "current_location": 2}),
                json!({"id": 2, "name": "Bob", "code": "P002", "person_type": 1}),
            ],
            person_types: vec![json!({"id": 1, "name": "Employee", "code": "EMP"})],
            attendance: vec![
                json!({"id": 1, "person": 1, "person_name": "Alice",
                       "location": 2, "location_name": "Lab",
                       "check_in": "2024-06-01T08:00:00Z", "origin": "automatic"}),
                json!({"id": 2, "person": 1, "person_name": "Alice",
                       "location": 3, "location_name": "Library",
                       "check_in": "2024-06-01T09:00:00Z", "origin": "manual"}),
            ],
            ..Default::default()
        }
    }

    fn records(&self, collection: Collection) -> &[Value] {
        match collection {
            Collection::Locations => &self.locations,
            Collection::Persons => &self.persons,
            Collection::PersonTypes => &self.person_types,
            Collection::Attendance => &self.attendance,
        }
    }

    fn check_failure(&self, collection: Collection) -> Result<()> {
        if self.fail.contains(&collection) {
            Err(StoreError::fetch(collection, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl RecordApi for MockApi {
    fn search(&self, collection: Collection, _filter: &SearchFilter) -> Result<Vec<u64>> {
        self.check_failure(collection)?;
        Ok(self
            .records(collection)
            .iter()
            .filter_map(|r| r["id"].as_u64())
            .collect())
    }

    fn read(&self, collection: Collection, ids: &[u64], _fields: &[&str]) -> Result<Vec<Value>> {
        self.check_failure(collection)?;
        Ok(self
            .records(collection)
            .iter()
            .filter(|r| r["id"].as_u64().is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    fn create(&self, collection: Collection, values: Value) -> Result<u64> {
        self.check_failure(collection)?;
        self.created.borrow_mut().push((collection, values));
        Ok(1000 + self.created.borrow().len() as u64)
    }

    fn write(&self, collection: Collection, ids: &[u64], values: Value) -> Result<bool> {
        self.check_failure(collection)?;
        self.written
            .borrow_mut()
            .push((collection, ids.to_vec(), values));
        Ok(true)
    }
}
