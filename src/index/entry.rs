//! Stored index entries
//!
//! One entry per index value, holding every record id that maps to it.
//! Ids are kept sorted ascending so lookups are deterministic.

use serde::{Deserialize, Serialize};

use crate::model::RecordId;

/// Sorted set of ids sharing an index value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexEntry {
    ids: Vec<RecordId>,
}

impl IndexEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert maintaining sorted order; returns false if already present
    pub fn insert(&mut self, id: RecordId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.ids.insert(pos, id);
                true
            }
        }
    }

    /// Remove an id; returns false if it was not present
    pub fn remove(&mut self, id: RecordId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<RecordId> {
        self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
