//! Record store abstraction and an in-memory implementation
//!
//! The detector only needs to read the whole pool; the registration
//! workflow additionally inserts new records.

use crate::error::Result;
use crate::record::{CandidateInput, PersonRecord};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Storage for person records.
pub trait RecordStore: Send + Sync {
    /// Every stored record. No ordering contract.
    fn list_all(&self) -> Result<Vec<PersonRecord>>;

    /// Persist `candidate` under a fresh id with the given record code.
    fn insert(&self, candidate: CandidateInput, record_code: String) -> Result<PersonRecord>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn list_all(&self) -> Result<Vec<PersonRecord>> {
        (**self).list_all()
    }

    fn insert(&self, candidate: CandidateInput, record_code: String) -> Result<PersonRecord> {
        (**self).insert(candidate, record_code)
    }
}

/// Thread-safe in-memory store.
///
/// Clones share the same records. Reads take a shared lock, inserts an
/// exclusive one. Listing returns records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Vec<PersonRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records.
    pub fn from_records(records: Vec<PersonRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<PersonRecord> {
        self.inner.read().iter().find(|r| r.id == id).cloned()
    }
}

impl RecordStore for InMemoryStore {
    fn list_all(&self) -> Result<Vec<PersonRecord>> {
        Ok(self.inner.read().clone())
    }

    fn insert(&self, candidate: CandidateInput, record_code: String) -> Result<PersonRecord> {
        let record = PersonRecord::new(
            Uuid::new_v4(),
            record_code,
            candidate.attributes,
            candidate.date_of_birth,
        );
        self.inner.write().push(record.clone());
        Ok(record)
    }
}
