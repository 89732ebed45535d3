use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{prepend_capped, update_first, Durability, LedgerStore, DEFAULT_CAPACITY};
use crate::error::LedgerError;
use crate::models::AnalysisRecord;

/// Process-local ledger. Never shared, never durable.
pub struct MemoryLedger {
    capacity: usize,
    records: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryLedger {
    pub fn new(capacity: usize) -> Self {
        Self::with_records(capacity, Vec::new())
    }

    pub fn with_records(capacity: usize, mut records: Vec<AnalysisRecord>) -> Self {
        records.truncate(capacity);
        Self {
            capacity,
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the contents wholesale.
    pub fn replace(&self, mut records: Vec<AnalysisRecord>) {
        records.truncate(self.capacity);
        *self.write() = records;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<AnalysisRecord>> {
        match self.records.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<AnalysisRecord>> {
        match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LedgerStore for MemoryLedger {
    fn insert(&self, record: AnalysisRecord) -> Result<Durability, LedgerError> {
        prepend_capped(&mut self.write(), record, self.capacity);
        Ok(Durability::SessionOnly)
    }

    fn all(&self) -> Vec<AnalysisRecord> {
        self.read().clone()
    }

    fn update_by_key(
        &self,
        material_code: &str,
        timestamp: &DateTime<Utc>,
        mutator: &mut dyn FnMut(&mut AnalysisRecord),
    ) -> Result<Option<Durability>, LedgerError> {
        let found = update_first(&mut self.write(), material_code, timestamp, mutator);
        Ok(found.then_some(Durability::SessionOnly))
    }
}
