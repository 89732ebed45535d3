//! The analysis ledger: a capped, newest-first collection of records shared
//! by every session that points at the same file.

mod file;
mod memory;

pub use file::FileLedger;
pub use memory::MemoryLedger;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::LedgerError;
use crate::models::AnalysisRecord;

pub const DEFAULT_CAPACITY: usize = 100;

/// Where a mutation ended up.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Written to the shared ledger; other sessions can see it.
    Shared,
    /// Held only in this session's memory.
    SessionOnly,
}

impl Durability {
    pub fn is_shared(&self) -> bool {
        matches!(self, Durability::Shared)
    }
}

pub trait LedgerStore: Send + Sync {
    /// Prepends `record`, evicting from the tail past capacity.
    fn insert(&self, record: AnalysisRecord) -> Result<Durability, LedgerError>;

    /// Consistent snapshot, newest first.
    fn all(&self) -> Vec<AnalysisRecord>;

    /// Applies `mutator` to the first record addressed by the key.
    /// `Ok(None)` means no record matched and nothing was written.
    fn update_by_key(
        &self,
        material_code: &str,
        timestamp: &DateTime<Utc>,
        mutator: &mut dyn FnMut(&mut AnalysisRecord),
    ) -> Result<Option<Durability>, LedgerError>;
}

/// Returns how many records were evicted.
pub(crate) fn prepend_capped(
    records: &mut Vec<AnalysisRecord>,
    record: AnalysisRecord,
    capacity: usize,
) -> usize {
    records.insert(0, record);
    let evicted = records.len().saturating_sub(capacity);
    records.truncate(capacity);
    evicted
}

pub(crate) fn update_first(
    records: &mut [AnalysisRecord],
    material_code: &str,
    timestamp: &DateTime<Utc>,
    mutator: &mut dyn FnMut(&mut AnalysisRecord),
) -> bool {
    match records
        .iter_mut()
        .find(|record| record.matches_key(material_code, timestamp))
    {
        Some(record) => {
            mutator(record);
            true
        }
        None => false,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;

    #[test]
    fn prepend_keeps_newest_first_and_caps() {
        let mut records = Vec::new();
        for seq in 0..5 {
            prepend_capped(&mut records, record("M", seq), 3);
        }
        let seqs: Vec<_> = records.iter().map(|r| r.timestamp.timestamp() % 60).collect();
        assert_eq!(seqs, vec![4, 3, 2]);
    }

    #[test]
    fn update_first_reports_miss() {
        let mut records = vec![record("A", 1)];
        let missing = record("A", 2).timestamp;
        let mut calls = 0;
        assert!(!update_first(&mut records, "A", &missing, &mut |_| calls += 1));
        assert_eq!(calls, 0);
    }
}
