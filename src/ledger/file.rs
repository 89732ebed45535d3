use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{prepend_capped, update_first, Durability, LedgerStore, MemoryLedger};
use crate::error::LedgerError;
use crate::models::AnalysisRecord;
use crate::{log_debug, log_error, log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Ledger persisted as a pretty JSON array at a shared path.
///
/// Every mutation re-reads the file, applies the change and atomically
/// replaces it (temp file + rename), so readers in other processes see either
/// the old or the new ledger, never a partial one. When the file cannot be
/// read or written the mutation lands in a session-local mirror instead and
/// is reported as [`Durability::SessionOnly`].
///
/// Records changed by a failed write are kept as an unsynced overlay on top
/// of whatever the file holds, until a later write carries them to disk.
pub struct FileLedger {
    path: PathBuf,
    capacity: usize,
    write_guard: Mutex<()>,
    session: MemoryLedger,
    /// Newest first. Each entry is the latest local version of its key.
    unsynced: Mutex<Vec<AnalysisRecord>>,
}

impl FileLedger {
    pub fn new(path: PathBuf, capacity: usize) -> Self {
        let ledger = Self {
            path,
            capacity,
            write_guard: Mutex::new(()),
            session: MemoryLedger::new(capacity),
            unsynced: Mutex::new(Vec::new()),
        };

        match ledger.load() {
            Ok(records) => {
                log_info!(
                    "Ledger opened at {} with {} records",
                    ledger.path.display(),
                    records.len()
                );
                ledger.session.replace(records);
            }
            Err(err) => {
                log_warn!("Ledger unavailable at open, using session storage: {err}");
            }
        }
        ledger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<AnalysisRecord>, LedgerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(LedgerError::io(&self.path, err)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes to a sibling temp file and renames it over the ledger.
    fn persist(&self, records: &[AnalysisRecord]) -> Result<(), LedgerError> {
        let serialized = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| LedgerError::io(parent, err))?;
            }
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ledger.json".into());
        let tmp_path = self
            .path
            .with_file_name(format!("{file_name}.{}.tmp", Uuid::new_v4().simple()));

        let write_result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(serialized.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        })();

        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(LedgerError::io(&self.path, err));
        }
        Ok(())
    }

    fn lock_unsynced(&self) -> MutexGuard<'_, Vec<AnalysisRecord>> {
        match self.unsynced.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Lays unsynced records over `on_disk`: a local version replaces the
    /// record with the same key, the rest are prepended. Entries that now
    /// appear verbatim on disk have been written out and are forgotten.
    fn overlay(&self, mut on_disk: Vec<AnalysisRecord>) -> Vec<AnalysisRecord> {
        let mut unsynced = self.lock_unsynced();
        unsynced.retain(|pending| !on_disk.contains(pending));
        if unsynced.is_empty() {
            return on_disk;
        }

        let mut merged = Vec::with_capacity(on_disk.len() + unsynced.len());
        for pending in unsynced.iter() {
            match on_disk
                .iter_mut()
                .find(|r| r.matches_key(&pending.material_code, &pending.timestamp))
            {
                Some(slot) => *slot = pending.clone(),
                None => merged.push(pending.clone()),
            }
        }
        merged.append(&mut on_disk);
        merged.truncate(self.capacity);
        merged
    }

    /// Records every entry of `after` that is new or changed relative to `before`.
    fn remember_unsynced(&self, before: &[AnalysisRecord], after: &[AnalysisRecord]) {
        let mut unsynced = self.lock_unsynced();
        for record in after.iter().rev().filter(|r| !before.contains(r)) {
            unsynced.retain(|p| !p.matches_key(&record.material_code, &record.timestamp));
            unsynced.insert(0, record.clone());
        }
        unsynced.truncate(self.capacity);
    }

    /// Read-modify-write under the in-process write guard.
    ///
    /// `change` reports whether it modified anything; an unchanged ledger is
    /// not rewritten and yields `None` for the durability.
    fn mutate<T>(
        &self,
        op: &str,
        change: impl FnOnce(&mut Vec<AnalysisRecord>) -> (T, bool),
    ) -> Result<(T, Option<Durability>), LedgerError> {
        let _guard = match self.write_guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let (mut records, loaded) = match self.load() {
            Ok(records) => (self.overlay(records), true),
            Err(err) => {
                log_warn!("Ledger {op}: read failed, applying to session storage: {err}");
                (self.session.all(), false)
            }
        };

        let before = records.clone();
        let (result, changed) = change(&mut records);
        if !changed {
            if loaded {
                self.session.replace(records);
            }
            return Ok((result, None));
        }

        // A ledger we could not read is never overwritten from the mirror.
        let durability = if !loaded {
            Durability::SessionOnly
        } else {
            match self.persist(&records) {
                Ok(()) => Durability::Shared,
                Err(LedgerError::Serialize(err)) => {
                    log_error!("Ledger {op}: could not serialize records: {err}");
                    return Err(LedgerError::Serialize(err));
                }
                Err(err) => {
                    log_warn!("Ledger {op}: write failed, kept in session storage: {err}");
                    Durability::SessionOnly
                }
            }
        };

        if durability.is_shared() {
            self.lock_unsynced().clear();
        } else {
            self.remember_unsynced(&before, &records);
        }
        self.session.replace(records);
        Ok((result, Some(durability)))
    }
}

impl LedgerStore for FileLedger {
    fn insert(&self, record: AnalysisRecord) -> Result<Durability, LedgerError> {
        let capacity = self.capacity;
        let (evicted, durability) = self.mutate("insert", |records| {
            (prepend_capped(records, record, capacity), true)
        })?;
        if evicted > 0 {
            log_debug!("Ledger evicted {evicted} oldest record(s)");
        }
        Ok(durability.unwrap_or(Durability::SessionOnly))
    }

    fn all(&self) -> Vec<AnalysisRecord> {
        match self.load() {
            Ok(records) => {
                let records = self.overlay(records);
                self.session.replace(records.clone());
                records
            }
            Err(err) => {
                log_warn!("Ledger read failed, showing session storage: {err}");
                self.session.all()
            }
        }
    }

    fn update_by_key(
        &self,
        material_code: &str,
        timestamp: &DateTime<Utc>,
        mutator: &mut dyn FnMut(&mut AnalysisRecord),
    ) -> Result<Option<Durability>, LedgerError> {
        let ((), durability) = self.mutate("update", |records| {
            ((), update_first(records, material_code, timestamp, mutator))
        })?;
        Ok(durability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::test_support::record;
    use crate::ledger::DEFAULT_CAPACITY;
    use tempfile::TempDir;

    fn ledger_in(dir: &TempDir) -> FileLedger {
        FileLedger::new(
            dir.path().join("analysis_data").join("analysis_history.json"),
            DEFAULT_CAPACITY,
        )
    }

    #[test]
    fn missing_file_is_empty_ledger() {
        let dir = TempDir::new().unwrap();
        assert!(ledger_in(&dir).all().is_empty());
    }

    #[test]
    fn insert_persists_newest_first() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        assert_eq!(ledger.insert(record("A", 1)).unwrap(), Durability::Shared);
        assert_eq!(ledger.insert(record("B", 2)).unwrap(), Durability::Shared);

        let raw = fs::read_to_string(ledger.path()).unwrap();
        let on_disk: Vec<AnalysisRecord> = serde_json::from_str(&raw).unwrap();
        let codes: Vec<_> = on_disk.iter().map(|r| r.material_code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        for seq in 0..3 {
            ledger.insert(record("A", seq)).unwrap();
        }
        let leftovers: Vec<_> = fs::read_dir(ledger.path().parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn two_handles_share_one_file() {
        let dir = TempDir::new().unwrap();
        let first = ledger_in(&dir);
        let second = ledger_in(&dir);

        first.insert(record("A", 1)).unwrap();
        second.insert(record("B", 2)).unwrap();

        assert_eq!(first.all().len(), 2);
        let key = record("A", 1).timestamp;
        let outcome = second
            .update_by_key("A", &key, &mut |r| r.supplier = "seen".into())
            .unwrap();
        assert_eq!(outcome, Some(Durability::Shared));
        assert_eq!(first.all()[1].supplier, "seen");
    }

    #[test]
    fn update_miss_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        ledger.insert(record("A", 1)).unwrap();
        let before = fs::read_to_string(ledger.path()).unwrap();

        let key = record("A", 9).timestamp;
        assert_eq!(ledger.update_by_key("A", &key, &mut |_| {}).unwrap(), None);
        assert_eq!(fs::read_to_string(ledger.path()).unwrap(), before);
    }

    #[test]
    fn corrupt_file_degrades_to_session_and_is_preserved() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir);
        fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        fs::write(ledger.path(), "[{ half written").unwrap();

        assert_eq!(ledger.insert(record("A", 1)).unwrap(), Durability::SessionOnly);
        assert_eq!(ledger.all().len(), 1);
        assert_eq!(fs::read_to_string(ledger.path()).unwrap(), "[{ half written");
    }

    /// A ledger that reads fine but whose temp file name is too long to create.
    fn readable_but_unwritable(dir: &TempDir) -> PathBuf {
        let path = dir.path().join(format!("{}.json", "l".repeat(225)));
        fs::write(&path, "[]").unwrap();
        path
    }

    #[test]
    fn failed_write_stays_visible_to_session() {
        let dir = TempDir::new().unwrap();
        let path = readable_but_unwritable(&dir);
        let ledger = FileLedger::new(path.clone(), DEFAULT_CAPACITY);

        assert_eq!(ledger.insert(record("A", 1)).unwrap(), Durability::SessionOnly);
        let all = ledger.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].material_code, "A");

        let key = record("A", 1).timestamp;
        let outcome = ledger
            .update_by_key("A", &key, &mut |r| r.supplier = "local".into())
            .unwrap();
        assert_eq!(outcome, Some(Durability::SessionOnly));
        assert_eq!(ledger.all().len(), 1);
        assert_eq!(ledger.all()[0].supplier, "local");

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn unsynced_records_sit_on_top_of_later_disk_contents() {
        let dir = TempDir::new().unwrap();
        let path = readable_but_unwritable(&dir);
        let ledger = FileLedger::new(path.clone(), DEFAULT_CAPACITY);
        ledger.insert(record("LOCAL", 5)).unwrap();

        // Another writer puts a record on disk in the meantime.
        fs::write(&path, serde_json::to_string(&vec![record("SHARED", 1)]).unwrap()).unwrap();

        let codes: Vec<_> = ledger.all().into_iter().map(|r| r.material_code).collect();
        assert_eq!(codes, vec!["LOCAL", "SHARED"]);
    }

    #[test]
    fn unsynced_record_is_dropped_once_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = readable_but_unwritable(&dir);
        let ledger = FileLedger::new(path.clone(), DEFAULT_CAPACITY);
        ledger.insert(record("A", 1)).unwrap();

        fs::write(&path, serde_json::to_string(&vec![record("A", 1)]).unwrap()).unwrap();
        assert_eq!(ledger.all().len(), 1);

        fs::write(&path, "[]").unwrap();
        assert!(ledger.all().is_empty());
    }

    #[test]
    fn unwritable_location_degrades_to_session() {
        let dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so nothing can be created below it.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let ledger = FileLedger::new(blocker.join("ledger.json"), DEFAULT_CAPACITY);

        assert_eq!(ledger.insert(record("A", 1)).unwrap(), Durability::SessionOnly);
        let key = record("A", 1).timestamp;
        assert_eq!(
            ledger.update_by_key("A", &key, &mut |_| {}).unwrap(),
            Some(Durability::SessionOnly)
        );
        assert_eq!(ledger.all().len(), 1);
    }
}
