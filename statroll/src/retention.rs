//! Disk-space budget enforcement.
//!
//! After every rotation the session asks the retention manager to bring the
//! total on-disk footprint back under the configured budget by deleting the
//! oldest closed archive files. Two rules are absolute:
//!
//! - The Active file is never deleted, even when it alone exceeds the
//!   budget. That overshoot is bounded and accepted.
//! - Committed data is only ever removed oldest-first, so retention never
//!   reorders the archive stream.
//!
//! Deletion failures are recoverable: the entry stays in the ledger, its
//! size stays counted, and the same file becomes a candidate again on the
//! next enforcement pass.

use std::fs;

use crate::ledger::{ArchiveState, RetentionLedger};

/// Summary of one enforcement pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetentionOutcome {
    /// Paths of the files removed from disk, oldest first.
    pub deleted: Vec<std::path::PathBuf>,
    /// Bytes reclaimed by this pass.
    pub bytes_freed: u64,
    /// Number of deletion attempts that failed and will be retried later.
    pub failures: usize,
}

/// Enforces a disk-space budget over a session's ledger.
#[derive(Debug, Clone, Copy)]
pub struct RetentionManager {
    /// Total on-disk budget in bytes. 0 = unlimited, never delete.
    space_limit: u64,
}

impl RetentionManager {
    /// Creates a manager for the given budget.
    ///
    /// A `space_limit` of 0 means unlimited retention: `enforce` becomes a
    /// no-op and every archive file is kept.
    pub fn new(space_limit: u64) -> Self {
        Self { space_limit }
    }

    /// Deletes oldest-first Closed files until the ledger's non-deleted
    /// total fits the budget or no Closed entry remains.
    ///
    /// A failed `remove_file` is logged as a warning and skipped; the entry
    /// remains Closed and counted, and the pass moves on to the next
    /// candidate.
    pub fn enforce(&self, ledger: &mut RetentionLedger) -> RetentionOutcome {
        let mut outcome = RetentionOutcome::default();

        if self.space_limit == 0 {
            return outcome;
        }

        let mut total = ledger.total_size();

        for entry in ledger.entries_mut() {
            if total <= self.space_limit {
                break;
            }
            if entry.state != ArchiveState::Closed {
                continue;
            }

            match fs::remove_file(&entry.path) {
                Ok(()) => {
                    entry.state = ArchiveState::Deleted;
                    total -= entry.size;
                    outcome.bytes_freed += entry.size;
                    outcome.deleted.push(entry.path.clone());
                    tracing::debug!(
                        "evicted archive {} ({} bytes)",
                        entry.path.display(),
                        entry.size
                    );
                }
                Err(e) => {
                    outcome.failures += 1;
                    tracing::warn!(
                        "failed to delete archive {}: {e}; will retry on next pass",
                        entry.path.display()
                    );
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    /// Builds a ledger whose first `closed` entries are Closed files of
    /// `size` bytes on disk, followed by one Active file of `size` bytes.
    fn ledger_on_disk(dir: &Path, closed: u32, size: u64) -> RetentionLedger {
        let mut ledger = RetentionLedger::new();
        for seq in 1..=closed {
            let path = dir.join(format!("a-01-{seq:02}.sra"));
            fs::write(&path, vec![0u8; size as usize]).unwrap();
            ledger.push_active(path, 1, seq, size);
            ledger.close_active(size);
        }
        let active = dir.join(format!("a-01-{:02}.sra", closed + 1));
        fs::write(&active, vec![0u8; size as usize]).unwrap();
        ledger.push_active(active, 1, closed + 1, size);
        ledger
    }

    #[test]
    fn test_zero_limit_keeps_everything() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger_on_disk(dir.path(), 5, 100);

        let outcome = RetentionManager::new(0).enforce(&mut ledger);

        assert!(outcome.deleted.is_empty());
        assert_eq!(ledger.deleted_count(), 0);
        for entry in ledger.entries() {
            assert!(entry.path.exists());
        }
    }

    #[test]
    fn test_evicts_oldest_first_until_under_budget() {
        let dir = tempdir().unwrap();
        // 3 closed + 1 active at 100 bytes each = 400 total.
        let mut ledger = ledger_on_disk(dir.path(), 3, 100);

        let outcome = RetentionManager::new(250).enforce(&mut ledger);

        // Deleting seq 1 and seq 2 brings the total to 200.
        assert_eq!(outcome.deleted.len(), 2);
        assert_eq!(outcome.bytes_freed, 200);
        assert_eq!(outcome.failures, 0);
        assert!(!ledger.entries()[0].path.exists());
        assert!(!ledger.entries()[1].path.exists());
        assert!(ledger.entries()[2].path.exists());
        assert!(ledger.entries()[3].path.exists());
        assert_eq!(ledger.total_size(), 200);
    }

    #[test]
    fn test_active_file_is_never_deleted() {
        let dir = tempdir().unwrap();
        // Only an active file, far over budget.
        let mut ledger = RetentionLedger::new();
        let active = dir.path().join("a-01-01.sra");
        fs::write(&active, vec![0u8; 1000]).unwrap();
        ledger.push_active(active.clone(), 1, 1, 1000);

        let outcome = RetentionManager::new(10).enforce(&mut ledger);

        assert!(outcome.deleted.is_empty());
        assert!(active.exists());
        assert_eq!(ledger.total_size(), 1000);
    }

    #[test]
    fn test_stops_when_only_active_remains() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger_on_disk(dir.path(), 2, 100);

        // Budget below even a single file: all closed entries go, the
        // active file stays as bounded overshoot.
        let outcome = RetentionManager::new(50).enforce(&mut ledger);

        assert_eq!(outcome.deleted.len(), 2);
        assert_eq!(ledger.total_size(), 100);
        assert!(ledger.entries()[2].path.exists());
    }

    #[test]
    fn test_failed_delete_is_counted_and_retried() {
        let dir = tempdir().unwrap();
        let mut ledger = RetentionLedger::new();

        // A closed entry whose backing file is already gone.
        let ghost = PathBuf::from(dir.path().join("a-01-01.sra"));
        ledger.push_active(ghost.clone(), 1, 1, 300);
        ledger.close_active(300);

        let active = dir.path().join("a-01-02.sra");
        fs::write(&active, vec![0u8; 300]).unwrap();
        ledger.push_active(active, 1, 2, 300);

        let outcome = RetentionManager::new(100).enforce(&mut ledger);

        assert_eq!(outcome.failures, 1);
        assert!(outcome.deleted.is_empty());
        // Still Closed, still counted, still a candidate next pass.
        assert_eq!(ledger.entries()[0].state, ArchiveState::Closed);
        assert_eq!(ledger.total_size(), 600);

        let retry = RetentionManager::new(100).enforce(&mut ledger);
        assert_eq!(retry.failures, 1);
    }
}
