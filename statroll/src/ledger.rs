//! Session file ledger.
//!
//! The ledger is the insertion-ordered record of every archive file created
//! during the current session. Retention enforcement walks it oldest-first;
//! insertion order therefore doubles as eviction order.
//!
//! # Invariants
//!
//! - At most one entry is [`Active`](ArchiveState::Active) at any time, and
//!   it is always the most recently inserted non-deleted entry.
//! - Entries never leave the ledger; eviction flips their state to
//!   [`Deleted`](ArchiveState::Deleted), which removes them from totals and
//!   from eviction candidacy but keeps the session history observable.

use std::path::PathBuf;

/// Lifecycle state of an archive file within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    /// The file is currently being appended to. Never a deletion candidate.
    Active,
    /// The file was rotated out and is eligible for eviction.
    Closed,
    /// The file was removed from disk by retention enforcement.
    Deleted,
}

/// One archive file tracked by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the archive file on disk.
    pub path: PathBuf,
    /// Run number the file belongs to.
    pub run: u32,
    /// File sequence within the run (1-based, strictly increasing).
    pub seq: u32,
    /// Byte size. Live for the Active entry, final for Closed entries.
    pub size: u64,
    /// Current lifecycle state.
    pub state: ArchiveState,
}

/// Insertion-ordered ledger of the session's archive files.
#[derive(Debug, Default)]
pub struct RetentionLedger {
    entries: Vec<ArchiveEntry>,
}

impl RetentionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a newly opened archive file as the Active entry.
    ///
    /// The previous Active entry, if any, must have been closed first.
    pub fn push_active(&mut self, path: PathBuf, run: u32, seq: u32, size: u64) {
        debug_assert!(
            self.active().is_none(),
            "ledger already has an active entry"
        );
        self.entries.push(ArchiveEntry {
            path,
            run,
            seq,
            size,
            state: ArchiveState::Active,
        });
    }

    /// Returns the Active entry, if the session has one.
    pub fn active(&self) -> Option<&ArchiveEntry> {
        self.entries
            .iter()
            .find(|e| e.state == ArchiveState::Active)
    }

    /// Updates the Active entry's tracked size.
    pub fn set_active_size(&mut self, size: u64) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.state == ArchiveState::Active)
        {
            entry.size = size;
        }
    }

    /// Transitions the Active entry to Closed, recording its final size.
    ///
    /// Returns the sequence number of the closed file, or `None` if there
    /// was no Active entry.
    pub fn close_active(&mut self, final_size: u64) -> Option<u32> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.state == ArchiveState::Active)?;
        entry.size = final_size;
        entry.state = ArchiveState::Closed;
        Some(entry.seq)
    }

    /// Total byte size of all non-deleted entries, the Active one included.
    pub fn total_size(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.state != ArchiveState::Deleted)
            .map(|e| e.size)
            .sum()
    }

    /// All entries in insertion (creation) order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Mutable view for retention enforcement.
    pub(crate) fn entries_mut(&mut self) -> &mut [ArchiveEntry] {
        &mut self.entries
    }

    /// Number of files created during the session.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no file has been created yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries evicted by retention enforcement.
    pub fn deleted_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == ArchiveState::Deleted)
            .count()
    }
}
