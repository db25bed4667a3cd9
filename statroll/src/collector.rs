//! Sample collection and session lifecycle.
//!
//! The [`SampleCollector`] is the component external callers drive: once per
//! sampling tick they call [`sample`](SampleCollector::sample), and the
//! collector coordinates everything else.
//!
//! # Control Flow
//!
//! ```text
//! sample(timestamp)
//!   -> SnapshotSource::snapshot()          capture the payload
//!   -> ArchiveWriter::append()             frame it into the active file
//!   -> size >= file_size_limit?            boundary check AFTER the append
//!        -> close writer, seq + 1, open next archive, ledger push
//!        -> RetentionManager::enforce()    prune oldest closed files
//! ```
//!
//! The boundary check runs strictly after the record is written, so a record
//! is never split across files and a file may exceed the limit by at most
//! one record's framed size.
//!
//! # Sessions and Runs
//!
//! `initialize` starts a session: it assigns a run number one greater than
//! any run already on disk for the same base path and opens the first
//! archive (sequence 1). `close` ends the session; a closed collector can be
//! re-initialized, which starts a fresh run.
//!
//! # Thread Safety
//!
//! `sample`, `close`, and `initialize` each hold a session-wide mutex for
//! their full duration, so an administrative `close` from another thread can
//! never interleave with a half-finished rotation. The guard releases on
//! every exit path.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use statroll::{SampleCollector, SessionConfig, StatDescriptor, StatRegistry};
//!
//! # fn main() -> statroll::Result<()> {
//! let mut stats = StatRegistry::new();
//! let ticks = stats.register(StatDescriptor::counter("ticks", "tick count", "count"));
//!
//! let collector = SampleCollector::new(stats);
//! collector.initialize(
//!     SessionConfig {
//!         archive_path: "/var/stats/app.sra".into(),
//!         file_size_limit: 1024 * 1024,
//!         disk_space_limit: 16 * 1024 * 1024,
//!         system_id: 1,
//!         start_time_ms: 1_700_000_000_000,
//!     },
//!     0,
//! )?;
//!
//! for tick in 0..600u64 {
//!     collector.with_source(|stats| stats.inc(ticks, 1));
//!     collector.sample(tick * 1_000_000_000)?;
//! }
//!
//! collector.close()?;
//! # Ok(())
//! # }
//! ```

use std::fs;

use parking_lot::Mutex;

use crate::config::SessionConfig;
use crate::error::{ArchiveIoError, LifecycleError, Result};
use crate::ledger::{ArchiveEntry, RetentionLedger};
use crate::naming;
use crate::retention::RetentionManager;
use crate::sampler::{SampleRecord, SnapshotSource};
use crate::writer::ArchiveWriter;

/// Observable counters for a session, for tooling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Run number assigned at `initialize`.
    pub run: u32,
    /// Baseline timestamp passed to `initialize`, in nanoseconds.
    pub started_at_ns: u64,
    /// Number of records appended so far.
    pub samples: u64,
    /// Number of archive files created (deleted ones included).
    pub files_created: usize,
    /// Number of archive files evicted by retention.
    pub files_deleted: usize,
    /// Total byte size of the files still on disk.
    pub bytes_on_disk: u64,
    /// `true` once `close` has succeeded.
    pub closed: bool,
}

/// State owned by one initialized sampling session.
struct Session {
    config: SessionConfig,
    run: u32,
    seq: u32,
    started_at_ns: u64,
    samples: u64,
    writer: ArchiveWriter,
    ledger: RetentionLedger,
    closed: bool,
}

impl Session {
    /// Closes the active archive and opens the next one in sequence, then
    /// enforces the disk-space budget.
    fn rotate(&mut self) -> Result<()> {
        self.writer.close()?;
        self.ledger.close_active(self.writer.size());

        self.seq += 1;
        let path = naming::archive_path(&self.config.archive_path, self.run, self.seq);
        self.writer =
            ArchiveWriter::open(&path, self.config.system_id, self.config.start_time_ms)?;
        self.ledger
            .push_active(path, self.run, self.seq, self.writer.size());
        tracing::debug!(
            "rotated to archive {} (run {}, sequence {})",
            self.writer.path().display(),
            self.run,
            self.seq
        );

        RetentionManager::new(self.config.disk_space_limit).enforce(&mut self.ledger);
        Ok(())
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            run: self.run,
            started_at_ns: self.started_at_ns,
            samples: self.samples,
            files_created: self.ledger.len(),
            files_deleted: self.ledger.deleted_count(),
            bytes_on_disk: self.ledger.total_size(),
            closed: self.closed,
        }
    }
}

/// Everything behind the session-wide exclusivity guard.
struct Inner<S> {
    source: S,
    session: Option<Session>,
}

/// Orchestrates snapshot capture, archive writing, rotation, and retention
/// for one sampling session at a time.
pub struct SampleCollector<S: SnapshotSource> {
    inner: Mutex<Inner<S>>,
}

impl<S: SnapshotSource> SampleCollector<S> {
    /// Creates a collector over the given snapshot source.
    ///
    /// The collector starts uninitialized; call
    /// [`initialize`](SampleCollector::initialize) before sampling.
    pub fn new(source: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                source,
                session: None,
            }),
        }
    }

    /// Starts a sampling session.
    ///
    /// Validates the configuration, assigns the next run number for the base
    /// path (one greater than any run already on disk), creates the archive
    /// directory if needed, and opens the first archive file (sequence 1).
    ///
    /// `start_time_ns` is the sampling baseline timestamp, recorded in
    /// [`SessionStats`]; the wall-clock start time embedded in archive
    /// headers comes from [`SessionConfig::start_time_ms`].
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyInitialized`] if a session is open
    /// - [`crate::error::ConfigError`] if the configuration is invalid
    /// - [`ArchiveIoError`] if the directory scan or file creation fails
    pub fn initialize(&self, config: SessionConfig, start_time_ns: u64) -> Result<()> {
        let mut inner = self.inner.lock();

        if let Some(session) = &inner.session
            && !session.closed
        {
            return Err(LifecycleError::AlreadyInitialized.into());
        }

        config.validate()?;

        if let Some(dir) = config.archive_path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| ArchiveIoError::Create {
                path: dir.display().to_string(),
                source: e,
            })?;
        }

        let run = naming::next_run_number(&config.archive_path)?;
        let path = naming::archive_path(&config.archive_path, run, 1);
        let writer = ArchiveWriter::open(&path, config.system_id, config.start_time_ms)?;

        let mut ledger = RetentionLedger::new();
        ledger.push_active(path, run, 1, writer.size());
        tracing::debug!(
            "session initialized: run {run}, archive {}",
            writer.path().display()
        );

        inner.session = Some(Session {
            config,
            run,
            seq: 1,
            started_at_ns: start_time_ns,
            samples: 0,
            writer,
            ledger,
            closed: false,
        });

        Ok(())
    }

    /// Captures one snapshot and archives it, rotating and enforcing the
    /// disk-space budget when the active file has reached its size limit.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError`] if the session is uninitialized or closed
    /// - [`crate::error::SampleError`] if the snapshot source fails; the
    ///   session stays open and the next tick samples again
    /// - [`ArchiveIoError`] if the append or the rotation's file creation
    ///   fails; fatal to the session
    pub fn sample(&self, timestamp_ns: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        let Inner { source, session } = &mut *inner;

        let session = match session {
            Some(s) if !s.closed => s,
            Some(_) => return Err(LifecycleError::Closed.into()),
            None => return Err(LifecycleError::NotInitialized.into()),
        };

        let payload = source.snapshot()?;
        let record = SampleRecord::new(payload, timestamp_ns);

        session.writer.append(&record)?;
        session.samples += 1;
        session.ledger.set_active_size(session.writer.size());

        if session.writer.size() >= session.config.file_size_limit {
            session.rotate()?;
        }

        Ok(())
    }

    /// Flushes and closes the active archive and marks the session closed.
    ///
    /// Further `sample` or `close` calls fail with a [`LifecycleError`]
    /// until the collector is re-initialized.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError`] if the session is uninitialized or already closed
    /// - [`ArchiveIoError::Flush`] if the final flush fails
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        let session = match inner.session.as_mut() {
            Some(s) if !s.closed => s,
            Some(_) => return Err(LifecycleError::Closed.into()),
            None => return Err(LifecycleError::NotInitialized.into()),
        };

        session.writer.close()?;
        session.ledger.close_active(session.writer.size());
        session.closed = true;
        tracing::debug!("session closed: run {}", session.run);

        Ok(())
    }

    /// Runs `f` against the snapshot source under the session guard.
    ///
    /// This is how callers update live statistics between ticks when the
    /// source is a [`StatRegistry`](crate::stats::StatRegistry).
    pub fn with_source<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock().source)
    }

    /// Returns the current session's observable counters.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotInitialized`] if `initialize` has never
    /// succeeded. A closed session still reports its final stats.
    pub fn session_stats(&self) -> Result<SessionStats> {
        let inner = self.inner.lock();
        match inner.session.as_ref() {
            Some(session) => Ok(session.stats()),
            None => Err(LifecycleError::NotInitialized.into()),
        }
    }

    /// Returns a snapshot of the session's ledger, in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotInitialized`] if `initialize` has never
    /// succeeded.
    pub fn archive_files(&self) -> Result<Vec<ArchiveEntry>> {
        let inner = self.inner.lock();
        match inner.session.as_ref() {
            Some(session) => Ok(session.ledger.entries().to_vec()),
            None => Err(LifecycleError::NotInitialized.into()),
        }
    }
}
