//! # statroll
//!
//! Embedded rolling statistics archive engine.
//!
//! statroll captures periodic snapshots of numeric metric values and streams
//! them into append-only archive files on disk. When the active file reaches
//! a configured size limit the engine rotates to a new file, and after every
//! rotation it prunes the oldest closed files so the session's total on-disk
//! footprint stays within a configured budget.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Append-only archives with length-prefixed record frames
//! - Size-triggered rotation that never splits a record across files
//! - Oldest-first, space-bounded retention that never touches the active file
//! - In-memory size bookkeeping — no stat calls on the sampling hot path
//! - No background threads; sampling is a synchronous call per tick
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statroll::{SampleCollector, SessionConfig, StatDescriptor, StatRegistry};
//!
//! # fn main() -> statroll::Result<()> {
//! let mut stats = StatRegistry::new();
//! let requests = stats.register(StatDescriptor::counter(
//!     "requests",
//!     "handled requests",
//!     "count",
//! ));
//!
//! let collector = SampleCollector::new(stats);
//! collector.initialize(
//!     SessionConfig {
//!         archive_path: "./stats.sra".into(),
//!         file_size_limit: 1024 * 1024,      // rotate at 1 MiB
//!         disk_space_limit: 16 * 1024 * 1024, // keep at most 16 MiB on disk
//!         system_id: 1,
//!         start_time_ms: 1_700_000_000_000,
//!     },
//!     0,
//! )?;
//!
//! // One call per sampling tick, driven by an external scheduler.
//! for tick in 0..60u64 {
//!     collector.with_source(|stats| stats.inc(requests, 1));
//!     collector.sample(tick * 1_000_000_000)?;
//! }
//!
//! collector.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`SampleCollector`] — Orchestrator; one `sample` call per tick drives
//!   capture, append, rotation, and retention
//! - [`SessionConfig`] — Limits and identity for one sampling session
//! - [`SnapshotSource`] — Capability boundary the collector samples from
//! - [`StatRegistry`] — Bundled counter/gauge registry implementing
//!   [`SnapshotSource`]
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`collector`] — Session lifecycle, sampling, rotation
//! - [`config`] — Session configuration
//! - [`writer`] — Archive file format, writer, and record scanning
//! - [`naming`] — Archive naming scheme and run-number discovery
//! - [`ledger`] — Session file ledger
//! - [`retention`] — Disk-space budget enforcement
//! - [`stats`] — In-memory statistics registry
//! - [`sampler`] — Snapshot source trait and sample records
//! - [`error`] — Error types

pub mod collector;
pub mod config;
pub mod error;
pub mod ledger;
pub mod naming;
pub mod retention;
pub mod sampler;
pub mod stats;
pub mod writer;

// Re-export primary API types at crate root for convenience.
pub use collector::{SampleCollector, SessionStats};
pub use config::SessionConfig;
pub use error::{Result, StatrollError};
pub use ledger::{ArchiveEntry, ArchiveState};
pub use retention::{RetentionManager, RetentionOutcome};
pub use sampler::{FixedSnapshot, SampleRecord, SnapshotSource};
pub use stats::{StatDescriptor, StatId, StatKind, StatRegistry};
pub use writer::{ArchiveHeader, ArchiveWriter, RecordInfo};
