//! Snapshot acquisition boundary.
//!
//! The engine never inspects metric values itself; it asks a
//! [`SnapshotSource`] for an opaque payload once per sampling tick and
//! archives whatever comes back. Keeping this a trait boundary means tests
//! can substitute a deterministic source without any mocking framework, and
//! the bundled [`StatRegistry`](crate::stats::StatRegistry) is just one
//! implementation among others.

use crate::error::SampleError;

/// One archived sample: an opaque payload plus its capture timestamp.
///
/// Records within a single archive file are written in non-decreasing
/// timestamp order. The record is consumed exactly once by the writer and
/// never retained afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    /// Serialized snapshot payload. Opaque to the engine.
    pub payload: Vec<u8>,
    /// Monotonic capture timestamp in nanoseconds.
    pub timestamp_ns: u64,
}

impl SampleRecord {
    /// Creates a new sample record.
    pub fn new(payload: Vec<u8>, timestamp_ns: u64) -> Self {
        Self {
            payload,
            timestamp_ns,
        }
    }
}

/// A source of metric snapshots.
///
/// Implementations produce one serialized snapshot per call. A failure
/// aborts the current sampling tick but leaves the session open; the next
/// tick calls `snapshot` again.
pub trait SnapshotSource {
    /// Captures and serializes the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError`] if no snapshot can be produced right now.
    fn snapshot(&mut self) -> Result<Vec<u8>, SampleError>;
}

/// A source that returns the same payload on every tick.
///
/// Useful in tests and benchmarks where a fixed record size makes rotation
/// boundaries predictable.
#[derive(Debug, Clone)]
pub struct FixedSnapshot {
    /// The payload returned on every call.
    pub payload: Vec<u8>,
}

impl FixedSnapshot {
    /// Creates a source that always yields `len` zero bytes.
    pub fn zeroes(len: usize) -> Self {
        Self {
            payload: vec![0; len],
        }
    }
}

impl SnapshotSource for FixedSnapshot {
    fn snapshot(&mut self) -> Result<Vec<u8>, SampleError> {
        Ok(self.payload.clone())
    }
}
