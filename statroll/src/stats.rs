//! In-memory statistics registry.
//!
//! A [`StatRegistry`] holds the live numeric values a session samples:
//! counters and gauges declared up front through [`StatDescriptor`]s. It
//! implements [`SnapshotSource`], encoding the current values into the
//! binary snapshot payload the archive writer frames.
//!
//! The registry is one convenient snapshot source, not the only one; the
//! engine works with any [`SnapshotSource`] implementation.
//!
//! # Snapshot Encoding
//!
//! ```text
//! [0..4)   Statistic count (u32 LE)
//! [4..)    One i64 LE value per statistic, in registration order
//! ```
//!
//! # Example
//!
//! ```rust
//! use statroll::{StatDescriptor, StatRegistry};
//!
//! let mut stats = StatRegistry::new();
//! let requests = stats.register(StatDescriptor::counter(
//!     "requests",
//!     "handled requests",
//!     "count",
//! ));
//! let queue = stats.register(StatDescriptor::gauge(
//!     "queue_depth",
//!     "requests waiting",
//!     "count",
//! ));
//!
//! stats.inc(requests, 1);
//! stats.set(queue, 17);
//! assert_eq!(stats.get(requests), 1);
//! ```

use crate::error::SampleError;
use crate::sampler::SnapshotSource;

/// Kind of a registered statistic.
///
/// The kind is descriptive metadata for consumers of the archive; the
/// registry itself stores every statistic as a plain `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// A monotonically adjusted running total.
    Counter,
    /// A point-in-time level.
    Gauge,
}

/// Declaration of a single statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatDescriptor {
    /// Statistic name, unique within a registry by convention.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Unit label, e.g. `"bytes"` or `"count"`.
    pub unit: String,
    /// Counter or gauge.
    pub kind: StatKind,
}

impl StatDescriptor {
    /// Declares a counter statistic.
    pub fn counter(name: &str, description: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            unit: unit.to_string(),
            kind: StatKind::Counter,
        }
    }

    /// Declares a gauge statistic.
    pub fn gauge(name: &str, description: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            unit: unit.to_string(),
            kind: StatKind::Gauge,
        }
    }
}

/// Opaque handle to a registered statistic.
///
/// Obtained from [`StatRegistry::register`] and only valid for the registry
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatId(usize);

/// Registry of live statistic values.
#[derive(Debug, Default)]
pub struct StatRegistry {
    descriptors: Vec<StatDescriptor>,
    values: Vec<i64>,
}

impl StatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a statistic and returns its handle.
    ///
    /// Values start at zero.
    pub fn register(&mut self, descriptor: StatDescriptor) -> StatId {
        let id = StatId(self.descriptors.len());
        self.descriptors.push(descriptor);
        self.values.push(0);
        id
    }

    /// Adds `delta` to a statistic's value.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    pub fn inc(&mut self, id: StatId, delta: i64) {
        self.values[id.0] += delta;
    }

    /// Overwrites a statistic's value.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    pub fn set(&mut self, id: StatId, value: i64) {
        self.values[id.0] = value;
    }

    /// Returns a statistic's current value.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    pub fn get(&self, id: StatId) -> i64 {
        self.values[id.0]
    }

    /// Returns the registered descriptors in registration order.
    pub fn descriptors(&self) -> &[StatDescriptor] {
        &self.descriptors
    }

    /// Number of registered statistics.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Encodes the current values as a snapshot payload.
    #[allow(clippy::cast_possible_truncation)] // registries never hold u32::MAX stats
    pub fn encode_snapshot(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(4 + self.values.len() * 8);
        payload.extend_from_slice(&(self.values.len() as u32).to_le_bytes());
        for value in &self.values {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        payload
    }
}

impl SnapshotSource for StatRegistry {
    fn snapshot(&mut self) -> Result<Vec<u8>, SampleError> {
        Ok(self.encode_snapshot())
    }
}
