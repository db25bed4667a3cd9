//! Error types for the statroll archive engine.

use thiserror::Error;

/// The main error type for all statroll operations.
///
/// This enum covers all possible error conditions that can occur during a
/// sampling session, from configuration validation through archive I/O.
#[derive(Error, Debug)]
pub enum StatrollError {
    /// Invalid session configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Operation invoked in the wrong session state.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Archive I/O failure (write path — fatal to the session).
    #[error("archive I/O error: {0}")]
    Archive(#[from] ArchiveIoError),

    /// Snapshot acquisition failure (aborts the current tick).
    #[error("sample error: {0}")]
    Sample(#[from] SampleError),
}

/// Errors that can occur while validating a session configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The archive file-size limit must be greater than zero.
    #[error("archive file size limit must be > 0")]
    ZeroFileSizeLimit,

    /// The base archive path has no file name to derive archive names from.
    #[error("archive path '{path}' has no file name")]
    EmptyArchivePath {
        /// The offending path.
        path: String,
    },

    /// A configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Load {
        /// The configuration file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// The configuration file path.
        path: String,
        /// The underlying JSON parsing error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur when operations are invoked in the wrong state.
///
/// These are programming-usage errors: the caller drove the session through
/// an invalid state transition.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// `sample` or `close` was invoked before `initialize` succeeded.
    #[error("sampling session has not been initialized")]
    NotInitialized,

    /// `initialize` was invoked while a session is still open.
    #[error("sampling session is already initialized")]
    AlreadyInitialized,

    /// `sample` or `close` was invoked after the session was closed.
    #[error("sampling session is closed")]
    Closed,
}

/// Errors that can occur during archive file I/O on the write path.
///
/// All of these are fatal to the session: a broken archive stream cannot be
/// silently patched, so sampling stops and the error is surfaced. Deletion
/// failures during retention enforcement are deliberately NOT represented
/// here — they are recoverable and handled inside
/// [`enforce`](crate::retention::RetentionManager::enforce).
#[derive(Error, Debug)]
pub enum ArchiveIoError {
    /// Failed to create or truncate an archive file.
    #[error("failed to create archive '{path}': {source}")]
    Create {
        /// The archive file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to append a record to the active archive.
    #[error("failed to write archive '{path}': {source}")]
    Write {
        /// The archive file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to flush or sync the active archive.
    #[error("failed to flush archive '{path}': {source}")]
    Flush {
        /// The archive file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to scan the archive directory for existing runs.
    #[error("failed to scan archive directory '{path}': {source}")]
    Scan {
        /// The directory that could not be scanned.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an archive file back (header or record scan).
    #[error("failed to read archive '{path}': {source}")]
    Read {
        /// The archive file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An archive file has an invalid header.
    #[error("archive '{path}' is corrupted: {reason}")]
    Corrupt {
        /// The archive file path.
        path: String,
        /// Description of what was invalid.
        reason: String,
    },

    /// A sample payload exceeds the frame length field.
    #[error("sample payload of {len} bytes exceeds the maximum record size")]
    RecordTooLarge {
        /// The payload length that could not be framed.
        len: usize,
    },
}

/// Errors that can occur while acquiring a snapshot from a
/// [`SnapshotSource`](crate::sampler::SnapshotSource).
///
/// A snapshot failure aborts the current tick but does not close the
/// session; the next `sample` call starts fresh.
#[derive(Error, Debug)]
pub enum SampleError {
    /// The snapshot source could not produce a payload.
    #[error("snapshot unavailable: {reason}")]
    SnapshotUnavailable {
        /// Why the source failed.
        reason: String,
    },
}

/// Type alias for `Result<T, StatrollError>`.
pub type Result<T> = std::result::Result<T, StatrollError>;
