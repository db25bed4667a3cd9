//! Archive file format and writer.
//!
//! An archive file is a session/run header followed by a stream of framed
//! sample records, appended in capture order. The writer owns exactly one
//! open file at a time and tracks the file's byte size in memory rather
//! than through filesystem stat calls, so rotation decisions never race
//! with the OS on read-after-write visibility.
//!
//! # File Format
//!
//! ```text
//! [0..4)    Magic bytes "SRLA"
//! [4..8)    Format version (u32 LE)
//! [8..16)   System id (u64 LE)
//! [16..24)  System start time, ms since Unix epoch (u64 LE)
//! [24..32)  Reserved
//! [32..)    Record frames, back to back:
//!             payload length (u32 LE) | capture timestamp ns (u64 LE) | payload
//! ```
//!
//! Size bookkeeping increments only after the write call reports success, so
//! a failed write is never counted as committed. A partially flushed tail is
//! not rolled back in-file; [`scan_records`] tolerates it by stopping at the
//! first short frame.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{ArchiveIoError, Result};
use crate::sampler::SampleRecord;

/// Magic bytes identifying a statroll archive file.
const ARCHIVE_MAGIC: [u8; 4] = *b"SRLA";

/// Current archive format version.
const ARCHIVE_VERSION: u32 = 1;

/// Header size as a buffer length.
const HEADER_SIZE: usize = 32;

/// Frame head size (length prefix + timestamp) as a buffer length.
const FRAME_HEAD_SIZE: usize = 12;

/// Size of the archive header in bytes. Header bytes count toward the
/// tracked file size, and therefore toward the rotation threshold.
pub const HEADER_LEN: u64 = HEADER_SIZE as u64;

/// Fixed per-record framing overhead in bytes (length prefix + timestamp).
pub const FRAME_OVERHEAD: u64 = FRAME_HEAD_SIZE as u64;

/// Appends framed sample records to a single open archive file.
///
/// The writer is created by [`open`](ArchiveWriter::open), which truncates
/// any existing file at the path and writes the session header. From then on
/// [`append`](ArchiveWriter::append) is the only way the file grows.
///
/// # Thread Safety
///
/// The writer performs no internal locking; the owning session serializes
/// access to it.
#[derive(Debug)]
pub struct ArchiveWriter {
    /// Buffered handle to the archive file. `None` once closed.
    file: Option<BufWriter<File>>,
    /// Path of the archive file (for error reporting).
    path: PathBuf,
    /// Tracked byte size: header plus every successfully appended frame.
    size: u64,
    /// Timestamp of the most recently appended record.
    last_timestamp_ns: u64,
}

impl ArchiveWriter {
    /// Creates or truncates the archive file at `path` and writes its header.
    ///
    /// The tracked size starts at the header's byte length.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveIoError::Create`] on permission or I/O failure.
    pub fn open<P: AsRef<Path>>(path: P, system_id: u64, start_time_ms: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = File::create(&path).map_err(|e| ArchiveIoError::Create {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut file = BufWriter::new(file);

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&ARCHIVE_MAGIC);
        header[4..8].copy_from_slice(&ARCHIVE_VERSION.to_le_bytes());
        header[8..16].copy_from_slice(&system_id.to_le_bytes());
        header[16..24].copy_from_slice(&start_time_ms.to_le_bytes());

        file.write_all(&header).map_err(|e| ArchiveIoError::Create {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            file: Some(file),
            path,
            size: HEADER_LEN,
            last_timestamp_ns: 0,
        })
    }

    /// Appends one sample record and returns the number of bytes written.
    ///
    /// The frame is `payload length | timestamp | payload`. A capture
    /// timestamp older than the previous record's is clamped to it, keeping
    /// records within the file non-decreasing in time.
    ///
    /// # Errors
    ///
    /// - [`ArchiveIoError::RecordTooLarge`] if the payload exceeds the u32
    ///   length prefix
    /// - [`ArchiveIoError::Write`] on I/O failure (fatal to the session)
    pub fn append(&mut self, record: &SampleRecord) -> Result<u64> {
        let payload_len =
            u32::try_from(record.payload.len()).map_err(|_| ArchiveIoError::RecordTooLarge {
                len: record.payload.len(),
            })?;

        let Some(file) = self.file.as_mut() else {
            return Err(ArchiveIoError::Write {
                path: self.path.display().to_string(),
                source: std::io::Error::new(ErrorKind::NotConnected, "archive writer is closed"),
            }
            .into());
        };

        let timestamp_ns = record.timestamp_ns.max(self.last_timestamp_ns);

        let mut frame = Vec::with_capacity(FRAME_HEAD_SIZE + record.payload.len());
        frame.extend_from_slice(&payload_len.to_le_bytes());
        frame.extend_from_slice(&timestamp_ns.to_le_bytes());
        frame.extend_from_slice(&record.payload);

        file.write_all(&frame).map_err(|e| ArchiveIoError::Write {
            path: self.path.display().to_string(),
            source: e,
        })?;

        let written = frame.len() as u64;
        self.size += written;
        self.last_timestamp_ns = timestamp_ns;

        Ok(written)
    }

    /// Flushes buffered bytes to the underlying file.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveIoError::Flush`] on I/O failure.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush().map_err(|e| ArchiveIoError::Flush {
                path: self.path.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Flushes, syncs, and releases the file handle. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveIoError::Flush`] if the final flush or sync fails.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };

        file.flush().map_err(|e| ArchiveIoError::Flush {
            path: self.path.display().to_string(),
            source: e,
        })?;
        file.get_ref().sync_all().map_err(|e| ArchiveIoError::Flush {
            path: self.path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Returns the tracked byte size of the archive file.
    ///
    /// This is in-memory bookkeeping, not a filesystem stat call.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` until [`close`](ArchiveWriter::close) is called.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

/// Decoded archive file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Archive format version.
    pub version: u32,
    /// Identifier of the sampled system.
    pub system_id: u64,
    /// System start time in milliseconds since the Unix epoch.
    pub start_time_ms: u64,
}

impl ArchiveHeader {
    /// Reads and validates the header of the archive file at `path`.
    ///
    /// # Errors
    ///
    /// - [`ArchiveIoError::Read`] if the file cannot be read
    /// - [`ArchiveIoError::Corrupt`] on a short header, bad magic, or an
    ///   unsupported version
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| ArchiveIoError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                ArchiveIoError::Corrupt {
                    path: path.display().to_string(),
                    reason: "file is shorter than the archive header".to_string(),
                }
            } else {
                ArchiveIoError::Read {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;

        Self::decode(&header, path)
    }

    /// Decodes and validates a raw header block.
    fn decode(header: &[u8; HEADER_SIZE], path: &Path) -> Result<Self> {
        let magic = [header[0], header[1], header[2], header[3]];
        if magic != ARCHIVE_MAGIC {
            return Err(ArchiveIoError::Corrupt {
                path: path.display().to_string(),
                reason: format!(
                    "invalid magic bytes: expected {ARCHIVE_MAGIC:?}, found {magic:?}"
                ),
            }
            .into());
        }

        let version = read_u32_le(header, 4);
        if version != ARCHIVE_VERSION {
            return Err(ArchiveIoError::Corrupt {
                path: path.display().to_string(),
                reason: format!(
                    "unsupported version: expected {ARCHIVE_VERSION}, found {version}"
                ),
            }
            .into());
        }

        Ok(Self {
            version,
            system_id: read_u64_le(header, 8),
            start_time_ms: read_u64_le(header, 16),
        })
    }
}

/// Reads a little-endian u32 at a fixed offset.
fn read_u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Reads a little-endian u64 at a fixed offset.
fn read_u64_le(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes([
        bytes[at],
        bytes[at + 1],
        bytes[at + 2],
        bytes[at + 3],
        bytes[at + 4],
        bytes[at + 5],
        bytes[at + 6],
        bytes[at + 7],
    ])
}

/// Location and framing metadata of one record inside an archive file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    /// Byte offset of the frame within the file.
    pub offset: u64,
    /// Capture timestamp in nanoseconds.
    pub timestamp_ns: u64,
    /// Payload length in bytes (framing overhead excluded).
    pub payload_len: u32,
}

/// Scans an archive file and lists its complete record frames.
///
/// Scanning stops silently at the first short frame, so a file with a
/// truncated tail (e.g. after an interrupted write) still yields every
/// complete record before it. No repair is attempted.
///
/// # Errors
///
/// - [`ArchiveIoError::Read`] if the file cannot be read
/// - [`ArchiveIoError::Corrupt`] if the header is invalid
pub fn scan_records<P: AsRef<Path>>(path: P) -> Result<Vec<RecordInfo>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ArchiveIoError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    let file_len = file
        .metadata()
        .map_err(|e| ArchiveIoError::Read {
            path: path.display().to_string(),
            source: e,
        })?
        .len();
    let mut reader = BufReader::new(file);

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            ArchiveIoError::Corrupt {
                path: path.display().to_string(),
                reason: "file is shorter than the archive header".to_string(),
            }
        } else {
            ArchiveIoError::Read {
                path: path.display().to_string(),
                source: e,
            }
        }
    })?;
    ArchiveHeader::decode(&header, path)?;

    let mut records = Vec::new();
    let mut offset = HEADER_LEN;

    loop {
        let mut frame_head = [0u8; FRAME_HEAD_SIZE];
        match reader.read_exact(&mut frame_head) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(ArchiveIoError::Read {
                    path: path.display().to_string(),
                    source: e,
                }
                .into());
            }
        }

        let payload_len = read_u32_le(&frame_head, 0);
        let timestamp_ns = read_u64_le(&frame_head, 4);

        let end = offset + FRAME_OVERHEAD + u64::from(payload_len);
        if end > file_len {
            // Truncated trailing frame.
            break;
        }

        reader
            .seek_relative(i64::from(payload_len))
            .map_err(|e| ArchiveIoError::Read {
                path: path.display().to_string(),
                source: e,
            })?;

        records.push(RecordInfo {
            offset,
            timestamp_ns,
            payload_len,
        });
        offset = end;
    }

    Ok(records)
}
