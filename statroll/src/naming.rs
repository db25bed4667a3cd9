//! Archive naming scheme.
//!
//! Maps a base archive path plus a (run, file sequence) pair to a concrete
//! file name, and back. The pattern inserts `-RR-SS` between the base path's
//! stem and its extension, both 1-based and zero-padded to at least two
//! digits: `stats.sra` with run 1, sequence 2 becomes `stats-01-02.sra`.
//!
//! Within one run the sequence strictly increases, and run numbers strictly
//! increase across session initializations sharing the same base path, so no
//! two live archive files can ever resolve to the same name.
//!
//! Everything in this module is a pure function over paths except
//! [`next_run_number`], which scans the base path's directory to find the
//! highest run already present on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArchiveIoError, Result};

/// Builds the archive file path for a given run and file sequence.
///
/// # Examples
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use statroll::naming::archive_path;
///
/// let path = archive_path(Path::new("/var/stats/app.sra"), 1, 2);
/// assert_eq!(path, PathBuf::from("/var/stats/app-01-02.sra"));
/// ```
pub fn archive_path(base: &Path, run: u32, seq: u32) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut path = base.with_file_name(format!("{stem}-{run:02}-{seq:02}"));
    if let Some(ext) = base.extension() {
        path.set_extension(ext);
    }
    path
}

/// Parses the (run, file sequence) pair out of a candidate archive path.
///
/// Returns `None` when the candidate does not follow the naming scheme for
/// the given base path: different extension, different stem prefix, or a
/// malformed `-RR-SS` suffix.
pub fn parse_archive_name(base: &Path, candidate: &Path) -> Option<(u32, u32)> {
    if candidate.extension() != base.extension() {
        return None;
    }

    let base_stem = base.file_stem()?.to_str()?;
    let candidate_stem = candidate.file_stem()?.to_str()?;

    let suffix = candidate_stem.strip_prefix(base_stem)?.strip_prefix('-')?;
    let (run, seq) = suffix.split_once('-')?;

    if run.is_empty() || seq.is_empty() {
        return None;
    }
    if !run.bytes().all(|b| b.is_ascii_digit()) || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some((run.parse().ok()?, seq.parse().ok()?))
}

/// Determines the run number for a new session over `base`.
///
/// Scans the base path's parent directory for files following the naming
/// scheme and returns one more than the highest run found, or 1 when the
/// directory is empty or does not exist yet. The directory contents are the
/// sole source of truth; no manifest is consulted.
///
/// # Errors
///
/// Returns [`ArchiveIoError::Scan`] if the directory cannot be read.
pub fn next_run_number(base: &Path) -> Result<u32> {
    let dir = match base.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !dir.exists() {
        return Ok(1);
    }

    let entries = fs::read_dir(dir).map_err(|e| ArchiveIoError::Scan {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut max_run = 0;
    for entry in entries {
        let entry = entry.map_err(|e| ArchiveIoError::Scan {
            path: dir.display().to_string(),
            source: e,
        })?;

        if let Some((run, _)) = parse_archive_name(base, &entry.path()) {
            max_run = max_run.max(run);
        }
    }

    Ok(max_run + 1)
}
