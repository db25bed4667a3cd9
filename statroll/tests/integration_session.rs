//! Integration tests for session lifecycle and run-number assignment.

use statroll::writer::ArchiveHeader;
use statroll::{FixedSnapshot, SampleCollector, SessionConfig};
use tempfile::tempdir;

fn config(base: std::path::PathBuf) -> SessionConfig {
    SessionConfig {
        archive_path: base,
        file_size_limit: 1024,
        disk_space_limit: 0,
        system_id: 42,
        start_time_ms: 1_700_000_000_000,
    }
}

#[test]
fn test_run_number_increments_across_sessions() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("app.sra");

    // First session over a fresh directory is run 1.
    let collector = SampleCollector::new(FixedSnapshot::zeroes(10));
    collector.initialize(config(base.clone()), 0).unwrap();
    collector.sample(1).unwrap();
    collector.close().unwrap();
    assert!(dir.path().join("app-01-01.sra").exists());

    // Re-initializing the same collector starts run 2.
    collector.initialize(config(base.clone()), 0).unwrap();
    collector.sample(2).unwrap();
    collector.close().unwrap();
    assert_eq!(collector.session_stats().unwrap().run, 2);
    assert!(dir.path().join("app-02-01.sra").exists());

    // A brand-new collector over the same base continues at run 3.
    let fresh = SampleCollector::new(FixedSnapshot::zeroes(10));
    fresh.initialize(config(base), 0).unwrap();
    assert_eq!(fresh.session_stats().unwrap().run, 3);
    assert!(dir.path().join("app-03-01.sra").exists());
}

#[test]
fn test_run_number_derives_from_directory_contents() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("app.sra");

    // Leftovers from an earlier process: run 5 is the highest present.
    std::fs::write(dir.path().join("app-02-01.sra"), b"x").unwrap();
    std::fs::write(dir.path().join("app-05-03.sra"), b"x").unwrap();
    std::fs::write(dir.path().join("unrelated-09-01.sra"), b"x").unwrap();

    let collector = SampleCollector::new(FixedSnapshot::zeroes(10));
    collector.initialize(config(base), 0).unwrap();
    assert_eq!(collector.session_stats().unwrap().run, 6);
    assert!(dir.path().join("app-06-01.sra").exists());
}

#[test]
fn test_separate_bases_do_not_interfere() {
    let dir = tempdir().unwrap();

    let first = SampleCollector::new(FixedSnapshot::zeroes(10));
    first
        .initialize(config(dir.path().join("alpha.sra")), 0)
        .unwrap();

    let second = SampleCollector::new(FixedSnapshot::zeroes(10));
    second
        .initialize(config(dir.path().join("beta.sra")), 0)
        .unwrap();

    assert_eq!(first.session_stats().unwrap().run, 1);
    assert_eq!(second.session_stats().unwrap().run, 1);
    assert!(dir.path().join("alpha-01-01.sra").exists());
    assert!(dir.path().join("beta-01-01.sra").exists());
}

#[test]
fn test_archive_header_embeds_session_identity() {
    let dir = tempdir().unwrap();
    let collector = SampleCollector::new(FixedSnapshot::zeroes(10));
    collector
        .initialize(config(dir.path().join("app.sra")), 0)
        .unwrap();
    collector.sample(1).unwrap();
    collector.close().unwrap();

    let header = ArchiveHeader::read(dir.path().join("app-01-01.sra")).unwrap();
    assert_eq!(header.system_id, 42);
    assert_eq!(header.start_time_ms, 1_700_000_000_000);
}

#[test]
fn test_missing_archive_directory_is_created() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("nested").join("deep").join("app.sra");

    let collector = SampleCollector::new(FixedSnapshot::zeroes(10));
    collector.initialize(config(base), 0).unwrap();
    collector.sample(1).unwrap();

    assert!(dir
        .path()
        .join("nested")
        .join("deep")
        .join("app-01-01.sra")
        .exists());
}

#[test]
fn test_session_stats_track_progress() {
    let dir = tempdir().unwrap();
    let collector = SampleCollector::new(FixedSnapshot::zeroes(10));
    collector
        .initialize(config(dir.path().join("app.sra")), 7)
        .unwrap();

    for tick in 0..5 {
        collector.sample(tick).unwrap();
    }

    let stats = collector.session_stats().unwrap();
    assert_eq!(stats.run, 1);
    assert_eq!(stats.started_at_ns, 7);
    assert_eq!(stats.samples, 5);
    assert_eq!(stats.files_created, 1);
    assert_eq!(stats.files_deleted, 0);
    assert!(!stats.closed);

    collector.close().unwrap();
    let closed = collector.session_stats().unwrap();
    assert!(closed.closed);
    assert_eq!(closed.samples, 5);

    // Final on-disk byte count matches the tracked total.
    let on_disk = std::fs::metadata(dir.path().join("app-01-01.sra"))
        .unwrap()
        .len();
    assert_eq!(closed.bytes_on_disk, on_disk);
}
