//! Example demonstrating a complete sampling session.
//!
//! This example shows how to:
//! - Register counters and gauges on a StatRegistry
//! - Initialize a sampling session with rotation and retention limits
//! - Drive the collector and watch files rotate and get pruned

use statroll::error::Result;
use statroll::{SampleCollector, SessionConfig, StatDescriptor, StatRegistry};

fn main() -> Result<()> {
    println!("🚀 statroll Session Demo");

    // Register a couple of demo statistics
    let mut stats = StatRegistry::new();
    let requests = stats.register(StatDescriptor::counter(
        "requests",
        "handled requests",
        "count",
    ));
    let queue_depth = stats.register(StatDescriptor::gauge(
        "queue_depth",
        "requests waiting",
        "count",
    ));

    // Tiny limits so rotation and retention are visible quickly:
    // rotate every ~1 KiB, keep at most ~3 KiB on disk.
    let collector = SampleCollector::new(stats);
    collector.initialize(
        SessionConfig {
            archive_path: "./demo_stats.sra".into(),
            file_size_limit: 1024,
            disk_space_limit: 3 * 1024,
            system_id: 1,
            start_time_ms: 1_700_000_000_000,
        },
        0,
    )?;

    println!("\n📈 Sampling 200 ticks...");
    for tick in 0..200u64 {
        collector.with_source(|stats| {
            stats.inc(requests, 3);
            stats.set(queue_depth, i64::try_from(tick % 17).unwrap_or(0));
        });
        collector.sample(tick * 1_000_000_000)?;
    }

    collector.close()?;

    let session = collector.session_stats()?;
    println!("\n📦 Session summary:");
    println!("   run:           {:02}", session.run);
    println!("   samples:       {}", session.samples);
    println!("   files created: {}", session.files_created);
    println!("   files pruned:  {}", session.files_deleted);
    println!("   bytes on disk: {}", session.bytes_on_disk);

    println!("\n🗂  Ledger:");
    for entry in collector.archive_files()? {
        println!(
            "   seq {:02}  {:>6} bytes  {:?}  {}",
            entry.seq,
            entry.size,
            entry.state,
            entry.path.display()
        );
    }

    Ok(())
}
