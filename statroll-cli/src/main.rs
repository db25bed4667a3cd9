//! CLI for the statroll rolling statistics archive engine.
//!
//! Provides commands for driving a sampling session and for inspecting the
//! archive files it leaves behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};

use statroll::writer::{ArchiveHeader, scan_records};
use statroll::{SampleCollector, SessionConfig, StatDescriptor, StatRegistry, naming};

/// statroll — rolling statistics archive engine CLI.
#[derive(Parser)]
#[command(name = "statroll", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Drive a sampling session and archive demo statistics.
    Run {
        /// Base archive path, e.g. ./stats.sra (ignored with --config).
        base: Option<PathBuf>,

        /// Load the session configuration from a JSON file instead of flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rotation threshold for a single archive file, in bytes.
        #[arg(long, default_value = "1048576")]
        file_size_limit: u64,

        /// Total on-disk budget in bytes (0 = unlimited retention).
        #[arg(long, default_value = "0")]
        disk_space_limit: u64,

        /// Number of sampling ticks to perform.
        #[arg(long, default_value = "60")]
        samples: u64,

        /// Delay between ticks in milliseconds (0 = tick as fast as possible).
        #[arg(long, default_value = "0")]
        interval_ms: u64,
    },

    /// List the archive files recorded for a base path.
    Info {
        /// Base archive path whose directory is scanned.
        base: PathBuf,

        /// Output format.
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Dump the header and record frames of a single archive file.
    Inspect {
        /// Path to an archive file.
        file: PathBuf,
    },
}

/// Output format for the info command.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable table.
    Text,
    /// JSON array of file entries.
    Json,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            base,
            config,
            file_size_limit,
            disk_space_limit,
            samples,
            interval_ms,
        } => cmd_run(
            base.as_deref(),
            config.as_deref(),
            file_size_limit,
            disk_space_limit,
            samples,
            interval_ms,
        ),
        Commands::Info { base, format } => cmd_info(&base, &format),
        Commands::Inspect { file } => cmd_inspect(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Implements `statroll run`.
fn cmd_run(
    base: Option<&Path>,
    config_path: Option<&Path>,
    file_size_limit: u64,
    disk_space_limit: u64,
    samples: u64,
    interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match (config_path, base) {
        (Some(path), _) => SessionConfig::load(path)?,
        (None, Some(base)) => SessionConfig {
            archive_path: base.to_path_buf(),
            file_size_limit,
            disk_space_limit,
            system_id: std::process::id().into(),
            start_time_ms: unix_time_ms(),
        },
        (None, None) => return Err("either a base path or --config is required".into()),
    };

    let mut stats = StatRegistry::new();
    let ticks = stats.register(StatDescriptor::counter("ticks", "sampling ticks", "count"));
    let uptime = stats.register(StatDescriptor::gauge(
        "uptime_ms",
        "elapsed session time",
        "milliseconds",
    ));

    let collector = SampleCollector::new(stats);
    let started = Instant::now();
    collector.initialize(config, 0)?;

    for _ in 0..samples {
        collector.with_source(|stats| {
            stats.inc(ticks, 1);
            stats.set(uptime, i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX));
        });
        collector.sample(u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX))?;

        if interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    collector.close()?;

    let session = collector.session_stats()?;
    println!("Run:            {:02}", session.run);
    println!("Samples:        {}", session.samples);
    println!("Files created:  {}", session.files_created);
    println!("Files deleted:  {}", session.files_deleted);
    println!("Bytes on disk:  {}", session.bytes_on_disk);
    println!();
    for entry in collector.archive_files()? {
        println!(
            "  {}  seq {:02}  {} bytes  {:?}",
            entry.path.display(),
            entry.seq,
            entry.size,
            entry.state
        );
    }

    Ok(())
}

/// Implements `statroll info <base>`.
fn cmd_info(base: &Path, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match base.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if let Some((run, seq)) = naming::parse_archive_name(base, &path) {
            let size = std::fs::metadata(&path)?.len();
            files.push((run, seq, path, size));
        }
    }
    files.sort_by_key(|(run, seq, _, _)| (*run, *seq));

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = files
                .iter()
                .map(|(run, seq, path, size)| {
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "run": run,
                        "seq": seq,
                        "size": size,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if files.is_empty() {
                println!("No archive files for '{}'", base.display());
                return Ok(());
            }

            println!("Archives for {}", base.display());
            let mut current_run = None;
            let mut total = 0u64;
            for (run, seq, path, size) in &files {
                if current_run != Some(*run) {
                    println!("  Run {run:02}:");
                    current_run = Some(*run);
                }
                println!("    seq {seq:02}  {size:>10} bytes  {}", path.display());
                total += size;
            }
            println!();
            println!("  {} file(s), {total} bytes total", files.len());
        }
    }

    Ok(())
}

/// Implements `statroll inspect <file>`.
fn cmd_inspect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let header = ArchiveHeader::read(file)?;
    let records = scan_records(file)?;

    println!("Archive: {}", file.display());
    println!("  Format version:  {}", header.version);
    println!("  System id:       {}", header.system_id);
    println!("  Start time (ms): {}", header.start_time_ms);
    println!("  Records:         {}", records.len());
    println!();

    for record in &records {
        println!(
            "  offset {:>8}  timestamp {:>20} ns  payload {:>6} bytes",
            record.offset, record.timestamp_ns, record.payload_len
        );
    }

    Ok(())
}

/// Milliseconds since the Unix epoch.
fn unix_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
