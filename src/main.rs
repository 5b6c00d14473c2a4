//! CLI entry point for `mmsrip`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mmsrip::extract;

#[derive(Parser)]
#[command(
    name = "mmsrip",
    version,
    about = "Extract images and videos from MMS XML backups"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// XML backup file to extract media from
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output directory for extracted media
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a backup and report media statistics without extracting
    Stats {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mmsrip::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Some(Commands::Stats { path, json }) => cmd_stats(&path, json),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => match cli.file {
            Some(file) => {
                let output = cli
                    .output
                    .or_else(|| config.extract.default_output_dir.clone())
                    .unwrap_or_else(|| PathBuf::from("extracted_files"));
                cmd_extract(&file, &output, cli.json)
            }
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &mmsrip::config::Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mmsrip::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mmsrip.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mmsrip", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Extract media from a backup file and print a run summary.
fn cmd_extract(path: &Path, output: &Path, json: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let report = extract::extract_media(path, output, None)?;
    let elapsed = start.elapsed();

    if json {
        print_extract_json(path, output, &report, elapsed)?;
    } else {
        print_extract_table(path, output, &report, elapsed);
    }

    Ok(())
}

/// Scan a backup and report what an extraction would produce.
fn cmd_stats(path: &Path, json: bool) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let file_size = std::fs::metadata(path)?.len();

    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Scanning [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = extract::scan_media(
        path,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    if json {
        print_scan_json(path, file_size, &report, elapsed)?;
    } else {
        print_scan_table(path, file_size, &report, elapsed);
    }

    Ok(())
}

/// Print the extraction summary in a human-readable table.
fn print_extract_table(
    path: &Path,
    output: &Path,
    report: &extract::ExtractReport,
    elapsed: std::time::Duration,
) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<20} {}", "File", path.display());
    println!("  {:<20} {}", "Messages", report.messages_seen);
    println!("  {:<20} {}", "Parts", report.parts_seen);
    println!("  {:<20} {}", "Extracted", report.files_written);
    println!("  {:<20} {}", "Skipped", report.parts_skipped);
    println!(
        "  {:<20} {}",
        "Bytes written",
        format_size(report.bytes_written, BINARY)
    );
    println!("  {:<20} {:.2?}", "Time", elapsed);
    println!("  {:<20} {}", "Output", output.display());

    if !report.contacts.is_empty() {
        println!();
        println!("  Files per contact:");
        for (contact, count) in &report.contacts {
            println!("    {count:>6}  {contact}");
        }
    }
    println!();
}

/// Print the extraction summary as JSON.
fn print_extract_json(
    path: &Path,
    output: &Path,
    report: &extract::ExtractReport,
    elapsed: std::time::Duration,
) -> anyhow::Result<()> {
    let stats = serde_json::json!({
        "file": path.to_string_lossy(),
        "output_dir": output.to_string_lossy(),
        "messages": report.messages_seen,
        "parts": report.parts_seen,
        "extracted": report.files_written,
        "skipped": report.parts_skipped,
        "bytes_written": report.bytes_written,
        "elapsed_ms": elapsed.as_millis(),
        "contacts": &report.contacts,
    });

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Print scan statistics in a human-readable table.
fn print_scan_table(
    path: &Path,
    file_size: u64,
    report: &extract::ScanReport,
    elapsed: std::time::Duration,
) {
    use chrono::{Local, TimeZone};
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<20} {}", "File", path.display());
    println!("  {:<20} {}", "File size", format_size(file_size, BINARY));
    println!("  {:<20} {}", "Messages", report.messages);
    println!("  {:<20} {}", "Parts", report.parts);
    println!("  {:<20} {}", "Eligible media", report.eligible_parts);
    println!(
        "  {:<20} {}",
        "Estimated size",
        format_size(report.estimated_bytes, BINARY)
    );

    if let Some((min, max)) = report.date_range_ms {
        if let (Some(oldest), Some(newest)) = (
            Local.timestamp_millis_opt(min).single(),
            Local.timestamp_millis_opt(max).single(),
        ) {
            println!(
                "  {:<20} {} to {}",
                "Date range",
                oldest.format("%Y-%m-%d"),
                newest.format("%Y-%m-%d")
            );
        }
    }

    println!("  {:<20} {:.2?}", "Scan time", elapsed);

    if !report.contacts.is_empty() {
        println!();
        println!("  Eligible media per contact:");
        for (contact, count) in &report.contacts {
            println!("    {count:>6}  {contact}");
        }
    }
    println!();
}

/// Print scan statistics as JSON.
fn print_scan_json(
    path: &Path,
    file_size: u64,
    report: &extract::ScanReport,
    elapsed: std::time::Duration,
) -> anyhow::Result<()> {
    let date_range = report.date_range_ms.map(|(min, max)| {
        serde_json::json!({
            "oldest_ms": min,
            "newest_ms": max,
        })
    });

    let stats = serde_json::json!({
        "file": path.to_string_lossy(),
        "file_size": file_size,
        "messages": report.messages,
        "parts": report.parts,
        "eligible_parts": report.eligible_parts,
        "estimated_bytes": report.estimated_bytes,
        "date_range": date_range,
        "scan_time_ms": elapsed.as_millis(),
        "contacts": &report.contacts,
    });

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
