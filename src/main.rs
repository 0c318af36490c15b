/*!
 * Command-line interface for pkm-manifest
 */

use std::fs;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pkm_manifest::config::{Args, Config};
use pkm_manifest::error::Result;
use pkm_manifest::report::{ReportFormat, Reporter, ScanReport};
use pkm_manifest::scanner::Scanner;
use pkm_manifest::utils::count_files;
use pkm_manifest::writer::XmlWriter;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "pkm-manifest", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    // Create and validate configuration
    let config = Config::from_args(args)?;
    config.validate()?;

    info!(
        root = %config.target_dir.display(),
        output = %config.output_file.display(),
        "packing project"
    );

    let progress = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(count_files(&config.target_dir, &config.filter));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim} {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_prefix("Packing");
        bar
    };

    let scanner = Scanner::new(config.clone(), Arc::new(progress.clone()));
    let writer = XmlWriter::new(config.clone());

    let start_time = Instant::now();

    let root_node = scanner.scan()?;
    writer.write(&root_node)?;

    let duration = start_time.elapsed();
    progress.finish_and_clear();

    let stats = scanner.get_statistics();
    info!(
        files = root_node.file_count(),
        directories = stats.directories_scanned,
        elapsed = ?duration,
        "done"
    );

    if config.quiet {
        return Ok(());
    }

    let report = ScanReport {
        output_file: config.output_file.display().to_string(),
        output_size: fs::metadata(&config.output_file)?.len(),
        duration,
        directories_scanned: stats.directories_scanned,
        files_processed: stats.files_processed,
        total_lines: stats.total_lines,
        total_chars: stats.total_chars,
        truncated_files: stats.truncated_files,
        placeholder_files: stats.binary_files + stats.unreadable_files,
        file_details: stats.file_details,
    };
    Reporter::new(ReportFormat::ConsoleTable).print_report(&report);

    Ok(())
}
