use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::{style, Term};
use find_duplicates::progress::HashProgress;
use find_duplicates::report::write_report_to_stdout;
use find_duplicates::utils::{calculate_percentage, format_duration};
use find_duplicates::{
    logging, write_report, DedupAnalysis, ReportFormat, ScanConfig, ScanStats, Scanner,
    DEFAULT_CHUNK_SIZE,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// One row per duplicate file
    Csv,
    /// One object per duplicate group
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "find-dups",
    version,
    about = "Find byte-identical files under a directory and report them grouped by content",
    long_about = "Recursively scan a directory, pre-filter files by size, hash the remaining candidates with BLAKE3 in parallel and write every group of identical files to a report."
)]
struct Cli {
    /// Root directory to scan recursively
    #[arg(value_name = "WORKDIR")]
    workdir: PathBuf,

    /// Report output path
    #[arg(long, value_name = "PATH", default_value = "duplicates.csv")]
    out: PathBuf,

    /// Write the report to stdout instead of a file
    #[arg(long, conflicts_with = "out")]
    stdout: bool,

    /// Report format (inferred from the --out extension when omitted)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Number of hashing workers (default: max(8, 5 x CPU cores))
    #[arg(long, env = "FIND_DUPS_WORKERS")]
    workers: Option<usize>,

    /// Read size in bytes used while hashing
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Minimum file size in bytes to consider
    #[arg(long, default_value = "0")]
    min_size: u64,

    /// Maximum file size in bytes to consider
    #[arg(long)]
    max_size: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors; hide progress and the printed summary
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig {
            chunk_size: self.chunk_size,
            min_size: self.min_size,
            max_size: self.max_size,
            ..Default::default()
        };
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config
    }

    /// Whether the banner, summary and analysis go to stdout.
    fn prints_summary(&self) -> bool {
        !self.quiet && !self.stdout
    }

    fn report_format(&self) -> ReportFormat {
        self.format
            .map(ReportFormat::from)
            .unwrap_or_else(|| ReportFormat::from_path(&self.out))
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    logging::init_logging(args.verbose, args.quiet);

    let chatty = args.prints_summary();
    let show_progress = chatty && Term::stderr().is_term();
    let progress = Arc::new(if show_progress {
        HashProgress::new(0)
    } else {
        HashProgress::hidden()
    });

    let scanner = Scanner::new(args.scan_config()).with_observer(progress.clone());

    if chatty {
        println!("{}", style("Scanning for duplicate files...").cyan().bold());
    }

    let outcome = scanner
        .scan(&args.workdir)
        .with_context(|| format!("Failed to scan {}", args.workdir.display()))?;
    progress.finish();

    let format = args.report_format();
    if args.stdout {
        write_report_to_stdout(&outcome.groups, format).context("Failed to write report")?;
        return Ok(());
    }

    if chatty {
        print_stats(&outcome.stats);
    }

    if outcome.groups.is_empty() {
        if chatty {
            println!("{}", style("No duplicate files found!").green().bold());
        }
        return Ok(());
    }

    if chatty {
        DedupAnalysis::from_groups(&outcome.groups).print_analysis();
    }

    let rows = write_report(&outcome.groups, &args.out, format)
        .with_context(|| format!("Failed to write report to {}", args.out.display()))?;

    if chatty {
        println!();
        println!("Written {} rows to {}", rows, args.out.display());
    }

    Ok(())
}

fn print_stats(stats: &ScanStats) {
    println!();
    println!("{}", style("Summary").green().bold());
    println!("{}", style("-".repeat(20)).green());
    println!("Files scanned: {}", stats.files_found);
    println!(
        "Size collisions hashed: {} ({:.1}%)",
        stats.candidates,
        calculate_percentage(stats.candidates as u64, stats.files_found as u64)
    );
    if stats.failed > 0 {
        println!(
            "{}",
            style(format!("Files that could not be read: {}", stats.failed)).yellow()
        );
    }
    println!("Elapsed: {}", format_duration(stats.elapsed));
}
