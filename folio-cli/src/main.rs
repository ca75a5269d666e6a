use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{Summary, format_currency};
use folio_scan::selector::{candidate_files, evaluate};
use folio_scan::{DefaultExtractor, FileOutcome, ScanConfig, ScanReport, scan_folder};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FOLIO_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    long_version = LONG_VERSION,
    about = "Consolidated holdings from brokerage statements"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan every broker folder and print the portfolio summary
    Scan {
        /// Use <dir>/fidelity, <dir>/schwab, <dir>/morgan_stanley instead of the configured folders
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Number of holdings listed in text output (default: 10)
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show which statements would be loaded from each folder
    Select {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Manage ~/.folio/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config and create the broker folders
    Init,
    /// Print the effective config
    Show,
}

/// JSON shape of `folio scan --json`
#[derive(Serialize)]
struct ScanOutput<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    file_count: usize,
    files: &'a [FileOutcome],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.log.level);

    match cli.command {
        Command::Scan { data_dir, json, limit } => {
            let scan_cfg = cfg.scan_for(data_dir.as_deref());
            let report = scan_concurrently(&scan_cfg).await?;
            let summary = report.summary();
            if json {
                let out = ScanOutput {
                    summary: &summary,
                    file_count: report.file_count,
                    files: &report.files,
                };
                println!("{}", serde_json::to_string_pretty(&out).context("serialize summary")?);
            } else {
                print_summary(&report, &summary, limit);
            }
        }

        Command::Select { data_dir } => {
            print_selection(&cfg.scan_for(data_dir.as_deref()))?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

/// One blocking task per broker folder; reports are merged back in
/// configuration order so the output does not depend on scheduling.
async fn scan_concurrently(cfg: &ScanConfig) -> Result<ScanReport> {
    debug!(folders = cfg.folders.len(), "scanning broker folders");
    let mut handles = Vec::with_capacity(cfg.folders.len());
    for folder in cfg.folders.iter().cloned() {
        let opts = cfg.parse_options(folder.institution);
        handles.push(tokio::task::spawn_blocking(move || {
            scan_folder(&folder, &opts, &DefaultExtractor)
        }));
    }

    let mut report = ScanReport::default();
    for handle in handles {
        report.merge(handle.await.context("scan task failed")??);
    }
    Ok(report)
}

fn print_summary(report: &ScanReport, summary: &Summary, limit: usize) {
    let loaded = report.files.iter().filter(|f| !f.is_error()).count();
    println!(
        "Scanned {} files ({} statements loaded, {} errors)\n",
        report.file_count,
        loaded,
        report.errors().count()
    );

    println!("Total value:  {}", format_currency(summary.total_value));
    println!("Total cost:   {}", format_currency(summary.total_cost));
    println!(
        "Gain/loss:    {} ({:.2}%)",
        format_currency(summary.total_gain),
        summary.total_gain_pct
    );
    println!("Positions:    {}", summary.num_positions);

    println!("\nAccounts");
    for (name, value) in summary.accounts.entries() {
        println!("  {:<32} {:>16}", name, format_currency(*value));
    }

    println!("\nAllocation");
    for (name, value) in summary.allocation.entries() {
        let pct = if summary.total_value > 0.0 {
            value / summary.total_value * 100.0
        } else {
            0.0
        };
        println!("  {:<32} {:>16} {:>6.1}%", name, format_currency(*value), pct);
    }

    if !summary.holdings.is_empty() {
        println!("\nTop holdings");
        for h in summary.holdings.iter().take(limit) {
            println!(
                "  {:<8} {:<32} {:>16}  {}",
                h.symbol,
                h.description,
                format_currency(h.market_value),
                h.account
            );
        }
    }

    let errors: Vec<&FileOutcome> = report.errors().collect();
    if !errors.is_empty() {
        println!("\nErrors");
        for f in errors {
            println!(
                "  [{}] {}: {}",
                f.institution,
                f.file,
                f.error.as_deref().unwrap_or_default()
            );
        }
    }
}

fn print_selection(cfg: &ScanConfig) -> Result<()> {
    for folder in &cfg.folders {
        println!("[{}] {}", folder.institution, folder.path.display());
        if !folder.path.is_dir() {
            println!("  (missing)");
            continue;
        }
        for c in evaluate(&candidate_files(&folder.path)?) {
            println!(
                "  {} {}  {:<12} {}",
                if c.kept { "load" } else { "skip" },
                c.key.date,
                c.key.account,
                c.file
            );
        }
    }
    Ok(())
}
