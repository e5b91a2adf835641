//! Staff-Harvest main entry point
//!
//! This is the command-line interface for the Staff-Harvest directory extractor.

use anyhow::Context;
use clap::Parser;
use staff_harvest::config::{load_config_with_hash, validate, Config};
use staff_harvest::output::export_csv;
use staff_harvest::{StaffHarvester, StaffMember};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Staff-Harvest: staff directory extractor
///
/// Staff-Harvest pulls names, roles and emails out of organizational staff
/// directories, following numbered or click-through pagination, and writes
/// the result to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "staff-harvest")]
#[command(version)]
#[command(about = "Extracts staff directories into CSV", long_about = None)]
struct Cli {
    /// Staff directory URL(s)
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Follow pagination from each URL
    #[arg(long)]
    paginate: bool,

    /// Maximum number of pages to visit per directory
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Directory for the CSV file
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// CSV file name (default: timestamped)
    #[arg(long, value_name = "FILE")]
    filename: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // API keys may live in a local .env file
    dotenvy::dotenv().ok();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    // Command-line overrides
    if let Some(max_pages) = cli.max_pages {
        config.pagination.max_pages = max_pages;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.output_dir = dir.clone();
    }
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&cli, &config);
        return Ok(());
    }

    handle_harvest(&cli, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("staff_harvest=info,warn"),
            1 => EnvFilter::new("staff_harvest=debug,info"),
            2 => EnvFilter::new("staff_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(cli: &Cli, config: &Config) {
    println!("=== Staff-Harvest Dry Run ===\n");

    println!("Pagination:");
    println!("  Enabled: {}", cli.paginate);
    println!("  Max pages: {}", config.pagination.max_pages);
    println!("  Wait timeout: {}ms", config.pagination.wait_timeout);
    println!("  Content selector: {}", config.pagination.content_selector);
    println!(
        "  Next-page selectors: {}",
        config.pagination.selectors().len()
    );

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Max concurrent fetches: {}", config.fetcher.max_concurrent_fetches);
    println!("  Excluded tags: {}", config.fetcher.excluded_tags.join(", "));

    println!("\nExtractor:");
    println!("  Model: {}", config.extractor.model_name());
    println!("  Endpoint: {}", config.extractor.base_url);
    let key_state = match std::env::var(&config.extractor.api_key_env) {
        Ok(key) if !key.trim().is_empty() => "set",
        _ => "NOT SET",
    };
    println!("  API key ({}): {}", config.extractor.api_key_env, key_state);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_dir);
    match &cli.filename {
        Some(name) => println!("  File: {}", name),
        None => println!("  File prefix: {}", config.output.filename_prefix),
    }

    println!("\nURLs ({}):", cli.urls.len());
    for url in &cli.urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let output = config.output.clone();
    let harvester = match StaffHarvester::from_config(config) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to initialize harvester: {}", e);
            return Err(e.into());
        }
    };

    let staff = if cli.paginate {
        harvest_paginated(&harvester, &cli.urls).await
    } else if let [url] = cli.urls.as_slice() {
        tracing::info!("Extracting staff from: {}", url);
        harvester
            .extract(url)
            .await
            .with_context(|| format!("failed to extract {}", url))?
    } else {
        let report = harvester.extract_many(&cli.urls).await;
        if !report.failures.is_empty() {
            tracing::warn!(
                "{} of {} URL(s) failed",
                report.failures.len(),
                cli.urls.len()
            );
        }
        report.members
    };

    if staff.is_empty() {
        println!("No staff members found.");
        return Ok(());
    }

    println!("\nFound {} staff member(s).\n", staff.len());

    let path = export_csv(&staff, &output, cli.filename.as_deref())
        .context("failed to write CSV output")?;
    println!("Data exported to: {}", path.display());

    let preview = if cli.paginate { 10 } else { 5 };
    print_preview(&staff, preview);

    Ok(())
}

/// Walks each directory in turn; Ctrl-C stops the crawl in progress and keeps what it found
async fn harvest_paginated(harvester: &StaffHarvester, urls: &[String]) -> Vec<StaffMember> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the records gathered so far");
            on_interrupt.cancel();
        }
    });

    let mut staff = Vec::new();
    for url in urls {
        if cancel.is_cancelled() {
            break;
        }
        tracing::info!("Extracting staff with pagination from: {}", url);
        match harvester
            .extract_with_pagination_cancellable(url, None, cancel.clone())
            .await
        {
            Ok(members) => staff.extend(members),
            Err(e) => tracing::error!("Failed to extract {}: {}", url, e),
        }
    }
    staff
}

fn print_preview(staff: &[StaffMember], limit: usize) {
    println!("\nPreview (first {}):", limit.min(staff.len()));
    println!("{}", "-".repeat(50));
    for member in staff.iter().take(limit) {
        println!(
            "  {} | {} | {}",
            member.name,
            member.role.as_deref().unwrap_or("N/A"),
            member.email.as_deref().unwrap_or("N/A")
        );
    }
    if staff.len() > limit {
        println!("  ... and {} more", staff.len() - limit);
    }
}
