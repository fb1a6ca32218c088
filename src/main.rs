//! Journal-Harvest main entry point
//!
//! This is the command-line interface for the Journal-Harvest crawler.

use clap::Parser;
use journal_harvest::config::{load_config_with_hash, validate, Config};
use journal_harvest::crawler::{print_statistics, run_crawl, Stage};
use journal_harvest::storage::CsvSink;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Journal-Harvest: a staged crawler for journal article metrics
///
/// Walks the yearly archive index, every issue, every article and its
/// metrics page, appending one dataset row per article.
#[derive(Parser, Debug)]
#[command(name = "journal-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvests journal article metrics into CSV", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Oldest year to harvest when no config file is given
    #[arg(long, default_value_t = 2009, conflicts_with = "config")]
    lower_year_bound: i32,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Rewrite the dataset header and empty the audit files before crawling
    #[arg(long)]
    fresh: bool,

    /// Show what would be crawled and where output goes, without crawling
    #[arg(long, conflicts_with = "fresh")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
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
        None => {
            let cfg = Config::with_lower_year_bound(cli.lower_year_bound);
            validate(&cfg)?;
            tracing::info!("No configuration file given, using defaults");
            cfg
        }
    };

    let sink = CsvSink::from_config(&config.output, config.crawler.lower_year_bound);

    if cli.dry_run {
        handle_dry_run(&config, &sink);
        return Ok(());
    }

    handle_crawl(config, sink, cli.fresh, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("journal_harvest=info,warn"),
            1 => EnvFilter::new("journal_harvest=debug,info"),
            2 => EnvFilter::new("journal_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the seed URL, settings and output paths
fn handle_dry_run(config: &Config, sink: &CsvSink) {
    println!("=== Journal-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Years: {} down to {}",
        config.crawler.effective_upper_year(),
        config.crawler.lower_year_bound
    );
    println!(
        "  Prefer full-text articles: {}",
        config.crawler.prefer_full_text_articles
    );
    println!(
        "  Request delay: {}s",
        config.crawler.request_delay_seconds
    );
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Aggregation: {:?}", config.crawler.aggregation);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nSeed URL:");
    println!("  {}", config.seed_url());

    println!("\nOutput:");
    println!("  Dataset: {}", sink.dataset_path().display());
    for stage in [Stage::Index, Stage::Issue, Stage::Article] {
        if let Some(path) = sink.audit_path(stage) {
            println!("  {} links: {}", stage, path.display());
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    sink: CsvSink,
    fresh: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = sink.dataset_path().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if fresh {
        tracing::info!("Starting fresh harvest (dataset and audit files reset)");
        sink.init_dataset()?;
        sink.reset_audit_files()?;
    } else if sink.ensure_dataset()? {
        tracing::info!("Created dataset {}", sink.dataset_path().display());
    } else {
        tracing::info!(
            "Appending to existing dataset {}",
            sink.dataset_path().display()
        );
    }

    tracing::info!("Seed URL: {}", config.seed_url());

    match run_crawl(config, sink).await {
        Ok(stats) => {
            tracing::info!("Harvest completed successfully");
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
