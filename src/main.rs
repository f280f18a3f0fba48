//! Link-Sweeper main entry point
//!
//! This is the command-line interface for the Link-Sweeper broken-link crawler.

use anyhow::Context;
use clap::Parser;
use link_sweeper::config::{load_config_with_hash, Config, Overrides, Renderer};
use link_sweeper::crawler::Coordinator;
use link_sweeper::output::{print_json_report, print_report, write_markdown_report, CrawlReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Link-Sweeper: a concurrent broken-link crawler
///
/// Link-Sweeper starts from a seed URL, follows every link on the same origin,
/// checks each one for liveness, and reports the broken links together with the
/// page they were found on.
#[derive(Parser, Debug)]
#[command(name = "link-sweeper")]
#[command(version)]
#[command(about = "A concurrent broken-link crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short = 'n', long)]
    concurrency: Option<u32>,

    /// How pages are rendered to find links
    #[arg(long, value_name = "browser|static")]
    renderer: Option<Renderer>,

    /// Liveness probe timeout in seconds
    #[arg(long, value_name = "SECS")]
    probe_timeout: Option<u64>,

    /// Page navigation timeout in seconds
    #[arg(long, value_name = "SECS")]
    crawl_timeout: Option<u64>,

    /// Also write a markdown summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<String>,

    /// Print the report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Exit with status 1 when broken links are found
    #[arg(long)]
    fail_on_broken: bool,

    /// Validate configuration and seed, then exit without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(&cli)?;

    let coordinator = Coordinator::new(config.clone(), &cli.seed)
        .with_context(|| format!("Cannot crawl seed '{}'", cli.seed))?
        .with_config_hash(config_hash);

    if cli.dry_run {
        handle_dry_run(&config, coordinator.seed());
        return Ok(ExitCode::SUCCESS);
    }

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context("Crawl setup failed");
        }
    };

    emit_report(&cli, &config, &report)?;

    if cli.fail_on_broken && report.has_broken_links() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_sweeper=info,warn"),
            1 => EnvFilter::new("link_sweeper=debug,info"),
            2 => EnvFilter::new("link_sweeper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout only carries the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    let config = config
        .with_overrides(Overrides {
            concurrency: cli.concurrency,
            renderer: cli.renderer,
            probe_timeout_secs: cli.probe_timeout,
            crawl_timeout_secs: cli.crawl_timeout,
            summary_path: cli.summary.clone(),
        })
        .context("Invalid command-line option")?;

    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, seed: &url::Url) {
    println!("=== Link-Sweeper Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Scope: {}", seed.origin().ascii_serialization());

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.concurrency);
    println!("  Renderer: {}", config.crawler.renderer);
    println!("  Probe timeout: {}s", config.crawler.probe_timeout_secs);
    println!("  Crawl timeout: {}s", config.crawler.crawl_timeout_secs);
    println!("  Settle timeout: {}s", config.crawler.settle_timeout_secs);
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    if let Some(path) = &config.output.summary_path {
        println!("\nSummary: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Prints the report and writes the optional markdown summary
fn emit_report(cli: &Cli, config: &Config, report: &CrawlReport) -> anyhow::Result<()> {
    if cli.json {
        print_json_report(report)?;
    } else {
        print_report(report);
    }

    if let Some(path) = &config.output.summary_path {
        write_markdown_report(report, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
        tracing::info!("Summary written to: {}", path);
    }

    Ok(())
}
