//! Rent-Scout main entry point
//!
//! This is the command-line interface for the Rent-Scout price crawler.

use anyhow::{bail, Context};
use clap::Parser;
use rent_scout::config::{load_config_with_hash, Config};
use rent_scout::crawler::{candidate_urls, scout};
use rent_scout::output::{flatten_report, render_report};
use rent_scout::storage::{open_job_store, JobRunner, JobStatus};
use rent_scout::{CarQuery, Engine, JobResult, RuleTable};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Rent-Scout: rental-car price discovery
///
/// Rent-Scout crawls a table of rental vendors, finds the pages for the
/// requested cars and prints the prices it extracted as JSON.
#[derive(Parser, Debug)]
#[command(name = "rent-scout")]
#[command(version)]
#[command(about = "Rental-car price crawler", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (built-in vendor table if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Car to look up, as MAKE:MODEL (repeatable)
    #[arg(long = "car", value_name = "MAKE:MODEL", value_parser = CarQuery::parse)]
    cars: Vec<CarQuery>,

    /// Vendor root to crawl (repeatable; defaults to every enabled vendor)
    #[arg(long = "domain", value_name = "ROOT")]
    domains: Vec<String>,

    /// Print a flattened price table instead of JSON
    #[arg(long)]
    report: bool,

    /// Validate config and show what would be probed without crawling
    #[arg(long, conflicts_with_all = ["report", "jobs_db"])]
    dry_run: bool,

    /// Record the job in a SQLite job store at this path
    #[arg(long, value_name = "PATH")]
    jobs_db: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;
    let domains = if cli.domains.is_empty() {
        config.domains()
    } else {
        cli.domains.clone()
    };

    if cli.dry_run {
        return handle_dry_run(&config, &cli.cars, &domains);
    }

    if cli.cars.is_empty() {
        bail!("at least one --car MAKE:MODEL is required");
    }

    let result = match &cli.jobs_db {
        Some(path) => {
            let engine = Engine::from_config(&config)?;
            handle_recorded_job(engine, path, &cli.cars, &domains).await?
        }
        None => scout(&config, &cli.cars, Some(&domains)).await?,
    };

    if cli.report {
        print!("{}", render_report(&flatten_report(&result)));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rent_scout=info,warn"),
            1 => EnvFilter::new("rent_scout=debug,info"),
            2 => EnvFilter::new("rent_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout stays parseable JSON
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::debug!("Using built-in vendor table");
            Ok(Config::builtin()?)
        }
    }
}

/// Handles --dry-run: prints the vendor table and speculative candidates
fn handle_dry_run(config: &Config, cars: &[CarQuery], domains: &[String]) -> anyhow::Result<()> {
    let rules = RuleTable::from_config(config)?;

    println!("=== Rent-Scout Dry Run ===\n");

    println!("Engine:");
    println!("  Max depth: {}", config.engine.max_depth);
    println!("  Max concurrency: {}", config.engine.max_concurrency);
    match config.engine.max_pages_per_domain {
        Some(pages) => println!("  Page budget: {} per vendor", pages),
        None => println!("  Page budget: unlimited"),
    }
    println!("  Speculative lookup: {}", config.engine.speculative_lookup);

    println!("\nFetch:");
    println!("  Attempts: {}", config.fetch.max_retries);
    println!("  Base timeout: {}s", config.fetch.base_timeout_secs);
    println!("  Retry delay: {}ms", config.fetch.retry_delay_ms);

    println!("\nVendors ({}):", rules.len());
    for rule in rules.iter() {
        let timeout = rule
            .request_timeout_override
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "default".to_string());
        println!(
            "  - {} [{}] selector '{}', timeout {}",
            rule.host,
            rule.path_prefixes.join(", "),
            rule.price_selector_text,
            timeout
        );
    }

    if !cars.is_empty() {
        println!("\nDirect lookup candidates:");
        for domain in domains {
            let root = match rent_scout::url::parse_root(domain) {
                Ok(root) => root,
                Err(e) => {
                    println!("  {} (invalid: {})", domain, e);
                    continue;
                }
            };
            let rule = rent_scout::url::host_key(&root).and_then(|host| rules.lookup(&host));
            match rule {
                Some(rule) => {
                    println!("  {}", domain);
                    for url in candidate_urls(&root, rule, cars) {
                        println!("    * {}", url);
                    }
                }
                None => println!("  {} (no rules, skipped)", domain),
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} vendors", domains.len());

    Ok(())
}

/// Runs the job through a SQLite job store and returns its stored result
async fn handle_recorded_job(
    engine: Engine,
    path: &Path,
    cars: &[CarQuery],
    domains: &[String],
) -> anyhow::Result<JobResult> {
    let store = open_job_store(path)
        .with_context(|| format!("failed to open job store {}", path.display()))?;
    let runner = JobRunner::new(engine, store);

    let id = runner.run(cars, domains).await?;
    eprintln!("job id: {}", id);

    match runner.status(&id)? {
        Some(JobStatus::Done(result)) => Ok(result),
        Some(JobStatus::Error(message)) => bail!("job {} failed: {}", id, message),
        other => bail!("job {} has unexpected status {:?}", id, other),
    }
}
