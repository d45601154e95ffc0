//! Search-query command handlers for the CLI.
//!
//! `generate` reconciles against the database unless `--dry-run` is given;
//! `validate` never opens a connection. The remaining subcommands are the
//! hooks the scraping job uses to consume stored searches.

use clap::Subcommand;
use leadgen_core::generator::DEFAULT_MAX_RESULTS;
use leadgen_core::{
    canonicalize, generate, resolve_catalog, validate_search, AppConfig, GenerationRequest,
    ReconcileOutcome, ReconcileStatus, Reconciler,
};
use leadgen_db::{list_unused_searches, mark_search_used, PgSearchStore, DEFAULT_UNUSED_LIMIT};

/// Failures listed in the text summary before the rest are elided.
const FAILURE_PREVIEW: usize = 20;

/// Sub-commands available under `searches`.
#[derive(Debug, Subcommand)]
pub enum SearchCommands {
    /// Generate queries for a niche and store the ones not seen before
    Generate {
        /// Business niche, e.g. "roofers"
        #[arg(long)]
        niche: String,
        /// Upper bound on generated queries (clamped to 100..=5000)
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,
        /// Leave cities out of the location set
        #[arg(long)]
        no_cities: bool,
        /// Include counties in the location set
        #[arg(long)]
        counties: bool,
        /// Print the generated queries without writing to the database
        #[arg(long)]
        dry_run: bool,
        /// Emit JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Check whether a query passes the length and character rules
    Validate {
        /// Query to check
        search: String,
    },
    /// Show total and unused query counts
    Stats,
    /// List unused queries, oldest first
    Next {
        /// Maximum number of queries to list
        #[arg(long, default_value_t = DEFAULT_UNUSED_LIMIT)]
        limit: i64,
    },
    /// Flag a query as consumed by the scraping job
    MarkUsed {
        /// Query to flag
        search: String,
    },
}

pub(crate) async fn run(config: &AppConfig, command: SearchCommands) -> anyhow::Result<()> {
    match command {
        SearchCommands::Generate {
            niche,
            max_results,
            no_cities,
            counties,
            dry_run,
            json,
        } => {
            let request = GenerationRequest::new(niche)
                .max_results(max_results)
                .cities(!no_cities)
                .counties(counties);
            run_generate(config, &request, dry_run, json).await
        }
        SearchCommands::Validate { search } => run_validate(&search),
        SearchCommands::Stats => run_stats(config).await,
        SearchCommands::Next { limit } => {
            let pool = crate::connect(config).await?;
            run_next(&pool, limit).await
        }
        SearchCommands::MarkUsed { search } => {
            let pool = crate::connect(config).await?;
            run_mark_used(&pool, &search).await
        }
    }
}

/// Generate queries and reconcile them against the `searches` table.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the request is rejected,
/// the pool cannot be opened, or the reconciliation finished with status
/// `failed` (after the outcome has been printed).
async fn run_generate(
    config: &AppConfig,
    request: &GenerationRequest,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let catalog = resolve_catalog(config)?;
    let searches = generate(&catalog, request)?;
    tracing::info!(
        niche = %request.niche,
        generated = searches.len(),
        "generated searches"
    );

    if dry_run {
        if json {
            println!("{}", serde_json::to_string_pretty(&searches)?);
        } else {
            for search in &searches {
                println!("{search}");
            }
            println!(
                "dry-run: {} searches generated, nothing written",
                searches.len()
            );
        }
        return Ok(());
    }

    let pool = crate::connect(config).await?;
    let reconciler = Reconciler::new(PgSearchStore::new(pool))
        .with_chunk_size(config.check_chunk_size)
        .with_concurrency(config.check_concurrency);
    let outcome = reconciler.reconcile(&searches).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if outcome.is_failed() {
        anyhow::bail!(
            "reconciliation failed for {} of {} searches",
            outcome.failures.len(),
            outcome.total()
        );
    }
    Ok(())
}

fn print_outcome(outcome: &ReconcileOutcome) {
    let status = match outcome.status {
        ReconcileStatus::Done => "done",
        ReconcileStatus::Failed => "failed",
    };
    println!("status:   {status}");
    println!("new:      {}", outcome.new_count);
    println!("existing: {}", outcome.existing_count);
    println!("failed:   {}", outcome.failures.len());

    for failure in outcome.failures.iter().take(FAILURE_PREVIEW) {
        println!("  {:<40}{}", failure.input, failure.reason);
    }
    if outcome.failures.len() > FAILURE_PREVIEW {
        println!("  ... and {} more", outcome.failures.len() - FAILURE_PREVIEW);
    }
}

pub(crate) fn run_validate(search: &str) -> anyhow::Result<()> {
    let canonical = canonicalize(search);
    if !validate_search(search) {
        anyhow::bail!(
            "invalid search '{canonical}': expected 6-80 characters of a-z, 0-9, space or hyphen"
        );
    }
    println!("valid: {canonical}");
    Ok(())
}

/// Print stored query counts. Store errors show as 0 and are logged.
async fn run_stats(config: &AppConfig) -> anyhow::Result<()> {
    let pool = crate::connect(config).await?;
    let reconciler = Reconciler::new(PgSearchStore::new(pool));

    let total = reconciler.count_all().await;
    let unused = reconciler.count_unused().await;
    println!("total:  {total}");
    println!("unused: {unused}");
    println!("used:   {}", (total - unused).max(0));
    Ok(())
}

async fn run_next(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let rows = list_unused_searches(pool, limit).await?;

    if rows.is_empty() {
        println!("no unused searches; run `searches generate` first");
        return Ok(());
    }

    println!("{:<10}{:<21}SEARCH", "ID", "CREATED");
    for row in &rows {
        println!(
            "{:<10}{:<21}{}",
            row.id,
            row.created_at.format("%Y-%m-%d %H:%M:%S"),
            row.search
        );
    }
    Ok(())
}

async fn run_mark_used(pool: &sqlx::PgPool, search: &str) -> anyhow::Result<()> {
    let canonical = canonicalize(search);
    if mark_search_used(pool, search).await? {
        println!("marked used: {canonical}");
    } else {
        tracing::warn!(search = %canonical, "no unused search matched");
        println!("no unused search matches '{canonical}'");
    }
    Ok(())
}
