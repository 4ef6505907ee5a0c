use crate::cancel::CancelToken;
use crate::config::{Renderer, SearchOptions};
use crate::db::connection::{init_db, Database};
use crate::db::{listings, scrapes};
use crate::domain::classify::ClassifierPolicy;
use crate::images::ImageDownloader;
use crate::scraper::{HttpBrowser, SearchContext};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod cancel;
mod config;
mod db;
mod discovery;
mod domain;
mod errors;
mod export;
mod images;
mod scraper;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "studio_space", about = "Find photography studio space for rent or sale")]
struct Cli {
    /// Config file (defaults to ./studio_space.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every source, download images and write listings.json
    Search {
        /// Postal code to search near
        #[arg(short, long)]
        postal_code: Option<String>,
        /// Output directory for listings.json and images
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Maximum number of listings to keep (also the per-page card cap)
        #[arg(short, long)]
        max_listings: Option<usize>,
        /// How pages are fetched
        #[arg(long, value_enum)]
        renderer: Option<Renderer>,
        /// Save each results page under <output>/debug
        #[arg(long)]
        snapshots: bool,
    },
    /// Show recent runs, or the listings of one run
    Runs {
        /// Run id to list listings for
        #[arg(long)]
        id: Option<i64>,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = SearchOptions::load(cli.config.as_deref())
        .context("loading configuration")
        .and_then(|opts| match cli.command {
            Commands::Search {
                postal_code,
                output,
                max_listings,
                renderer,
                snapshots,
            } => {
                let mut opts = opts;
                if let Some(p) = postal_code {
                    opts.postal_code = p;
                }
                if let Some(o) = output {
                    opts.artifacts_path = o;
                }
                if let Some(m) = max_listings {
                    opts.max_listings = m;
                }
                if let Some(r) = renderer {
                    opts.renderer = r;
                }
                opts.debug_snapshots |= snapshots;
                run_search(opts)
            }
            Commands::Runs { id, limit } => show_runs(&opts, id, limit),
        });

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

fn run_search(opts: SearchOptions) -> anyhow::Result<ExitCode> {
    info!("=== Studio Space Finder ===");
    info!("Searching for photography studio space near {}...", opts.postal_code);
    info!("Output directory: {}", opts.artifacts_path.display());

    // 1️⃣ Policy, browser and run record
    let policy = ClassifierPolicy::load(opts.policy_path.as_deref()).context("loading classifier policy")?;
    let cancel = CancelToken::new();
    let mut browser = HttpBrowser::new(opts.renderer, cancel.clone()).context("starting browser")?;

    let db = Database::new(&opts.database_path);
    init_db(&db)?;
    let run_id = db.with_conn(|conn| scrapes::start_scrape_run(conn, &opts.postal_code, now_unix()))?;

    if let Some(secs) = opts.max_run_seconds {
        cancel.cancel_after(std::time::Duration::from_secs(secs));
    }

    // 2️⃣ Discovery
    let snapshot_dir = opts.snapshot_dir();
    let ctx = SearchContext {
        region: &opts.postal_code,
        policy: &policy,
        max_listings: opts.max_listings,
        page_timeout: opts.page_timeout(),
        detail_timeout: opts.detail_timeout(),
        snapshot_dir: snapshot_dir.as_deref(),
        cancel: &cancel,
    };

    let mut found = match discovery::discover(&mut browser, &opts.sources, &ctx) {
        Ok(found) => found,
        Err(e) => {
            let _ = db.with_conn(|conn| {
                scrapes::end_scrape_run(conn, run_id, now_unix(), 0, false, Some(e.to_string()))
            });
            return Err(e).context("search failed");
        }
    };

    if found.is_empty() {
        warn!("No listings found. Try broadening your search.");
        db.with_conn(|conn| scrapes::end_scrape_run(conn, run_id, now_unix(), 0, true, None))?;
        return Ok(ExitCode::FAILURE);
    }

    found.truncate(opts.max_listings);
    info!("Processing {} listings...", found.len());

    // 3️⃣ Images and hand-off
    let downloader = ImageDownloader::new(opts.image_timeout())?;
    downloader
        .download_all(&mut found, &opts.artifacts_path)
        .context("downloading images")?;

    let json_path = export::write_listings_json(&found, &opts.artifacts_path)?;
    db.with_conn(|conn| listings::save_listings(conn, run_id, &found))?;
    db.with_conn(|conn| scrapes::end_scrape_run(conn, run_id, now_unix(), found.len(), true, None))?;

    info!("=== Complete ===");
    info!("Listings: {}", json_path.display());
    info!("Images: {}", opts.artifacts_path.join(images::IMAGES_DIR).display());
    Ok(ExitCode::SUCCESS)
}

fn show_runs(opts: &SearchOptions, id: Option<i64>, limit: usize) -> anyhow::Result<ExitCode> {
    let db = Database::new(&opts.database_path);
    init_db(&db)?;

    match id {
        Some(run_id) => {
            let found = db.with_conn(|conn| listings::listings_for_run(conn, run_id))?;
            for (i, l) in found.iter().enumerate() {
                println!("{}. {} [{}]", i + 1, l.description, l.source);
                println!("   {}", l.address);
                if let Some(rent) = &l.rental_cost {
                    println!("   Rent: {rent}");
                }
                if let Some(price) = &l.purchase_cost {
                    println!("   Price: {price}");
                }
                println!("   {}", l.listing_url);
            }
        }
        None => {
            let runs = db.with_conn(|conn| scrapes::get_recent_scrapes(conn, limit))?;
            for run in runs {
                let status = match (run.finished_at, run.success) {
                    (None, _) => "running".to_string(),
                    (Some(_), true) => "ok".to_string(),
                    (Some(_), false) => format!("failed: {}", run.error_message.unwrap_or_default()),
                };
                println!(
                    "#{} {} started {} listings {} {}",
                    run.id,
                    run.region,
                    run.started_at,
                    run.listings_found.unwrap_or(0),
                    status
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
