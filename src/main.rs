//! # NEV Weekly
//!
//! A weekly newsletter generator covering China's new-energy-vehicle market
//! and the smart-dimming glass industry. It queries a web search API,
//! extracts structured facts from the returned snippets with heuristics,
//! optionally asks a language model for the narrative, and publishes a
//! static HTML page plus Markdown side reports.
//!
//! ## Features
//!
//! - Premium-segment sales rankings (>250k and >350k RMB)
//! - New launches of the past week and releases expected next month
//! - Recent statements from configured industry figures
//! - Ranked smart-dimming glass news and a competitor landscape
//! - Reachability report for every competitor link collected
//!
//! ## Usage
//!
//! ```sh
//! TAVILY_API_KEY=... OPENAI_API_KEY=... nev_weekly -c ./config -o ./public
//! ```
//!
//! ## Architecture
//!
//! The run is a single sequential pipeline:
//! 1. **Configuration**: Load the YAML lists and the competitor URL map
//! 2. **Aggregation**: Build each report section from search results
//! 3. **Competitors**: Probe homepages and collect a link pool
//! 4. **Narrative**: Summarize the sections (model or template)
//! 5. **Output**: Write `index.html`, `style.css`, `competitor_report.md`
//!    and `link_report.md`
//!
//! Missing credentials never fail the run; they only degrade the content.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregators;
mod cli;
mod competitors;
mod config;
mod extract;
mod http;
mod links;
mod models;
mod narrative;
mod outputs;
mod retry;
mod search;
mod utils;

use aggregators::{dimming, releases, sales, today_utc, vip};
use cli::Cli;
use config::NewsletterConfig;
use http::{LINK_CHECK_TIMEOUT, PAGE_FETCH_TIMEOUT, api_client, model_client, page_client};
use models::ReportSections;
use narrative::NarrativeFormatter;
use outputs::{html, markdown, site};
use search::SearchGateway;
use utils::ensure_writable_dir;

const SALES_TOP_N: usize = 10;
const LAUNCH_MAX_ITEMS: usize = 3;
const UPCOMING_MAX_ITEMS: usize = 5;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("nev_weekly starting up");

    let args = Cli::parse();
    debug!(
        config_dir = %args.config_dir.display(),
        output_dir = %args.output_dir.display(),
        "Parsed CLI arguments"
    );

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let config = NewsletterConfig::load(&args.config_dir)?;

    // ---- Clients ----
    let search = SearchGateway::tavily(args.tavily_api_key.clone(), api_client()?);
    debug!(search_enabled = search.is_enabled(), "Search gateway ready");
    let page = page_client(PAGE_FETCH_TIMEOUT)?;
    let link_checker = page_client(LINK_CHECK_TIMEOUT)?;
    let formatter = NarrativeFormatter::new(
        model_client()?,
        args.openai_api_key.clone(),
        &args.openai_base_url,
        &args.model,
    );

    // ---- Sections ----
    let today = today_utc();
    let sales = sales::get_sales_rankings(&search, SALES_TOP_N).await;
    let launches = releases::get_new_car_launches(&search, LAUNCH_MAX_ITEMS, today).await;
    let upcoming = releases::get_upcoming_releases(&search, UPCOMING_MAX_ITEMS).await;
    let vip_voices = vip::get_vip_voices(&search, &config.vips, today).await;
    let dimming_news = dimming::get_smart_dimming_news(
        &search,
        &config.competitors,
        &config.keywords,
        args.dimming_target,
        args.dimming_top_n,
    )
    .await;
    let competitors = competitors::analyze_competitors(
        &search,
        &page,
        &config.competitor_urls,
        args.min_links,
    )
    .await;

    let sections = ReportSections {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S%.6fZ").to_string(),
        sales,
        launches,
        upcoming,
        vip_voices,
        dimming_news,
        competitors,
    };
    info!(
        launches = sections.launches.len(),
        upcoming = sections.upcoming.len(),
        vip_voices = sections.vip_voices.len(),
        dimming_news = sections.dimming_news.len(),
        competitors = sections.competitors.total_competitors,
        "Report sections assembled"
    );

    // ---- Newsletter page ----
    let narrative = formatter.weekly_report(&sections).await;
    let page_html = html::render_html(&narrative, &sections);
    let index_path = site::write_page(&args.output_dir, &page_html).await?;
    println!("Generated {}", index_path.display());

    // ---- Side reports ----
    let competitor_md = formatter.competitor_report(&sections.competitors).await;
    site::write_report(&args.output_dir, "competitor_report.md", &competitor_md).await?;

    let link_statuses = links::check_links(&link_checker, &sections.competitors.unique_links).await;
    let link_md = markdown::link_report_markdown(&link_statuses);
    site::write_report(&args.output_dir, "link_report.md", &link_md).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
