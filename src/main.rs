//! Elidune Discovery - catalog browsing client
//!
//! Hydrates a catalog view from a page URL, fetches the first page of
//! results from the configured backend and prints them.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elidune_discovery::{config::AppConfig, virtual_list::RenderFrame, AppState, Location};

const DEFAULT_PAGE_URL: &str = "http://localhost:5173/catalog";
const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 900.0;

#[derive(Parser, Debug)]
#[command(name = "elidune-discovery", version, about = "Browse the Elidune catalog from a page URL")]
struct Cli {
    /// Catalog page URL whose query parameters hold the filters
    #[arg(env = "ELIDUNE_PAGE_URL", default_value = DEFAULT_PAGE_URL)]
    page_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("elidune_discovery={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Elidune Discovery v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Catalog backend: {}", config.backend.base_url);

    let page_url = cli.page_url;
    let location = Location::parse(&page_url).with_context(|| format!("Invalid page URL: {}", page_url))?;

    let state = AppState::new(config).context("Failed to create services")?;
    let mut session = state.services.session(location, VIEWPORT_WIDTH);

    tracing::info!(
        "{} active filter(s), page {}",
        session.store().active_filter_count(),
        session.current_page()
    );

    if let Some(outcome) = session.refresh().await {
        tracing::debug!("Fetch outcome: {:?}", outcome);
    }
    if let Some(notice) = session.fetcher().last_error() {
        tracing::warn!("{} ({})", notice.message, notice.detail);
    }

    let pagination = session.fetcher().pagination();
    println!(
        "Page {}/{} ({} result(s))",
        pagination.current_page, pagination.total_pages, pagination.total_items
    );

    match session.list_mut().render(0.0, VIEWPORT_HEIGHT) {
        RenderFrame::Loading => println!("Loading..."),
        RenderFrame::Empty => println!("No books match these filters."),
        RenderFrame::Rows(frame) => {
            for row in frame.rows.iter().filter(|r| !r.is_sentinel()) {
                for book in session.list().items_in(row) {
                    let authors = book.authors.join(", ");
                    match book.published_year {
                        Some(year) => println!("  {} - {} ({})", book.display_title(), authors, year),
                        None => println!("  {} - {}", book.display_title(), authors),
                    }
                }
            }
            if session.fetcher().has_next_page() {
                println!("  ...");
            }
        }
    }

    println!("{}", session.store().location().href());
    Ok(())
}
