//! Catalog browsing command handlers.

use clap::Subcommand;
use storefront_api::{ApiClient, CatalogSession, LoadOutcome};
use storefront_core::{AppConfig, FilterCriteria, Good, SortKey};

use crate::{fmt_price, page_size, print_notices, truncate};

/// Sub-commands available under `goods`.
#[derive(Debug, Subcommand)]
pub enum GoodsCommands {
    /// List goods with optional search, filters, and sorting
    List {
        /// Free-text search forwarded to the store
        #[arg(long)]
        query: Option<String>,
        /// Restrict to a main category; repeat for several
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Minimum effective price
        #[arg(long, default_value = "0")]
        min_price: u32,
        /// Maximum effective price
        #[arg(long)]
        max_price: Option<u32>,
        /// Only goods with an applicable discount
        #[arg(long)]
        discount_only: bool,
        /// price-asc, price-desc, rating-asc, or rating-desc
        #[arg(long, default_value = "rating-desc")]
        sort: String,
        /// Number of store pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
        /// Goods per store page (defaults to STOREFRONT_PAGE_SIZE)
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Show search suggestions for a partial query
    Suggest {
        query: String,
    },
}

pub(crate) async fn run_goods(
    client: &ApiClient,
    config: &AppConfig,
    command: GoodsCommands,
) -> anyhow::Result<()> {
    match command {
        GoodsCommands::List {
            query,
            categories,
            min_price,
            max_price,
            discount_only,
            sort,
            pages,
            per_page,
        } => {
            let criteria = FilterCriteria {
                query,
                min_price,
                max_price,
                discount_only,
                sort: SortKey::from_label(&sort),
                ..FilterCriteria::default()
            }
            .with_categories(categories);
            let mut session = CatalogSession::new(page_size(config, per_page));
            run_goods_list(client, &mut session, criteria, pages).await;
            Ok(())
        }
        GoodsCommands::Suggest { query } => {
            let mut session = CatalogSession::new(page_size(config, None));
            let suggestions = session.suggest(client, &query).await;
            print_notices(session.take_notices());
            if suggestions.is_empty() {
                println!("no suggestions");
            }
            for suggestion in suggestions {
                println!("{suggestion}");
            }
            Ok(())
        }
    }
}

/// Loads up to `pages` store pages for `criteria` and prints the refined,
/// sorted result followed by the category facets.
async fn run_goods_list(
    client: &ApiClient,
    session: &mut CatalogSession,
    criteria: FilterCriteria,
    pages: u32,
) {
    let mut outcome = session.search(client, criteria).await;
    for _ in 1..pages {
        if !matches!(outcome, LoadOutcome::Loaded { .. }) {
            break;
        }
        outcome = session.load_next(client).await;
    }
    print_notices(session.take_notices());

    print_goods(session.items());
    if session.has_more() {
        println!();
        println!("more goods available; pass a larger --pages to load them");
    }

    let facets = session.facets();
    if !facets.is_empty() {
        println!();
        println!("{:<32}COUNT", "CATEGORY");
        for facet in facets {
            println!("{:<32}{}", facet.category, facet.count);
        }
    }
}

fn print_goods(goods: &[Good]) {
    if goods.is_empty() {
        println!("no goods match the current filters");
        return;
    }
    println!(
        "{:<8}{:<12}{:<12}{:<8}{:<24}NAME",
        "ID", "PRICE", "WAS", "RATING", "CATEGORY"
    );
    for good in goods {
        let was = if good.has_discount() {
            let percent = good
                .discount_percent()
                .map(|p| format!(" -{p}%"))
                .unwrap_or_default();
            format!("{}{percent}", u64::from(good.actual_price))
        } else {
            String::new()
        };
        println!(
            "{:<8}{:<12}{:<12}{:<8.1}{:<24}{}",
            good.id,
            fmt_price(u64::from(good.effective_price())),
            was,
            good.rating,
            truncate(&good.main_category, 22),
            truncate(&good.name, 60)
        );
    }
}
