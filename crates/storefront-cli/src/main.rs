mod cart;
mod catalog;
mod form;
mod orders;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use storefront_api::ApiClient;
use storefront_core::{AppConfig, Notice};
use tracing_subscriber::EnvFilter;

use crate::cart::CartCommands;
use crate::catalog::GoodsCommands;
use crate::orders::OrdersCommands;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront catalog, cart, and order command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse and search the catalog
    Goods {
        #[command(subcommand)]
        command: GoodsCommands,
    },
    /// Manage the local cart and place an order
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// View, edit, and delete placed orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
    /// Quote the delivery fee for a date and time slot
    Delivery {
        /// Delivery date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        date: Option<String>,
        /// Delivery slot, e.g. 18:00-22:00
        #[arg(long)]
        interval: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("storefront: run with --help to list commands");
        return Ok(());
    };

    if let Commands::Delivery { date, interval } = &command {
        init_tracing("warn")?;
        return cart::run_delivery_quote(date.as_deref(), interval.as_deref(), today());
    }

    let config = storefront_core::load_app_config()
        .context("failed to load configuration from environment")?;
    init_tracing(&config.log_level)?;
    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "configuration loaded");

    let client = ApiClient::from_config(&config).context("failed to build store API client")?;

    match command {
        Commands::Goods { command } => catalog::run_goods(&client, &config, command).await,
        Commands::Cart { command } => cart::run_cart(&client, &config, command).await,
        Commands::Orders { command } => orders::run_orders(&client, command).await,
        Commands::Delivery { .. } => Ok(()),
    }
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so table
/// output on stdout stays clean.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// The customer's local calendar date.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Format an optional date for display, returning `"-"` when `None`.
fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Format a price in whole currency units.
fn fmt_price(amount: u64) -> String {
    format!("{amount} \u{20bd}")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        eprintln!("{notice}");
    }
}

/// Page size used when the command line does not override it.
fn page_size(config: &AppConfig, requested: Option<u32>) -> u32 {
    requested.unwrap_or(config.page_size).max(1)
}
