//! Cart and checkout command handlers.
//!
//! The cart lives in the file named by `STOREFRONT_CART_PATH` and is loaded
//! once per invocation.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use storefront_api::{ApiClient, CartService, CartSummary, SubmitError};
use storefront_core::order::parse_delivery_date;
use storefront_core::{AddOutcome, AppConfig, DeliveryFeePolicy, FeeRule, FileCartStorage};

use crate::form::{render_validation, OrderFormArgs};
use crate::{fmt_date, fmt_price, print_notices, today, truncate};

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Add a good to the cart
    Add { id: u64 },
    /// Remove a good from the cart
    Remove { id: u64 },
    /// Show the cart priced for a delivery date and slot
    Show {
        /// Delivery date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        date: Option<String>,
        /// Delivery slot, e.g. 18:00-22:00
        #[arg(long)]
        interval: Option<String>,
    },
    /// Empty the cart
    Clear,
    /// Place an order for everything in the cart
    Checkout {
        #[command(flatten)]
        form: OrderFormArgs,
    },
}

pub(crate) async fn run_cart(
    client: &ApiClient,
    config: &AppConfig,
    command: CartCommands,
) -> anyhow::Result<()> {
    let mut service = CartService::open(FileCartStorage::new(&config.cart_path));

    match command {
        CartCommands::Add { id } => {
            let outcome = service
                .add(id)
                .with_context(|| format!("failed to add good {id}"))?;
            match outcome {
                AddOutcome::Added => println!("added good {id} ({} in cart)", service.cart().len()),
                AddOutcome::AlreadyPresent => println!("good {id} is already in the cart"),
            }
        }
        CartCommands::Remove { id } => {
            if service
                .remove(id)
                .with_context(|| format!("failed to remove good {id}"))?
            {
                println!("removed good {id} ({} in cart)", service.cart().len());
            } else {
                println!("good {id} was not in the cart");
            }
        }
        CartCommands::Clear => {
            service.reset().context("failed to clear the cart")?;
            println!("cart cleared");
        }
        CartCommands::Show { date, interval } => {
            let date = parse_optional_date(date.as_deref())?;
            let summary = service
                .summary(client, date, interval.as_deref(), today())
                .await;
            print_notices(service.take_notices());
            if service.cart().is_empty() {
                println!("the cart is empty");
            } else {
                print_summary(&summary);
            }
        }
        CartCommands::Checkout { form } => {
            run_checkout(client, &mut service, form).await?;
        }
    }
    Ok(())
}

async fn run_checkout(
    client: &ApiClient,
    service: &mut CartService<FileCartStorage>,
    form: OrderFormArgs,
) -> anyhow::Result<()> {
    let draft = form.into_draft();
    match service.submit(client, &draft).await {
        Ok(order) => {
            print_notices(service.take_notices());
            println!(
                "order {} placed for delivery on {} ({})",
                order.id,
                fmt_date(order.delivery_date),
                order.delivery_interval
            );
            Ok(())
        }
        Err(SubmitError::Validation(errors)) => {
            anyhow::bail!("the order form is incomplete:\n{}", render_validation(&errors))
        }
        Err(e) => Err(e).context("checkout failed"),
    }
}

/// Prints the fee the canonical policy charges for a delivery request.
pub(crate) fn run_delivery_quote(
    date: Option<&str>,
    interval: Option<&str>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let date = parse_optional_date(date)?;
    let policy = DeliveryFeePolicy::default();
    let rule = match policy.rule(date, interval, today) {
        FeeRule::NoDate => "no date chosen",
        FeeRule::Urgent => "urgent (today or earlier)",
        FeeRule::Weekend => "weekend",
        FeeRule::Evening => "weekday evening slot",
        FeeRule::Standard => "standard",
    };
    println!(
        "delivery fee: {} ({rule})",
        fmt_price(u64::from(policy.fee(date, interval, today)))
    );
    Ok(())
}

fn parse_optional_date(raw: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    raw.filter(|d| !d.trim().is_empty())
        .map(|d| {
            parse_delivery_date(d).ok_or_else(|| {
                anyhow::anyhow!("invalid date '{d}'; expected YYYY-MM-DD or DD.MM.YYYY")
            })
        })
        .transpose()
}

fn print_summary(summary: &CartSummary) {
    println!("{:<8}{:<12}NAME", "ID", "PRICE");
    for good in &summary.lines {
        println!(
            "{:<8}{:<12}{}",
            good.id,
            fmt_price(u64::from(good.effective_price())),
            truncate(&good.name, 60)
        );
    }
    for id in &summary.missing {
        println!("{id:<8}{:<12}no longer available", "-");
    }
    println!();
    println!("subtotal:  {}", fmt_price(summary.subtotal));
    println!("delivery:  {}", fmt_price(u64::from(summary.delivery_fee)));
    println!("total:     {}", fmt_price(summary.total));
}
