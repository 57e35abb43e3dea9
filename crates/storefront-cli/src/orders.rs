//! Placed-order command handlers.

use anyhow::Context;
use clap::Subcommand;
use storefront_api::{ApiClient, EditError, OrderDesk};

use crate::form::{render_validation, OrderEditArgs};
use crate::{fmt_date, fmt_price, print_notices, today, truncate};

/// Sub-commands available under `orders`.
#[derive(Debug, Subcommand)]
pub enum OrdersCommands {
    /// List placed orders
    List,
    /// Show one order with its goods and total
    Show { id: u64 },
    /// Change the customer or delivery details of an order
    Edit {
        id: u64,
        #[command(flatten)]
        changes: OrderEditArgs,
    },
    /// Delete an order
    Delete { id: u64 },
}

pub(crate) async fn run_orders(client: &ApiClient, command: OrdersCommands) -> anyhow::Result<()> {
    let mut desk = OrderDesk::new();

    match command {
        OrdersCommands::List => {
            desk.refresh(client).await;
            print_notices(desk.take_notices());
            print_order_list(&desk);
        }
        OrdersCommands::Show { id } => {
            desk.refresh(client).await;
            let details = desk
                .details(client, id, today())
                .await
                .ok_or_else(|| anyhow::anyhow!("order {id} not found"))?;
            print_notices(desk.take_notices());

            let order = &details.order;
            println!("Order {}", order.id);
            println!("Placed:    {}", fmt_date(order.created_at.map(|at| at.date())));
            println!("Customer:  {} <{}> {}", order.full_name, order.email, order.phone);
            println!("Address:   {}", order.delivery_address);
            println!(
                "Delivery:  {} {}",
                fmt_date(order.delivery_date),
                order.delivery_interval
            );
            if let Some(comment) = order.comment.as_deref().filter(|c| !c.is_empty()) {
                println!("Comment:   {comment}");
            }
            println!("Newsletter: {}", if order.subscribe { "yes" } else { "no" });
            println!();
            for good in &details.lines {
                println!(
                    "{:<8}{:<12}{}",
                    good.id,
                    fmt_price(u64::from(good.effective_price())),
                    truncate(&good.name, 60)
                );
            }
            for missing in &details.missing {
                println!("{missing:<8}{:<12}no longer available", "-");
            }
            println!();
            match details.total {
                Some(total) => println!("total: {}", fmt_price(total)),
                None => println!("total: unavailable"),
            }
        }
        OrdersCommands::Edit { id, changes } => {
            if changes.is_empty() {
                anyhow::bail!("nothing to change; pass at least one field flag");
            }
            desk.refresh(client).await;
            print_notices(desk.take_notices());
            let mut draft = desk
                .edit_form(id)
                .ok_or_else(|| anyhow::anyhow!("order {id} not found"))?;
            changes.apply(&mut draft);

            match desk.update(client, id, &draft).await {
                Ok(order) => println!("order {} updated", order.id),
                Err(EditError::Validation(errors)) => {
                    anyhow::bail!("the order form is invalid:\n{}", render_validation(&errors))
                }
                Err(e) => return Err(e).with_context(|| format!("failed to update order {id}")),
            }
        }
        OrdersCommands::Delete { id } => {
            desk.delete(client, id)
                .await
                .with_context(|| format!("failed to delete order {id}"))?;
            print_notices(desk.take_notices());
            println!("order {id} deleted ({} remaining)", desk.orders().len());
        }
    }
    Ok(())
}

fn print_order_list(desk: &OrderDesk) {
    let orders = desk.orders();
    if orders.is_empty() {
        println!("no orders found");
        return;
    }
    println!(
        "{:<8}{:<12}{:<14}{:<8}{:<26}ADDRESS",
        "ID", "DELIVERY", "SLOT", "ITEMS", "CUSTOMER"
    );
    for order in orders {
        println!(
            "{:<8}{:<12}{:<14}{:<8}{:<26}{}",
            order.id,
            fmt_date(order.delivery_date),
            order.delivery_interval,
            order.good_ids.len(),
            truncate(&order.full_name, 24),
            truncate(&order.delivery_address, 40)
        );
    }
}
