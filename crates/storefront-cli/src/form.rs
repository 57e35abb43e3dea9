//! Order form arguments shared by `cart checkout` and `orders edit`.

use clap::Args;
use storefront_core::{OrderDraft, OrderValidationError};

/// A complete order form. Blank fields are reported by validation rather
/// than rejected by the argument parser, so every problem is listed at once.
#[derive(Debug, Clone, Default, Args)]
pub struct OrderFormArgs {
    /// Customer full name
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    /// Delivery address
    #[arg(long, default_value = "")]
    pub address: String,
    /// Delivery date (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long, default_value = "")]
    pub date: String,
    /// Delivery slot, e.g. 08:00-12:00
    #[arg(long, default_value = "")]
    pub interval: String,
    #[arg(long, default_value = "")]
    pub comment: String,
    /// Subscribe to the newsletter
    #[arg(long)]
    pub subscribe: bool,
}

impl OrderFormArgs {
    pub fn into_draft(self) -> OrderDraft {
        OrderDraft {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            delivery_date: self.date,
            delivery_interval: self.interval,
            comment: self.comment,
            subscribe: self.subscribe,
            items: Vec::new(),
        }
    }
}

/// Field overrides applied on top of a stored order.
#[derive(Debug, Clone, Default, Args)]
pub struct OrderEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub interval: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
    /// Newsletter subscription (true or false)
    #[arg(long)]
    pub subscribe: Option<bool>,
}

impl OrderEditArgs {
    pub fn apply(self, draft: &mut OrderDraft) {
        let overrides = [
            (self.name, &mut draft.name),
            (self.email, &mut draft.email),
            (self.phone, &mut draft.phone),
            (self.address, &mut draft.address),
            (self.date, &mut draft.delivery_date),
            (self.interval, &mut draft.delivery_interval),
            (self.comment, &mut draft.comment),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(subscribe) = self.subscribe {
            draft.subscribe = subscribe;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.date.is_none()
            && self.interval.is_none()
            && self.comment.is_none()
            && self.subscribe.is_none()
    }
}

/// One line per rejected field.
pub fn render_validation(err: &OrderValidationError) -> String {
    err.0
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
