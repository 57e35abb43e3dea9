//! Orders: the remote representation, the local compose/edit form, and the
//! validation that gates every write.
//!
//! ## Wire shape
//!
//! The vendor returns orders with `full_name`, `delivery_address`,
//! `delivery_interval` and `good_ids`. Dates have been observed both as
//! `YYYY-MM-DD` and `DD.MM.YYYY`; both are accepted and `YYYY-MM-DD` is sent.
//! `subscribe` arrives as either a boolean or `0`/`1`.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Returns `true` for `local@domain.tld` with no whitespace anywhere.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Parses a delivery date as typed by a user or returned by the vendor.
#[must_use]
pub fn parse_delivery_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d.%m.%Y"))
        .ok()
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_delivery_date))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Null(()) => false,
    })
}

fn iso_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

#[allow(clippy::ref_option)]
fn iso_date_opt<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(d) => iso_date(d, serializer),
        None => serializer.serialize_none(),
    }
}

/// An order as stored by the vendor.
///
/// Only `id` is required; write responses in particular often echo a
/// subset of the fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub subscribe: bool,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_interval: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub good_ids: Vec<u64>,
    /// Total as stored by the vendor; absent on most rows.
    #[serde(default)]
    pub total_price: Option<u64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl Order {
    /// Copies every field `patch` sets onto this order.
    pub fn apply_patch(&mut self, patch: &OrderPatch) {
        if let Some(name) = &patch.full_name {
            self.full_name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(subscribe) = patch.subscribe {
            self.subscribe = subscribe;
        }
        if let Some(address) = &patch.delivery_address {
            self.delivery_address.clone_from(address);
        }
        if let Some(date) = patch.delivery_date {
            self.delivery_date = Some(date);
        }
        if let Some(interval) = &patch.delivery_interval {
            self.delivery_interval.clone_from(interval);
        }
        if let Some(comment) = &patch.comment {
            self.comment = Some(comment.clone());
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub subscribe: bool,
    pub delivery_address: String,
    #[serde(serialize_with = "iso_date")]
    pub delivery_date: NaiveDate,
    pub delivery_interval: String,
    pub comment: String,
    pub good_ids: Vec<u64>,
}

/// Body of `PUT /orders/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "iso_date_opt"
    )]
    pub delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl OrderPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Form fields that validation can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Items,
    Name,
    Email,
    Phone,
    Address,
    DeliveryDate,
    DeliveryInterval,
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Items => "items",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::DeliveryDate => "delivery date",
            Self::DeliveryInterval => "delivery interval",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: OrderField,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::Malformed => write!(f, "{} is not valid", self.field),
        }
    }
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order form is invalid: {}", render_field_errors(.0))]
pub struct OrderValidationError(pub Vec<FieldError>);

impl OrderValidationError {
    #[must_use]
    pub fn fields(&self) -> Vec<OrderField> {
        self.0.iter().map(|e| e.field).collect()
    }

    #[must_use]
    pub fn has(&self, field: OrderField) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The order form as a customer fills it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Raw date input (`YYYY-MM-DD` or `DD.MM.YYYY`).
    pub delivery_date: String,
    pub delivery_interval: String,
    pub comment: String,
    pub subscribe: bool,
    pub items: Vec<u64>,
}

/// Field values that passed validation.
struct CheckedFields {
    delivery_date: NaiveDate,
}

impl OrderDraft {
    /// Populates an edit form from a stored order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            name: order.full_name.clone(),
            email: order.email.clone(),
            phone: order.phone.clone(),
            address: order.delivery_address.clone(),
            delivery_date: order
                .delivery_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            delivery_interval: order.delivery_interval.clone(),
            comment: order.comment.clone().unwrap_or_default(),
            subscribe: order.subscribe,
            items: order.good_ids.clone(),
        }
    }

    /// Parsed delivery date, if the input is well formed.
    #[must_use]
    pub fn parsed_delivery_date(&self) -> Option<NaiveDate> {
        parse_delivery_date(&self.delivery_date)
    }

    fn check(&self, require_items: bool) -> Result<CheckedFields, OrderValidationError> {
        let mut errors = Vec::new();
        let mut missing = |value: &str, field: OrderField| {
            let blank = value.trim().is_empty();
            if blank {
                errors.push(FieldError {
                    field,
                    problem: FieldProblem::Missing,
                });
            }
            blank
        };

        let no_items = require_items && self.items.is_empty();
        if no_items {
            missing("", OrderField::Items);
        }
        missing(&self.name, OrderField::Name);
        let email_blank = missing(&self.email, OrderField::Email);
        missing(&self.phone, OrderField::Phone);
        missing(&self.address, OrderField::Address);
        let date_blank = missing(&self.delivery_date, OrderField::DeliveryDate);
        missing(&self.delivery_interval, OrderField::DeliveryInterval);

        if !email_blank && !is_valid_email(self.email.trim()) {
            errors.push(FieldError {
                field: OrderField::Email,
                problem: FieldProblem::Malformed,
            });
        }

        let delivery_date = self.parsed_delivery_date();
        if !date_blank && delivery_date.is_none() {
            errors.push(FieldError {
                field: OrderField::DeliveryDate,
                problem: FieldProblem::Malformed,
            });
        }

        match delivery_date {
            Some(delivery_date) if errors.is_empty() => Ok(CheckedFields { delivery_date }),
            _ => {
                errors.sort_by_key(|e| e.field as u8);
                Err(OrderValidationError(errors))
            }
        }
    }

    /// Validates the form for a new order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError`] listing every empty required field,
    /// a malformed email or date, and an empty item list.
    pub fn to_new_order(&self) -> Result<NewOrder, OrderValidationError> {
        let checked = self.check(true)?;
        Ok(NewOrder {
            full_name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            subscribe: self.subscribe,
            delivery_address: self.address.trim().to_string(),
            delivery_date: checked.delivery_date,
            delivery_interval: self.delivery_interval.trim().to_string(),
            comment: self.comment.trim().to_string(),
            good_ids: self.items.clone(),
        })
    }

    /// Validates the form as an edit of an existing order. The item list is
    /// not editable and is not sent.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError`] for the same field rules as
    /// [`Self::to_new_order`], except the item list.
    pub fn to_patch(&self) -> Result<OrderPatch, OrderValidationError> {
        let checked = self.check(false)?;
        Ok(OrderPatch {
            full_name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            subscribe: Some(self.subscribe),
            delivery_address: Some(self.address.trim().to_string()),
            delivery_date: Some(checked.delivery_date),
            delivery_interval: Some(self.delivery_interval.trim().to_string()),
            comment: Some(self.comment.trim().to_string()),
        })
    }
}

#[cfg(test)]
#[path = "order_test.rs"]
mod tests;
