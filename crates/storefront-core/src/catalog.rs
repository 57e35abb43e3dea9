//! Client-side catalog refinement: category/price/discount filters, sorting,
//! and category facets.
//!
//! Free-text search is not handled here; the vendor applies `query` before a
//! page is returned and this module only refines what arrives.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::goods::Good;

/// Ordering applied to a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    RatingAsc,
    #[default]
    RatingDesc,
}

impl SortKey {
    /// Parses a UI label such as `"price-asc"`. Unknown labels fall back to
    /// the default ordering (rating, highest first).
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "rating-asc" => Self::RatingAsc,
            _ => Self::RatingDesc,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::RatingAsc => "rating-asc",
            Self::RatingDesc => "rating-desc",
        }
    }

    /// Value of the vendor's `sort_order` query parameter.
    #[must_use]
    pub fn remote_param(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::RatingAsc => "rating_asc",
            Self::RatingDesc => "rating_desc",
        }
    }

    fn compare(self, a: &Good, b: &Good) -> Ordering {
        match self {
            Self::PriceAsc => a.effective_price().cmp(&b.effective_price()),
            Self::PriceDesc => b.effective_price().cmp(&a.effective_price()),
            Self::RatingAsc => a.rating.total_cmp(&b.rating),
            Self::RatingDesc => b.rating.total_cmp(&a.rating),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's current catalog query. Rebuilt on every interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Free text forwarded to the vendor.
    pub query: Option<String>,
    /// Selected categories, lower-cased. Empty means "all".
    pub categories: BTreeSet<String>,
    /// Inclusive lower bound on effective price.
    pub min_price: u32,
    /// Inclusive upper bound on effective price; `None` is unbounded.
    pub max_price: Option<u32>,
    pub discount_only: bool,
    pub sort: SortKey,
}

impl FilterCriteria {
    /// Replaces the category selection, normalizing each entry to lower case
    /// and dropping blanks.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = categories
            .into_iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Trimmed free-text query, `None` when blank.
    #[must_use]
    pub fn text_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Returns `true` if `good` passes every local filter.
    #[must_use]
    pub fn matches(&self, good: &Good) -> bool {
        self.matches_category(good) && self.matches_price(good) && self.matches_discount(good)
    }

    fn matches_category(&self, good: &Good) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        let key = good.category_key();
        !key.is_empty() && self.categories.contains(&key)
    }

    fn matches_price(&self, good: &Good) -> bool {
        let price = good.effective_price();
        price >= self.min_price && self.max_price.is_none_or(|max| price <= max)
    }

    fn matches_discount(&self, good: &Good) -> bool {
        !self.discount_only || good.has_discount()
    }
}

/// Keeps the goods that pass `criteria`, preserving input order.
#[must_use]
pub fn refine(goods: Vec<Good>, criteria: &FilterCriteria) -> Vec<Good> {
    goods.into_iter().filter(|g| criteria.matches(g)).collect()
}

/// Stable sort by `key`; ties keep their existing relative order.
pub fn sort_goods(goods: &mut [Good], key: SortKey) {
    goods.sort_by(|a, b| key.compare(a, b));
}

/// Filters then sorts.
#[must_use]
pub fn apply(goods: Vec<Good>, criteria: &FilterCriteria) -> Vec<Good> {
    let mut refined = refine(goods, criteria);
    sort_goods(&mut refined, criteria.sort);
    refined
}

/// A selectable category with the number of goods carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub category: String,
    pub count: usize,
}

/// Distinct lower-cased main categories in alphabetical order. Goods
/// without a category are not counted.
#[must_use]
pub fn facets<'a, I>(goods: I) -> Vec<Facet>
where
    I: IntoIterator<Item = &'a Good>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for good in goods {
        let key = good.category_key();
        if key.is_empty() {
            continue;
        }
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| Facet { category, count })
        .collect()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
