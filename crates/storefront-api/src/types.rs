//! Store API response and request types.
//!
//! ## Observed shape of `GET /goods`
//!
//! ### Envelope vs. bare array
//! Current deployments answer with an envelope:
//! `{ "goods": [...], "_pagination": { "current_page": 1, "per_page": 20, "total_count": 245 } }`.
//! Older deployments answer with a bare JSON array of goods and no
//! pagination summary. Both are accepted; see [`crate::pagination`].
//!
//! ### Individual rows
//! `discount_price` is `null` when the good is not on sale. A handful of rows
//! have been observed with missing prices; those rows are skipped with a
//! warning instead of failing the whole page.

use serde::Deserialize;
use storefront_core::{Good, SortKey};

/// Pagination summary from the `_pagination` envelope field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub per_page: u32,
    pub total_count: u64,
}

/// One page of goods as returned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoodsPage {
    pub goods: Vec<Good>,
    /// `None` when the store answered with a bare array.
    pub pagination: Option<PageInfo>,
}

/// Parameters of a `GET /goods` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodsQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    pub query: Option<String>,
    pub sort: Option<SortKey>,
}

impl GoodsQuery {
    #[must_use]
    pub fn first_page(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            query: None,
            sort: None,
        }
    }
}

/// Result of resolving a set of good ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoodsLookup {
    /// Resolved goods, in the order the ids were requested.
    pub found: Vec<Good>,
    /// Ids the store does not know (deleted or never existed).
    pub missing: Vec<u64>,
}
