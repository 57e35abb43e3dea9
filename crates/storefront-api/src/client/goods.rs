//! Goods listing, lookup by id, and autocomplete for `ApiClient`.

use futures::stream::{self, StreamExt};
use storefront_core::Good;

use crate::error::ApiError;
use crate::pagination::parse_goods_page;
use crate::types::{GoodsLookup, GoodsPage, GoodsQuery};

use super::ApiClient;
use super::LOOKUP_CONCURRENCY;

/// Autocomplete is not queried for inputs shorter than this many characters.
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

impl ApiClient {
    /// Fetches one page of goods.
    ///
    /// Accepts both the enveloped and the bare-array response shapes.
    ///
    /// # Errors
    ///
    /// - [`ApiError::RateLimited`] / [`ApiError::UnexpectedStatus`] after retries.
    /// - [`ApiError::Http`] on network failure after retries.
    /// - [`ApiError::Deserialize`] if the body is neither an array nor an object.
    pub async fn list_goods(&self, request: &GoodsQuery) -> Result<GoodsPage, ApiError> {
        let page = request.page.max(1).to_string();
        let per_page = request.per_page.max(1).to_string();
        let mut params = vec![("page", page.as_str()), ("per_page", per_page.as_str())];
        if let Some(query) = request.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("query", query));
        }
        if let Some(sort) = request.sort {
            params.push(("sort_order", sort.remote_param()));
        }

        let url = self.endpoint_url("goods", &params)?;
        let body = self.get_text(&url).await?;
        let page = parse_goods_page(&body).map_err(|e| ApiError::Deserialize {
            context: format!("goods page {}", request.page),
            source: e,
        })?;

        tracing::debug!(
            page = request.page,
            received = page.goods.len(),
            total = page.pagination.map(|p| p.total_count),
            "fetched goods page"
        );
        Ok(page)
    }

    /// Fetches a single good.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, otherwise the same
    /// errors as [`Self::list_goods`].
    pub async fn good_by_id(&self, id: u64) -> Result<Good, ApiError> {
        let url = self.endpoint_url(&format!("goods/{id}"), &[])?;
        self.get_json(&url, &format!("good {id}")).await
    }

    /// Resolves a set of ids to goods, preserving request order.
    ///
    /// Ids the store answers with 404 are collected in
    /// [`GoodsLookup::missing`] rather than failing the batch.
    ///
    /// # Errors
    ///
    /// Returns the first non-404 error encountered.
    pub async fn goods_by_ids(&self, ids: &[u64]) -> Result<GoodsLookup, ApiError> {
        let results: Vec<(u64, Result<Good, ApiError>)> = stream::iter(ids.iter().copied())
            .map(|id| async move { (id, self.good_by_id(id).await) })
            .buffered(LOOKUP_CONCURRENCY)
            .collect()
            .await;

        let mut lookup = GoodsLookup::default();
        for (id, result) in results {
            match result {
                Ok(good) => lookup.found.push(good),
                Err(ApiError::NotFound { .. }) => {
                    tracing::warn!(good_id = id, "good no longer exists in the store");
                    lookup.missing.push(id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(lookup)
    }

    /// Returns completion suggestions for a partial query.
    ///
    /// Inputs shorter than [`MIN_AUTOCOMPLETE_CHARS`] return an empty list
    /// without a request.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list_goods`].
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let query = query.trim();
        if query.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }
        let url = self.endpoint_url("autocomplete", &[("query", query)])?;
        let suggestions: serde_json::Value = self.get_json(&url, "autocomplete").await?;
        Ok(suggestions
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default())
    }
}
