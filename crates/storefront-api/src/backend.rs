//! The data-source seam used by the catalog and cart/order services.
//!
//! [`ApiClient`] is the production implementation. Tests substitute an
//! in-memory store so session behaviour can be checked without HTTP.

use std::future::Future;

use storefront_core::{NewOrder, Order, OrderPatch};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{GoodsLookup, GoodsPage, GoodsQuery};

/// Remote goods and orders.
pub trait StoreBackend {
    fn list_goods(&self, request: &GoodsQuery)
        -> impl Future<Output = Result<GoodsPage, ApiError>>;

    /// Resolves ids to goods in request order; unknown ids are reported in
    /// [`GoodsLookup::missing`].
    fn goods_by_ids(&self, ids: &[u64]) -> impl Future<Output = Result<GoodsLookup, ApiError>>;

    fn autocomplete(&self, query: &str) -> impl Future<Output = Result<Vec<String>, ApiError>>;

    fn list_orders(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>>;

    fn create_order(&self, order: &NewOrder) -> impl Future<Output = Result<Order, ApiError>>;

    fn update_order(
        &self,
        id: u64,
        patch: &OrderPatch,
    ) -> impl Future<Output = Result<Order, ApiError>>;

    fn delete_order(&self, id: u64) -> impl Future<Output = Result<(), ApiError>>;
}

impl StoreBackend for ApiClient {
    async fn list_goods(&self, request: &GoodsQuery) -> Result<GoodsPage, ApiError> {
        ApiClient::list_goods(self, request).await
    }

    async fn goods_by_ids(&self, ids: &[u64]) -> Result<GoodsLookup, ApiError> {
        ApiClient::goods_by_ids(self, ids).await
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ApiError> {
        ApiClient::autocomplete(self, query).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        ApiClient::list_orders(self).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        ApiClient::create_order(self, order).await
    }

    async fn update_order(&self, id: u64, patch: &OrderPatch) -> Result<Order, ApiError> {
        ApiClient::update_order(self, id, patch).await
    }

    async fn delete_order(&self, id: u64) -> Result<(), ApiError> {
        ApiClient::delete_order(self, id).await
    }
}
