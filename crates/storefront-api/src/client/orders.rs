//! Order CRUD for `ApiClient`. Writes are sent once and never retried.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use storefront_core::{NewOrder, Order, OrderPatch};

use crate::error::ApiError;

use super::ApiClient;

impl ApiClient {
    /// Lists all orders visible to the API key.
    ///
    /// Rows that do not parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::UnexpectedStatus`] after retries.
    /// - [`ApiError::Deserialize`] if the body is not a JSON array.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint_url("orders", &[])?;
        let rows: Vec<serde_json::Value> = self.get_json(&url, "orders").await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Order>(row) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed order row");
                    None
                }
            })
            .collect())
    }

    /// Creates an order and returns the stored representation.
    ///
    /// A 2xx status means the order exists. Fields the response body omits
    /// are taken from `order`; an unreadable body is logged, not returned.
    ///
    /// # Errors
    ///
    /// Any transport or status error; never retried.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let url = self.endpoint_url("orders", &[])?;
        let body = self.send_write(Method::POST, &url, Some(order)).await?;
        Ok(written_order(order, &body, None))
    }

    /// Applies a partial update to an order.
    ///
    /// Success is decided by the status alone. The returned order holds the
    /// response fields over the patched ones; anything neither mentions is
    /// left at its default.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id, otherwise any transport or
    /// status error; never retried.
    pub async fn update_order(&self, id: u64, patch: &OrderPatch) -> Result<Order, ApiError> {
        let url = self.endpoint_url(&format!("orders/{id}"), &[])?;
        let body = self.send_write(Method::PUT, &url, Some(patch)).await?;
        Ok(written_order(patch, &body, Some(id)))
    }

    /// Deletes an order. The response body is ignored.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id, otherwise any transport or
    /// status error; never retried.
    pub async fn delete_order(&self, id: u64) -> Result<(), ApiError> {
        let url = self.endpoint_url(&format!("orders/{id}"), &[])?;
        self.send_write::<()>(Method::DELETE, &url, None).await?;
        Ok(())
    }
}

/// Builds the order a successful write produced from what was sent and
/// whatever the response echoed back.
///
/// The response id wins, then `known_id`, then 0 when the store returned
/// none at all.
fn written_order<T: Serialize>(sent: &T, body: &str, known_id: Option<u64>) -> Order {
    let mut fields = match serde_json::to_value(sent) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(echoed)) => fields.extend(echoed),
        Ok(_) => tracing::warn!("order write response is not a JSON object; using sent fields"),
        Err(e) if body.trim().is_empty() => {
            tracing::debug!(error = %e, "order write response is empty");
        }
        Err(e) => {
            tracing::warn!(error = %e, "order write response is not JSON; using sent fields");
        }
    }

    let id = fields
        .get("id")
        .and_then(Value::as_u64)
        .or(known_id)
        .unwrap_or_default();
    if id == 0 {
        tracing::warn!("order write response carries no id");
    }
    fields.insert("id".to_owned(), Value::from(id));

    match serde_json::from_value::<Order>(Value::Object(fields)) {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "order write response has malformed fields; using sent fields"
            );
            let mut fallback = match serde_json::to_value(sent) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };
            fallback.insert("id".to_owned(), Value::from(id));
            serde_json::from_value(Value::Object(fallback)).unwrap_or_else(|_| Order {
                id,
                ..Order::default()
            })
        }
    }
}
