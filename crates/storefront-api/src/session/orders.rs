//! Placed orders: list, view, edit, delete.

use chrono::NaiveDate;
use storefront_core::{DeliveryFeePolicy, Good, Notice, Order, OrderDraft, OrderValidationError};
use thiserror::Error;

use crate::backend::StoreBackend;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    #[error("store rejected the update: {0}")]
    Api(#[from] ApiError),

    #[error("order {0} is not in the current order list")]
    UnknownOrder(u64),
}

/// An order with its goods resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<Good>,
    pub missing: Vec<u64>,
    /// Stored total when the store provides one, else recomputed from
    /// current prices. `None` when the goods could not be resolved.
    pub total: Option<u64>,
}

/// The customer's order list as last fetched from the store.
#[derive(Debug, Default)]
pub struct OrderDesk {
    orders: Vec<Order>,
    policy: DeliveryFeePolicy,
    notices: Vec<Notice>,
}

impl OrderDesk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn find(&self, id: u64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replaces the local list with the store's. A failed fetch leaves the
    /// list empty and queues an error notice.
    pub async fn refresh<B: StoreBackend>(&mut self, backend: &B) -> &[Order] {
        match backend.list_orders().await {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "orders refreshed");
                self.orders = orders;
            }
            Err(e) => {
                tracing::warn!(error = %e, "order list failed to load");
                self.orders.clear();
                self.notices
                    .push(Notice::error(format!("Could not load orders: {e}")));
            }
        }
        &self.orders
    }

    /// A form pre-filled from order `id`.
    #[must_use]
    pub fn edit_form(&self, id: u64) -> Option<OrderDraft> {
        self.find(id).map(OrderDraft::from_order)
    }

    /// Validates `draft` and sends it as a partial update of order `id`.
    /// On success the local copy takes the patch plus whatever the store
    /// echoed back.
    ///
    /// # Errors
    ///
    /// - [`EditError::UnknownOrder`] when `id` is not in the local list;
    ///   nothing is sent.
    /// - [`EditError::Validation`] for invalid fields; nothing is sent.
    /// - [`EditError::Api`] when the store rejects the update.
    pub async fn update<B: StoreBackend>(
        &mut self,
        backend: &B,
        id: u64,
        draft: &OrderDraft,
    ) -> Result<Order, EditError> {
        if self.find(id).is_none() {
            return Err(EditError::UnknownOrder(id));
        }
        let patch = draft.to_patch()?;
        let echoed = backend.update_order(id, &patch).await?;

        // The store may echo only part of the order; keep what it omits.
        let updated = match self.orders.iter_mut().find(|o| o.id == id) {
            Some(slot) => {
                slot.apply_patch(&patch);
                if !echoed.good_ids.is_empty() {
                    slot.good_ids = echoed.good_ids;
                }
                slot.total_price = echoed.total_price.or(slot.total_price);
                slot.created_at = echoed.created_at.or(slot.created_at);
                slot.clone()
            }
            None => echoed,
        };
        tracing::info!(order_id = id, "order updated");
        self.notices
            .push(Notice::success(format!("Order {id} updated")));
        Ok(updated)
    }

    /// Deletes order `id`, then refreshes the list.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the local list is left untouched.
    pub async fn delete<B: StoreBackend>(&mut self, backend: &B, id: u64) -> Result<(), ApiError> {
        backend.delete_order(id).await?;
        tracing::info!(order_id = id, "order deleted");
        self.notices
            .push(Notice::success(format!("Order {id} deleted")));
        self.refresh(backend).await;
        Ok(())
    }

    /// Resolves the goods of order `id` and its total.
    ///
    /// A recomputed total prices delivery as of the order's creation date
    /// (or `today` when the store does not report one). Returns `None` when
    /// `id` is not in the local list.
    pub async fn details<B: StoreBackend>(
        &mut self,
        backend: &B,
        id: u64,
        today: NaiveDate,
    ) -> Option<OrderDetails> {
        let order = self.find(id)?.clone();

        let lookup = match backend.goods_by_ids(&order.good_ids).await {
            Ok(lookup) => lookup,
            Err(e) => {
                tracing::warn!(order_id = id, error = %e, "order goods failed to load");
                self.notices
                    .push(Notice::error(format!("Could not load goods for order {id}: {e}")));
                return Some(OrderDetails {
                    total: order.total_price,
                    order,
                    lines: Vec::new(),
                    missing: Vec::new(),
                });
            }
        };

        let total = order.total_price.or_else(|| {
            let reference = order.created_at.map_or(today, |at| at.date());
            let subtotal: u64 = lookup
                .found
                .iter()
                .map(|g| u64::from(g.effective_price()))
                .sum();
            let fee = self.policy.fee(
                order.delivery_date,
                Some(order.delivery_interval.as_str()),
                reference,
            );
            Some(subtotal + u64::from(fee))
        });

        Some(OrderDetails {
            order,
            lines: lookup.found,
            missing: lookup.missing,
            total,
        })
    }
}
