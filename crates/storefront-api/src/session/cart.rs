//! The persisted cart, its priced summary, and checkout.

use chrono::NaiveDate;
use storefront_core::{
    AddOutcome, Cart, CartStorage, CartStoreError, DeliveryFeePolicy, Good, Notice, Order,
    OrderDraft, OrderValidationError,
};
use thiserror::Error;

use crate::backend::StoreBackend;
use crate::error::ApiError;

/// Cart contents priced against the store's current prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSummary {
    /// Resolved goods in cart order.
    pub lines: Vec<Good>,
    /// Cart ids the store no longer knows. They are not charged.
    pub missing: Vec<u64>,
    pub subtotal: u64,
    pub delivery_fee: u32,
    pub total: u64,
}

impl CartSummary {
    fn priced(lines: Vec<Good>, missing: Vec<u64>, delivery_fee: u32) -> Self {
        let subtotal: u64 = lines.iter().map(|g| u64::from(g.effective_price())).sum();
        Self {
            lines,
            missing,
            subtotal,
            delivery_fee,
            total: subtotal + u64::from(delivery_fee),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    #[error("store rejected the order: {0}")]
    Api(#[from] ApiError),

    /// The order was placed but the emptied cart could not be saved.
    #[error("order {order_id} was placed but the cart could not be cleared: {source}")]
    Storage {
        order_id: u64,
        #[source]
        source: CartStoreError,
    },
}

/// Owns the cart for one session. Every mutation is written through to
/// storage before the call returns.
pub struct CartService<S: CartStorage> {
    storage: S,
    cart: Cart,
    policy: DeliveryFeePolicy,
    notices: Vec<Notice>,
}

impl<S: CartStorage> CartService<S> {
    /// Loads the stored cart. Unreadable storage starts an empty cart.
    pub fn open(storage: S) -> Self {
        let cart = storage.load();
        tracing::debug!(items = cart.len(), "cart loaded");
        Self {
            storage,
            cart,
            policy: DeliveryFeePolicy::default(),
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: DeliveryFeePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Adds `id` and persists. Adding an id already present changes nothing
    /// and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError`] when the updated cart cannot be saved. The
    /// in-memory cart is rolled back so it matches what is stored.
    pub fn add(&mut self, id: u64) -> Result<AddOutcome, CartStoreError> {
        let outcome = self.mutate(|cart| cart.add(id))?;
        if outcome == AddOutcome::Added {
            self.notices.push(Notice::success(format!("Good {id} added to the cart")));
        } else {
            self.notices.push(Notice::info(format!("Good {id} is already in the cart")));
        }
        Ok(outcome)
    }

    /// Removes `id` and persists. Returns `false` when it was not present.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError`] when the updated cart cannot be saved; the
    /// id stays in the cart.
    pub fn remove(&mut self, id: u64) -> Result<bool, CartStoreError> {
        self.mutate(|cart| cart.remove(id))
    }

    /// Empties the cart and persists the empty state.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError`] when the empty cart cannot be saved; the
    /// cart keeps its contents.
    pub fn reset(&mut self) -> Result<(), CartStoreError> {
        let previous = std::mem::take(&mut self.cart);
        if let Err(e) = self.storage.save(&self.cart) {
            self.cart = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Applies `change` and saves when the id list actually changed. A failed
    /// save restores the previous contents.
    fn mutate<T>(&mut self, change: impl FnOnce(&mut Cart) -> T) -> Result<T, CartStoreError> {
        let previous = self.cart.clone();
        let result = change(&mut self.cart);
        if self.cart == previous {
            return Ok(result);
        }
        if let Err(e) = self.storage.save(&self.cart) {
            tracing::warn!(error = %e, "cart save failed; keeping previous contents");
            self.cart = previous;
            return Err(e);
        }
        Ok(result)
    }

    /// Prices the cart for delivery on `date` in `interval`.
    ///
    /// An empty cart is summarised as all zeros without a request. When the
    /// lookup fails the summary is empty and an error notice is queued.
    pub async fn summary<B: StoreBackend>(
        &mut self,
        backend: &B,
        date: Option<NaiveDate>,
        interval: Option<&str>,
        today: NaiveDate,
    ) -> CartSummary {
        if self.cart.is_empty() {
            return CartSummary::default();
        }
        match backend.goods_by_ids(self.cart.ids()).await {
            Ok(lookup) => {
                if !lookup.missing.is_empty() {
                    self.notices.push(Notice::info(format!(
                        "{} item(s) in the cart are no longer sold",
                        lookup.missing.len()
                    )));
                }
                let fee = self.policy.fee(date, interval, today);
                CartSummary::priced(lookup.found, lookup.missing, fee)
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart lookup failed");
                self.notices
                    .push(Notice::error(format!("Could not load the cart: {e}")));
                CartSummary::default()
            }
        }
    }

    /// Places an order for the current cart contents.
    ///
    /// The draft's item list is replaced by the cart. Nothing is sent when
    /// validation fails. The cart is cleared and saved only after the store
    /// accepts the order.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Validation`] listing every offending field.
    /// - [`SubmitError::Api`] when the store rejects or cannot be reached;
    ///   the cart is left intact.
    /// - [`SubmitError::Storage`] when the order was created but the emptied
    ///   cart could not be saved. The in-memory cart stays empty so the same
    ///   goods are not ordered twice; storage still holds the old ids.
    pub async fn submit<B: StoreBackend>(
        &mut self,
        backend: &B,
        draft: &OrderDraft,
    ) -> Result<Order, SubmitError> {
        let draft = OrderDraft {
            items: self.cart.ids().to_vec(),
            ..draft.clone()
        };
        let new_order = draft.to_new_order()?;

        let order = backend.create_order(&new_order).await?;
        tracing::info!(order_id = order.id, items = new_order.good_ids.len(), "order placed");

        self.cart.clear();
        self.storage
            .save(&self.cart)
            .map_err(|source| SubmitError::Storage {
                order_id: order.id,
                source,
            })?;
        self.notices
            .push(Notice::success(format!("Order {} placed", order.id)));
        Ok(order)
    }
}
