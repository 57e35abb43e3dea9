//! Stateful storefront services built on a [`crate::StoreBackend`].
//!
//! - [`CatalogSession`]: incremental catalog browsing with local refinement.
//! - [`CartService`]: the persisted cart, its priced summary, and checkout.
//! - [`OrderDesk`]: listing, viewing, editing, and deleting placed orders.
//!
//! Reads degrade to empty results and queue a [`storefront_core::Notice`];
//! writes return their errors to the caller.

mod cart;
mod catalog;
mod orders;

#[cfg(test)]
pub(crate) mod fake;

pub use cart::{CartService, CartSummary, SubmitError};
pub use catalog::{CatalogSession, LoadOutcome, PageTicket};
pub use orders::{EditError, OrderDesk, OrderDetails};
