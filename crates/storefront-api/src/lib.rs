pub mod backend;
pub mod client;
pub mod error;
pub mod pagination;
mod retry;
pub mod session;
pub mod types;

pub use backend::StoreBackend;
pub use client::{ApiClient, MIN_AUTOCOMPLETE_CHARS};
pub use error::ApiError;
pub use session::{
    CartService, CartSummary, CatalogSession, EditError, LoadOutcome, OrderDesk, OrderDetails,
    PageTicket, SubmitError,
};
pub use types::{GoodsLookup, GoodsPage, GoodsQuery, PageInfo};
