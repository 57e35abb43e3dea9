//! In-memory [`StoreBackend`] for session tests.

use std::cell::{Cell, RefCell};

use chrono::NaiveDate;
use storefront_core::{Good, NewOrder, Order, OrderPatch};

use crate::backend::StoreBackend;
use crate::error::ApiError;
use crate::types::{GoodsLookup, GoodsPage, GoodsQuery};

pub(crate) fn good(
    id: u64,
    category: &str,
    actual_price: u32,
    discount_price: Option<u32>,
    rating: f64,
) -> Good {
    Good {
        id,
        name: format!("Good {id}"),
        main_category: category.to_owned(),
        sub_category: String::new(),
        actual_price,
        discount_price,
        rating,
        image_url: String::new(),
    }
}

pub(crate) fn order(id: u64, good_ids: &[u64]) -> Order {
    Order {
        id,
        full_name: "Ada Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        phone: "+7 900 000-00-00".to_owned(),
        subscribe: false,
        delivery_address: "1 Analytical St".to_owned(),
        delivery_date: NaiveDate::from_ymd_opt(2026, 10, 20),
        delivery_interval: "08:00-12:00".to_owned(),
        comment: None,
        good_ids: good_ids.to_vec(),
        total_price: None,
        created_at: None,
    }
}

fn server_error() -> ApiError {
    ApiError::UnexpectedStatus {
        status: 500,
        url: "https://store.test/api".to_owned(),
        body: "internal error".to_owned(),
    }
}

/// Serves goods in pages with no pagination summary, so callers fall back
/// to page-length detection. Records every call.
///
/// Pages are sliced in insertion order unless [`FakeStore::paged_in_sort_order`]
/// is set, in which case each request is sorted by its own sort key first.
#[derive(Default)]
pub(crate) struct FakeStore {
    goods: Vec<Good>,
    sorted_pages: bool,
    orders: RefCell<Vec<Order>>,
    next_order_id: Cell<u64>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    goods_requests: RefCell<Vec<GoodsQuery>>,
    lookups: Cell<usize>,
    autocomplete_calls: Cell<usize>,
    created: RefCell<Vec<NewOrder>>,
    patches: RefCell<Vec<(u64, OrderPatch)>>,
}

impl FakeStore {
    pub(crate) fn with_goods(goods: impl IntoIterator<Item = Good>) -> Self {
        Self {
            goods: goods.into_iter().collect(),
            next_order_id: Cell::new(100),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        let store = Self::default();
        store.fail_reads.set(true);
        store.fail_writes.set(true);
        store
    }

    pub(crate) fn paged_in_sort_order(mut self) -> Self {
        self.sorted_pages = true;
        self
    }

    pub(crate) fn with_orders(self, orders: Vec<Order>) -> Self {
        *self.orders.borrow_mut() = orders;
        self
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub(crate) fn goods_requests(&self) -> Vec<GoodsQuery> {
        self.goods_requests.borrow().clone()
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.get()
    }

    pub(crate) fn autocomplete_calls(&self) -> usize {
        self.autocomplete_calls.get()
    }

    pub(crate) fn created(&self) -> Vec<NewOrder> {
        self.created.borrow().clone()
    }

    pub(crate) fn patches(&self) -> Vec<(u64, OrderPatch)> {
        self.patches.borrow().clone()
    }

    pub(crate) fn order_ids(&self) -> Vec<u64> {
        self.orders.borrow().iter().map(|o| o.id).collect()
    }
}

impl StoreBackend for FakeStore {
    async fn list_goods(&self, request: &GoodsQuery) -> Result<GoodsPage, ApiError> {
        self.goods_requests.borrow_mut().push(request.clone());
        if self.fail_reads.get() {
            return Err(server_error());
        }
        let per_page = request.per_page.max(1) as usize;
        let start = (request.page.max(1) as usize - 1) * per_page;
        let mut ordered = self.goods.clone();
        if self.sorted_pages {
            storefront_core::catalog::sort_goods(&mut ordered, request.sort.unwrap_or_default());
        }
        let goods = ordered.into_iter().skip(start).take(per_page).collect();
        Ok(GoodsPage {
            goods,
            pagination: None,
        })
    }

    async fn goods_by_ids(&self, ids: &[u64]) -> Result<GoodsLookup, ApiError> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail_reads.get() {
            return Err(server_error());
        }
        let mut lookup = GoodsLookup::default();
        for &id in ids {
            match self.goods.iter().find(|g| g.id == id) {
                Some(good) => lookup.found.push(good.clone()),
                None => lookup.missing.push(id),
            }
        }
        Ok(lookup)
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<String>, ApiError> {
        self.autocomplete_calls.set(self.autocomplete_calls.get() + 1);
        if self.fail_reads.get() {
            return Err(server_error());
        }
        Ok(vec![query.to_owned()])
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        if self.fail_reads.get() {
            return Err(server_error());
        }
        Ok(self.orders.borrow().clone())
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, ApiError> {
        self.created.borrow_mut().push(new_order.clone());
        if self.fail_writes.get() {
            return Err(server_error());
        }
        let id = self.next_order_id.get();
        self.next_order_id.set(id + 1);
        let stored = Order {
            id,
            full_name: new_order.full_name.clone(),
            email: new_order.email.clone(),
            phone: new_order.phone.clone(),
            subscribe: new_order.subscribe,
            delivery_address: new_order.delivery_address.clone(),
            delivery_date: Some(new_order.delivery_date),
            delivery_interval: new_order.delivery_interval.clone(),
            comment: Some(new_order.comment.clone()).filter(|c| !c.is_empty()),
            good_ids: new_order.good_ids.clone(),
            total_price: None,
            created_at: None,
        };
        self.orders.borrow_mut().push(stored.clone());
        Ok(stored)
    }

    async fn update_order(&self, id: u64, patch: &OrderPatch) -> Result<Order, ApiError> {
        self.patches.borrow_mut().push((id, patch.clone()));
        if self.fail_writes.get() {
            return Err(server_error());
        }
        let mut orders = self.orders.borrow_mut();
        let Some(stored) = orders.iter_mut().find(|o| o.id == id) else {
            return Err(ApiError::NotFound {
                url: format!("https://store.test/api/orders/{id}"),
            });
        };
        stored.apply_patch(patch);
        Ok(stored.clone())
    }

    async fn delete_order(&self, id: u64) -> Result<(), ApiError> {
        if self.fail_writes.get() {
            return Err(server_error());
        }
        let mut orders = self.orders.borrow_mut();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(ApiError::NotFound {
                url: format!("https://store.test/api/orders/{id}"),
            });
        }
        Ok(())
    }
}
