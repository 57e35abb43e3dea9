//! Incremental catalog browsing.
//!
//! Pages are fetched from the store one at a time. Local filters are applied
//! to each new page before it is appended, so a refined page can be shorter
//! than `per_page`; the accumulated list is re-sorted after every append.
//!
//! Every [`CatalogSession::reset`] starts a new generation. A page fetched
//! for an older generation is dropped when it arrives.

use storefront_core::catalog::{self, Facet};
use storefront_core::{FilterCriteria, Good, Notice};

use crate::backend::StoreBackend;
use crate::client::MIN_AUTOCOMPLETE_CHARS;
use crate::error::ApiError;
use crate::pagination::has_more;
use crate::types::{GoodsPage, GoodsQuery};

/// What happened to a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; `added` goods survived the local filters.
    Loaded { added: usize, total: usize },
    /// A load for the current query is already in flight; this one was dropped.
    Busy,
    /// The store has no further pages for the current query.
    Exhausted,
    /// The page belonged to a superseded query and was discarded.
    Stale,
    /// The fetch failed; nothing was added and a notice was queued.
    Failed { message: String },
}

/// Permission to fetch one page, tied to the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    request: GoodsQuery,
}

impl PageTicket {
    #[must_use]
    pub fn request(&self) -> &GoodsQuery {
        &self.request
    }
}

#[derive(Debug)]
pub struct CatalogSession {
    per_page: u32,
    criteria: FilterCriteria,
    generation: u64,
    next_page: u32,
    more_available: bool,
    loading: bool,
    /// Everything fetched for the current generation, before local filters.
    fetched: Vec<Good>,
    /// `fetched` refined and sorted by `criteria`.
    items: Vec<Good>,
    notices: Vec<Notice>,
}

impl CatalogSession {
    #[must_use]
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
            criteria: FilterCriteria::default(),
            generation: 0,
            next_page: 1,
            more_available: true,
            loading: false,
            fetched: Vec::new(),
            items: Vec::new(),
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Refined, sorted goods accumulated for the current query.
    #[must_use]
    pub fn items(&self) -> &[Good] {
        &self.items
    }

    /// Categories present in everything fetched so far, ignoring the local
    /// filters so selected checkboxes never disappear.
    #[must_use]
    pub fn facets(&self) -> Vec<Facet> {
        catalog::facets(&self.fetched)
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.more_available
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drains queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Starts a new query. Results, pagination, and any in-flight load of
    /// the previous generation are abandoned.
    pub fn reset(&mut self, criteria: FilterCriteria) {
        self.generation += 1;
        self.criteria = criteria;
        self.next_page = 1;
        self.more_available = true;
        self.loading = false;
        self.fetched.clear();
        self.items.clear();
        tracing::debug!(generation = self.generation, "catalog query reset");
    }

    /// Changes only the local filters and re-applies them to what has
    /// already been fetched, without a request.
    ///
    /// Returns `false` (and changes nothing) when the text query or the sort
    /// key differs. Both are sent to the store, so pages already fetched
    /// belong to the old ordering and the next page would overlap or skip
    /// goods. Ask again via [`Self::reset`] in that case.
    pub fn refilter(&mut self, criteria: FilterCriteria) -> bool {
        if criteria.text_query() != self.criteria.text_query()
            || criteria.sort != self.criteria.sort
        {
            return false;
        }
        self.criteria = criteria;
        self.items = catalog::apply(self.fetched.clone(), &self.criteria);
        true
    }

    /// Reserves the next page for fetching.
    ///
    /// Returns `None` while a load of the current generation is in flight or
    /// when no pages remain.
    pub fn begin_load(&mut self) -> Option<PageTicket> {
        if self.loading || !self.more_available {
            return None;
        }
        self.loading = true;
        Some(PageTicket {
            generation: self.generation,
            request: GoodsQuery {
                page: self.next_page,
                per_page: self.per_page,
                query: self.criteria.text_query().map(str::to_owned),
                sort: Some(self.criteria.sort),
            },
        })
    }

    /// Merges the result of a ticket's fetch.
    pub fn apply_page(
        &mut self,
        ticket: PageTicket,
        result: Result<GoodsPage, ApiError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale catalog page"
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    page = ticket.request.page,
                    error = %e,
                    "catalog page failed to load"
                );
                let message = format!("Could not load goods: {e}");
                self.notices.push(Notice::error(message.clone()));
                return LoadOutcome::Failed { message };
            }
        };

        self.more_available = has_more(&page, ticket.request.per_page);
        self.next_page = ticket.request.page + 1;

        let refined = catalog::refine(page.goods.clone(), &self.criteria);
        let added = refined.len();
        self.fetched.extend(page.goods);
        self.items.extend(refined);
        catalog::sort_goods(&mut self.items, self.criteria.sort);

        LoadOutcome::Loaded {
            added,
            total: self.items.len(),
        }
    }

    /// Fetches and merges the next page.
    pub async fn load_next<B: StoreBackend>(&mut self, backend: &B) -> LoadOutcome {
        let Some(ticket) = self.begin_load() else {
            return if self.loading {
                LoadOutcome::Busy
            } else {
                LoadOutcome::Exhausted
            };
        };
        let result = backend.list_goods(ticket.request()).await;
        self.apply_page(ticket, result)
    }

    /// Resets to `criteria` and loads the first page.
    pub async fn search<B: StoreBackend>(
        &mut self,
        backend: &B,
        criteria: FilterCriteria,
    ) -> LoadOutcome {
        self.reset(criteria);
        self.load_next(backend).await
    }

    /// Completion suggestions for a partial query. Short inputs and failures
    /// yield an empty list; failures also queue a notice.
    pub async fn suggest<B: StoreBackend>(&mut self, backend: &B, partial: &str) -> Vec<String> {
        if partial.trim().chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Vec::new();
        }
        match backend.autocomplete(partial).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(error = %e, "autocomplete failed");
                self.notices
                    .push(Notice::error(format!("Suggestions unavailable: {e}")));
                Vec::new()
            }
        }
    }
}
