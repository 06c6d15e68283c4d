use crate::api::{ListingForm, ListingQuery, PortalApi};
use crate::error::Result;
use crate::models::Listing;
use crate::stores::{report_load_failure, UnauthorizedSignal};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    /// Query the current items answer
    pub query: ListingQuery,
    pub listings: Vec<Listing>,
    /// Latest result per query, so sections sharing the store keep their own set
    pub results: HashMap<ListingQuery, Vec<Listing>>,
    pub loading: bool,
    pub loaded: bool,
    in_flight: usize,
    applied: u64,
    applied_per_query: HashMap<ListingQuery, u64>,
}

impl ListingState {
    pub fn get(&self, id: i64) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    pub fn results_for(&self, query: &ListingQuery) -> Option<&[Listing]> {
        self.results.get(query).map(Vec::as_slice)
    }

    /// Record a completed fetch. Results older than what is already held are dropped.
    fn apply(&mut self, seq: u64, query: ListingQuery, listings: Vec<Listing>) {
        let newest_for_query = self.applied_per_query.get(&query).copied().unwrap_or(0);
        if seq > newest_for_query {
            self.applied_per_query.insert(query.clone(), seq);
            self.results.insert(query.clone(), listings.clone());
        }
        if seq > self.applied {
            self.applied = seq;
            self.query = query;
            self.listings = listings;
            self.loaded = true;
        }
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }
}

/// Listing store
pub struct ListingStore {
    api: Arc<dyn PortalApi>,
    unauthorized: UnauthorizedSignal,
    next_seq: AtomicU64,
    state: watch::Sender<ListingState>,
}

impl ListingStore {
    pub fn new(api: Arc<dyn PortalApi>, unauthorized: UnauthorizedSignal) -> Self {
        let (state, _) = watch::channel(ListingState::default());
        Self {
            api,
            unauthorized,
            next_seq: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListingState {
        self.state.borrow().clone()
    }

    pub async fn load(&self) {
        self.fetch(ListingQuery::All).await
    }

    pub async fn load_by_status(&self, status: &str) {
        self.fetch(ListingQuery::Status(status.to_string())).await
    }

    pub async fn load_featured(&self) {
        self.fetch(ListingQuery::Featured).await
    }

    pub async fn load_by_category(&self, category_id: i64) {
        self.fetch(ListingQuery::Category(category_id)).await
    }

    /// Refresh every query held, the current one last so it stays current.
    pub async fn reload(&self) {
        let (current, mut others) = {
            let state = self.state.borrow();
            let others: Vec<ListingQuery> = state
                .results
                .keys()
                .filter(|q| **q != state.query)
                .cloned()
                .collect();
            (state.query.clone(), others)
        };
        others.push(current);
        for query in others {
            self.fetch(query).await;
        }
    }

    async fn fetch(&self, query: ListingQuery) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.in_flight += 1;
            s.loading = true;
        });
        match self.api.list_listings(&query).await {
            Ok(listings) => {
                debug!("Loaded {} listings for {:?} (#{})", listings.len(), query, seq);
                self.state.send_modify(|s| {
                    s.apply(seq, query, listings);
                    s.finish();
                });
            }
            Err(e) => {
                report_load_failure("Loading listings", &e, &self.unauthorized);
                self.state.send_modify(|s| s.finish());
            }
        }
    }

    pub async fn create(&self, form: &ListingForm) -> Result<Listing> {
        let created = self.api.create_listing(form).await?;
        info!("Created listing {} ({})", created.id, created.name);
        self.reload().await;
        Ok(created)
    }

    pub async fn update(&self, id: i64, form: &ListingForm) -> Result<Listing> {
        let updated = self.api.update_listing(id, form).await?;
        info!("Updated listing {}", id);
        self.reload().await;
        Ok(updated)
    }

    /// Flip only the `featured` flag, then reload.
    pub async fn set_featured(&self, id: i64, featured: bool) -> Result<()> {
        self.api.set_featured(id, featured).await?;
        info!("Listing {} featured={}", id, featured);
        self.reload().await;
        Ok(())
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.api.delete_listing(id).await?;
        info!("Deleted listing {}", id);
        self.reload().await;
        Ok(())
    }
}
