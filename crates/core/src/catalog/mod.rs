//! In-memory mirror of the remote catalog.
//!
//! The store owns the three structures the crawl populates: the page set
//! (keyed by content fingerprint), the item store, and the inverted search
//! index. A single `RwLock` guards all three so the invariant "every
//! indexed id exists in the item store" holds under concurrent readers;
//! queries take short read locks and never block on an in-progress crawl
//! cycle beyond an individual map update.

pub mod fingerprint;
pub mod index;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

pub use fingerprint::page_fingerprint;
pub use index::SearchIndex;

use crate::Error;
use crate::model::{Item, Page};

#[derive(Debug, Default)]
struct MirrorState {
    pages: HashMap<String, Page>,
    items: HashMap<u64, Item>,
    index: SearchIndex,
    last_refresh: Option<DateTime<Utc>>,
}

/// Shared handle to the in-memory mirror.
///
/// Cheap to clone; all clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    state: Arc<RwLock<MirrorState>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page under its content fingerprint.
    ///
    /// The first page seen for a fingerprint wins; identical content seen
    /// again is not re-stored. Returns whether the fingerprint was new.
    pub async fn record_page(&self, fingerprint: String, page: Page) -> bool {
        let mut state = self.state.write().await;
        if state.pages.contains_key(&fingerprint) {
            tracing::debug!("page {} already recorded under {}", page.page, fingerprint);
            return false;
        }
        state.pages.insert(fingerprint, page);
        true
    }

    /// Store an item under its id (overwriting any previous record) and
    /// feed its scalar field values into the search index.
    ///
    /// Storage and indexing happen under one write lock, so a concurrent
    /// query can never observe an indexed id without its item.
    pub async fn upsert_item(&self, item: Item) {
        let mut state = self.state.write().await;
        state.index.index_item(&item);
        state.items.insert(item.id, item);
    }

    /// Resolve every item whose indexed values contain `term`.
    ///
    /// Pure read; a query against an empty or partially built mirror
    /// returns an empty result, never an error. The one failure mode is an
    /// indexed id missing from the item store, which is a corrupted-mirror
    /// bug and surfaces as `Error::MissingItem`.
    pub async fn find_by_term(&self, term: &str) -> Result<Vec<Item>, Error> {
        let state = self.state.read().await;
        let mut results = Vec::new();
        for id in state.index.matching_ids(term) {
            let item = state.items.get(&id).ok_or(Error::MissingItem(id))?;
            results.push(item.clone());
        }
        Ok(results)
    }

    /// Stamp the completion of a crawl cycle.
    pub async fn mark_refreshed(&self) {
        let mut state = self.state.write().await;
        state.last_refresh = Some(Utc::now());
    }

    /// When the last crawl cycle completed, if any has.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_refresh
    }

    /// Number of distinct pages recorded.
    pub async fn page_count(&self) -> usize {
        self.state.read().await.pages.len()
    }

    /// Number of items mirrored.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }
}
