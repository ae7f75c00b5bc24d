//! Page crawler and item processor.
//!
//! One crawl cycle walks the paginated resource from page 1 until the
//! server reports no more pages, dispatching every page's items through a
//! bounded concurrent fan-out. Faults never escape a cycle as panics or
//! raised errors: `crawl` reports an explicit [`CrawlOutcome`] the refresh
//! scheduler matches on, so "abort this cycle only" is a return value.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};

use crate::auth::TokenGuard;
use crate::download::Downloader;
use crate::fetch::{Fetcher, build_http_client};
use imago_core::model::{Item, Page, PictureStub};
use imago_core::{AppConfig, CatalogStore, Error, page_fingerprint};

/// Result of one crawl cycle.
#[derive(Debug)]
pub enum CrawlOutcome {
    /// Every page up to `hasMore = false` was processed.
    Completed { pages: u32 },
    /// The cycle ended early; the mirror keeps whatever the cycle managed
    /// to store before the fault.
    Aborted { page: u32, error: Error },
}

/// Walks the remote catalog and populates the mirror.
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: Fetcher,
    downloader: Downloader,
    store: CatalogStore,
    resource_url: String,
    concurrency: usize,
}

impl Crawler {
    pub fn new(
        fetcher: Fetcher,
        downloader: Downloader,
        store: CatalogStore,
        resource_url: String,
        concurrency: usize,
    ) -> Self {
        Self { fetcher, downloader, store, resource_url, concurrency }
    }

    /// Assemble a crawler from configuration: shared HTTP client, token
    /// guard, fetcher, and downloader. Creates the image root directory.
    pub fn from_config(config: &AppConfig, store: CatalogStore) -> Result<Self, Error> {
        std::fs::create_dir_all(&config.image_root).map_err(|e| Error::Storage {
            path: config.image_root.display().to_string(),
            message: e.to_string(),
        })?;

        let http = build_http_client(config.timeout())?;
        let token = Arc::new(TokenGuard::new(http.clone(), config.auth_url(), config.api_key.clone()));
        let fetcher = Fetcher::new(http.clone(), token, config.max_retries);
        let downloader = Downloader::new(http, config.image_root.clone(), config.chunk_size);

        Ok(Self::new(fetcher, downloader, store, config.resource_url(), config.concurrency))
    }

    /// The mirror this crawler populates.
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Run one crawl cycle over the whole catalog.
    ///
    /// Pages are walked strictly in increasing order; page `n + 1` starts
    /// only after every item of page `n` finished processing. The first
    /// unavailable page, invalid page, or item fault aborts the cycle.
    pub async fn crawl(&self) -> CrawlOutcome {
        let mut page_num: u32 = 1;
        let mut has_more = true;
        let mut pages_done: u32 = 0;

        while has_more {
            tracing::debug!("fetching page {}", page_num);
            let raw = match self
                .fetcher
                .fetch_json(&self.resource_url, &[("page", page_num.to_string())])
                .await
            {
                Ok(raw) => raw,
                Err(error) => return CrawlOutcome::Aborted { page: page_num, error },
            };

            let page = match Page::from_value(&raw) {
                Ok(page) => page,
                Err(error) => return CrawlOutcome::Aborted { page: page_num, error },
            };

            let fingerprint = page_fingerprint(&raw);
            self.store.record_page(fingerprint, page.clone()).await;

            // items are dispatched whether or not the fingerprint was new
            if let Err(error) = self.process_page(&page).await {
                return CrawlOutcome::Aborted { page: page_num, error };
            }

            pages_done += 1;
            has_more = page.has_more;
            page_num += 1;
        }

        self.store.mark_refreshed().await;
        tracing::info!("crawl cycle processed {} pages", pages_done);
        CrawlOutcome::Completed { pages: pages_done }
    }

    /// Fan out the page's items, at most `concurrency` in flight.
    ///
    /// All siblings are awaited before this returns; a failed item does
    /// not cancel the others, it only decides the page's result.
    async fn process_page(&self, page: &Page) -> Result<(), Error> {
        let ids: Vec<u64> = page.pictures.iter().map(|stub: &PictureStub| stub.id).collect();
        let results: Vec<Result<(), Error>> = stream::iter(ids)
            .map(|id| self.process_item(id))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.into_iter().collect::<Result<Vec<_>, Error>>()?;
        Ok(())
    }

    /// Fetch one item's detail, mirror it, and download both its assets.
    async fn process_item(&self, id: u64) -> Result<(), Error> {
        let detail = self
            .fetcher
            .fetch_json(&format!("{}/{}", self.resource_url, id), &[])
            .await?;
        let item: Item =
            serde_json::from_value(detail).map_err(|e| Error::Parse(format!("invalid item {id}: {e}")))?;

        let cropped = item.cropped_picture.clone();
        let full = item.full_picture.clone();

        // metadata lands in the mirror before the asset downloads start
        self.store.upsert_item(item).await;

        // both downloads are awaited even when one fails
        let (cropped_result, full_result) =
            tokio::join!(self.downloader.download(&cropped), self.downloader.download(&full));
        cropped_result?;
        full_result?;

        tracing::debug!("item {} processed", id);
        Ok(())
    }
}
