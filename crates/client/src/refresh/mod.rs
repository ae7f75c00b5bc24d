//! Background refresh loop.
//!
//! Runs the crawler forever on a fixed interval, independent of request
//! handling. Every cycle outcome, completed or aborted partway through
//! the catalog, is logged and then forgotten: the loop sleeps and starts
//! the next cycle unconditionally, leaving stale or partial data for the
//! next cycle to correct.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::crawl::{CrawlOutcome, Crawler};

/// Spawn the refresh loop as a background task.
///
/// The returned handle can be used to abort the loop on shutdown; the
/// loop itself never exits on its own.
pub fn spawn_refresh_loop(crawler: Arc<Crawler>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tracing::info!("starting refresh cycle");
            match crawler.crawl().await {
                CrawlOutcome::Completed { pages } => {
                    tracing::info!("refresh cycle completed: {} pages", pages);
                }
                CrawlOutcome::Aborted { page, error } => {
                    tracing::warn!("refresh cycle aborted at page {}: {}", page, error);
                }
            }
            tracing::debug!("sleeping {:?} until next refresh cycle", interval);
            tokio::time::sleep(interval).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenGuard;
    use crate::download::Downloader;
    use crate::fetch::Fetcher;
    use imago_core::CatalogStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_loop_survives_aborted_cycles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "auth": true,
                "token": "tok"
            })))
            .mount(&server)
            .await;
        // every page fetch fails, so every cycle aborts
        Mock::given(method("GET"))
            .and(path("/images"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let token = Arc::new(TokenGuard::new(
            http.clone(),
            format!("{}/auth", server.uri()),
            "key".into(),
        ));
        let dir = tempfile::tempdir().unwrap();
        let crawler = Arc::new(Crawler::new(
            Fetcher::new(http.clone(), token, 1),
            Downloader::new(http, dir.path().to_path_buf(), 1024),
            CatalogStore::new(),
            format!("{}/images", server.uri()),
            2,
        ));

        let handle = spawn_refresh_loop(Arc::clone(&crawler), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;

        // still running after several aborted cycles
        assert!(!handle.is_finished());
        let page_requests = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/images")
            .count();
        assert!(page_requests >= 2, "expected repeated cycles, saw {page_requests}");

        handle.abort();
    }
}
