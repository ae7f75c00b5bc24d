//! Route layer over the mirror's query surface.
//!
//! A thin consumer of `CatalogStore::find_by_term`; the cache-building
//! core never depends on anything here.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use imago_core::{CatalogStore, Item};

use crate::error::ApiError;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: CatalogStore,
}

/// Body of a search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<Item>,
}

/// Body of a status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub items: usize,
    pub pages: usize,
    pub last_refresh: Option<String>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search/{term}", get(handle_search))
        .route("/status", get(handle_status))
        .with_state(state)
}

/// `GET /search/{term}`: substring lookup over the mirror.
///
/// Safe to call while a crawl is in flight; an empty or partially built
/// mirror yields an empty `data` array, never an error.
async fn handle_search(
    Path(term): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::debug!("search term: {}", term);
    let data = state.store.find_by_term(&term).await?;
    Ok(Json(SearchResponse { data }))
}

/// `GET /status`: mirror size and the last completed refresh.
async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        items: state.store.item_count().await,
        pages: state.store.page_count().await,
        last_refresh: state.store.last_refresh().await.map(|t| t.to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn state_with_items() -> AppState {
        let store = CatalogStore::new();
        let item: Item = serde_json::from_value(json!({
            "id": 1,
            "cropped_picture": "http://x/c.jpg",
            "full_picture": "http://x/f.jpg",
            "title": "Red Fox",
        }))
        .unwrap();
        store.upsert_item(item).await;
        AppState { store }
    }

    #[tokio::test]
    async fn test_search_returns_matching_items() {
        let state = state_with_items().await;
        let Json(response) = handle_search(Path("fox".into()), State(state)).await.unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].id, 1);
    }

    #[tokio::test]
    async fn test_search_empty_mirror_returns_empty_data() {
        let state = AppState { store: CatalogStore::new() };
        let Json(response) = handle_search(Path("anything".into()), State(state)).await.unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_counts() {
        let state = state_with_items().await;
        let Json(status) = handle_status(State(state)).await;
        assert_eq!(status.items, 1);
        assert_eq!(status.pages, 0);
        assert!(status.last_refresh.is_none());
    }
}
