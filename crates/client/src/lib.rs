//! Client code for the imago mirror.
//!
//! This crate provides the cache-building core: the token guard, the
//! retrying fetcher, the asset downloader, the page crawler with its item
//! processor, and the background refresh loop that ties them together.

pub mod auth;
pub mod crawl;
pub mod download;
pub mod fetch;
pub mod refresh;

pub use auth::TokenGuard;
pub use crawl::{CrawlOutcome, Crawler};
pub use download::Downloader;
pub use fetch::{Fetcher, build_http_client};
pub use refresh::spawn_refresh_loop;
