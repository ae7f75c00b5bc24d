//! Core types and shared functionality for the imago mirror.
//!
//! This crate provides:
//! - The in-memory catalog store (pages, items, inverted search index)
//! - Wire types for the remote catalog API
//! - Unified error types
//! - Configuration structures

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;

pub use catalog::{CatalogStore, SearchIndex, page_fingerprint};
pub use config::AppConfig;
pub use error::Error;
pub use model::{Item, Page, PictureStub};
