//! # Jelajah - destination photo resolution
//!
//! Finds a usable photo for an Indonesian travel destination by walking a
//! fixed chain of tiers, first success wins:
//! - persisted cache (read only, URL-shape validated)
//! - server-side Places proxy that re-hosts the first photo
//! - Wikipedia page thumbnail (Indonesian, then English)
//! - curated static table
//! - category default
//!
//! The chain never fails: the last tier is an unconditional default.

pub mod catalog;
pub mod config;
pub mod fetch;
pub mod place;
pub mod resolver;
pub mod server;
pub mod source;
pub mod storage;
pub mod ui;
pub mod validate;
pub mod view;

// Re-exports for convenient access
pub use place::{PhotoRequest, PlacePhotoRecord, ResolutionResult, normalize_place_name};
pub use resolver::{Resolver, ResolverBuilder};
pub use source::PhotoSource;
pub use storage::{MemoryCache, PhotoCache, SqliteStore};
pub use validate::UrlPolicy;

/// Result type alias for Jelajah operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Jelajah operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Place name must not be empty")]
    EmptyPlaceName,

    #[error("Unknown photo source: {0}")]
    UnknownSource(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    ObjectStore(String),
}
