//! Storage Layer - photo cache and first-party object storage
//!
//! System of record is SQLite with one table:
//! - place_photos(place_name, image_url, place_id, source, attribution, cached_at, updated_at)
//!
//! Re-hosted image bytes live in an object store addressed by public URL.

pub mod memory;
pub mod objects;
pub mod schema;
pub mod sqlite;

use crate::Result;
use crate::place::PlacePhotoRecord;
use async_trait::async_trait;

pub use memory::MemoryCache;
pub use objects::{LocalObjectStore, ObjectStore};
pub use sqlite::{CacheStats, SqliteStore};

/// Read-through photo cache keyed by normalized place name.
///
/// Upserts are last-write-wins with no locking. Concurrent writers for one
/// place may overwrite each other; photo URLs for a place are interchangeable.
#[async_trait]
pub trait PhotoCache: Send + Sync {
    /// Fetch the raw record for a place, unvalidated
    async fn get(&self, place_name: &str) -> Result<Option<PlacePhotoRecord>>;

    /// Insert or overwrite the record for `record.place_name`
    async fn upsert(&self, record: &PlacePhotoRecord) -> Result<()>;
}
