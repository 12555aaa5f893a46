//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::{PhotoCache, schema};
use crate::Result;
use crate::place::{PlacePhotoRecord, normalize_place_name};
use crate::source::PhotoSource;

const SELECT_COLUMNS: &str =
    "SELECT place_name, image_url, place_id, source, attribution, cached_at, updated_at FROM place_photos";

/// SQLite-backed photo cache
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // a panic mid-statement leaves nothing half-written in SQLite
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn();
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Photo Operations ==========

    /// Insert or update the photo for a place.
    ///
    /// The first `cached_at` is kept; every other column is overwritten.
    pub fn upsert_photo(&self, record: &PlacePhotoRecord) -> Result<()> {
        self.conn().execute(
            r#"
            INSERT INTO place_photos (place_name, image_url, place_id, source, attribution, cached_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(place_name) DO UPDATE SET
                image_url = excluded.image_url,
                place_id = excluded.place_id,
                source = excluded.source,
                attribution = excluded.attribution,
                updated_at = excluded.updated_at
            "#,
            params![
                normalize_place_name(&record.place_name),
                record.image_url,
                record.place_id,
                record.source.as_str(),
                record.attribution,
                record.cached_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get the photo record for a place
    pub fn get_photo(&self, place_name: &str) -> Result<Option<PlacePhotoRecord>> {
        let key = normalize_place_name(place_name);
        self.conn()
            .query_row(
                &format!("{} WHERE place_name = ?1", SELECT_COLUMNS),
                [&key],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List records, most recently updated first
    pub fn list_photos(&self, limit: usize) -> Result<Vec<PlacePhotoRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY updated_at DESC, place_name LIMIT ?1",
            SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map([limit as i64], row_to_record)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    /// Count all cached photos
    pub fn count_photos(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM place_photos", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Row counts per source
    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) FROM place_photos GROUP BY source ORDER BY COUNT(*) DESC, source",
        )?;

        let by_source: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                let source: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((source, count as usize))
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(CacheStats {
            photos: by_source.iter().map(|(_, n)| n).sum(),
            by_source,
        })
    }
}

/// Helper to convert a row to a PlacePhotoRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<PlacePhotoRecord> {
    let source_str: String = row.get(3)?;
    let source: PhotoSource = source_str.parse().map_err(|e: crate::Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(PlacePhotoRecord {
        place_name: row.get(0)?,
        image_url: row.get(1)?,
        place_id: row.get(2)?,
        source,
        attribution: row.get(4)?,
        cached_at: parse_timestamp(row, 5)?,
        updated_at: parse_timestamp(row, 6)?,
    })
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[async_trait]
impl PhotoCache for SqliteStore {
    async fn get(&self, place_name: &str) -> Result<Option<PlacePhotoRecord>> {
        self.get_photo(place_name)
    }

    async fn upsert(&self, record: &PlacePhotoRecord) -> Result<()> {
        self.upsert_photo(record)
    }
}

/// Cache statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub photos: usize,
    pub by_source: Vec<(String, usize)>,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        writeln!(f, "  Photos: {}", self.photos)?;
        for (source, count) in &self.by_source {
            writeln!(f, "  {}: {}", source, count)?;
        }
        Ok(())
    }
}
