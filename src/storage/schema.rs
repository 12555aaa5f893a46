//! Database schema definitions

/// SQL to create the place photo cache table
pub const CREATE_PLACE_PHOTOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS place_photos (
    place_name TEXT PRIMARY KEY,
    image_url TEXT NOT NULL,
    place_id TEXT,
    source TEXT NOT NULL,
    attribution TEXT,
    cached_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_place_photos_source ON place_photos(source)",
    "CREATE INDEX IF NOT EXISTS idx_place_photos_updated ON place_photos(updated_at)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_PLACE_PHOTOS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
