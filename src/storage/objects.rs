//! First-party object storage for re-hosted photos
//!
//! Objects are addressed publicly as
//! `<public_base_url>/storage/v1/object/public/<bucket>/<key>`, which is the
//! first-party shape the cache validator trusts.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::validate::STORAGE_SIGNATURE;
use crate::{Error, Result};

/// Upload target for re-hosted images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under a key derived from `name_hint` and return the public URL
    async fn put(&self, name_hint: &str, bytes: &[u8], content_type: Option<&str>) -> Result<String>;
}

/// Filesystem-backed bucket served by the proxy's HTTP server
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory holding the bucket's objects
    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of an object key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}{}/{}", self.public_base_url, STORAGE_SIGNATURE, self.bucket, key)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.bucket_dir().join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, name_hint: &str, bytes: &[u8], content_type: Option<&str>) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::ObjectStore(format!("refusing empty object for {}", name_hint)));
        }

        let key = object_key(name_hint, bytes, content_type);
        let path = self.path_for(&key);
        ensure_parent(&path).await?;
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(self.public_url(&key))
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

fn slug_pattern() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"))
}

/// Lowercase ASCII slug of a place name, e.g. `Tanah Lot` → `tanah-lot`
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = slug_pattern().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "place".to_string()
    } else {
        slug.to_string()
    }
}

/// Content-addressed object key: `<slug>-<hash prefix>.<ext>`
pub fn object_key(name_hint: &str, bytes: &[u8], content_type: Option<&str>) -> String {
    let hash = blake3::hash(bytes).to_hex();
    format!("{}-{}.{}", slugify(name_hint), &hash.as_str()[..16], extension_for(content_type))
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_lowercase());

    match mime.as_deref() {
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        _ => "jpg",
    }
}
