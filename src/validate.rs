//! Cache URL shape validation
//!
//! Cached URLs are trusted only when they contain a known-good signature and
//! none of the known-bad legacy signatures. This is substring matching, not
//! URL parsing. The legacy check runs first, so a legacy marker rejects a URL
//! even when it also carries a good signature.

/// First-party storage path signature
pub const STORAGE_SIGNATURE: &str = "/storage/v1/object/public/";
/// Places photo API signature
pub const PLACES_PHOTO_SIGNATURE: &str = "maps.googleapis.com/maps/api/place/photo";
/// Third-party user-content CDN signature
pub const USER_CONTENT_SIGNATURE: &str = "googleusercontent.com";

/// Photo URLs built before the photo reference was available
pub const UNDEFINED_REFERENCE_SIGNATURE: &str = "photo_reference=undefined";
/// Retired random-image endpoint
pub const UNSPLASH_SOURCE_SIGNATURE: &str = "source.unsplash.com";

pub const DEFAULT_ACCEPTED: &[&str] = &[
    STORAGE_SIGNATURE,
    PLACES_PHOTO_SIGNATURE,
    USER_CONTENT_SIGNATURE,
];

pub const DEFAULT_LEGACY: &[&str] = &[UNDEFINED_REFERENCE_SIGNATURE, UNSPLASH_SOURCE_SIGNATURE];

/// Verdict for a single cached URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlVerdict {
    Accepted,
    /// Carries the given legacy signature
    Legacy(String),
    /// Matches no accepted signature
    Unrecognized,
}

/// Accepted and legacy signature lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPolicy {
    accepted: Vec<String>,
    legacy: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self {
            accepted: DEFAULT_ACCEPTED.iter().map(|s| s.to_string()).collect(),
            legacy: DEFAULT_LEGACY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UrlPolicy {
    /// Default lists extended with extra signatures. Blank entries are ignored.
    pub fn with_extra(accepted: &[String], legacy: &[String]) -> Self {
        let mut policy = Self::default();
        for sig in accepted.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !policy.accepted.iter().any(|a| a == sig) {
                policy.accepted.push(sig.to_string());
            }
        }
        for sig in legacy.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !policy.legacy.iter().any(|l| l == sig) {
                policy.legacy.push(sig.to_string());
            }
        }
        policy
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub fn legacy(&self) -> &[String] {
        &self.legacy
    }

    /// Classify a raw stored URL
    pub fn check(&self, url: &str) -> UrlVerdict {
        if let Some(sig) = self.legacy.iter().find(|sig| url.contains(sig.as_str())) {
            return UrlVerdict::Legacy(sig.clone());
        }

        if self.accepted.iter().any(|sig| url.contains(sig.as_str())) {
            UrlVerdict::Accepted
        } else {
            UrlVerdict::Unrecognized
        }
    }

    /// Return the URL if it can be trusted, `None` otherwise
    pub fn accept<'a>(&self, url: &'a str) -> Option<&'a str> {
        match self.check(url) {
            UrlVerdict::Accepted => Some(url),
            _ => None,
        }
    }
}
