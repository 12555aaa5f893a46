//! Resolution orchestrator
//!
//! Walks the tiers in strict order and returns the first success:
//! 1. cache (read only, URL-shape validated)
//! 2. delegated proxy
//! 3. encyclopedia thumbnail, one language after another
//! 4. curated static table
//! 5. category default
//!
//! Each tier returns `Result<_, Miss>`; a miss is logged and the next tier
//! runs. Tier 5 cannot miss, so [`Resolver::resolve`] is total.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::catalog::{category_fallback, curated_match};
use crate::fetch::{EncyclopediaApi, FoundPhoto, Miss, PhotoProxy};
use crate::place::{PhotoRequest, PlacePhotoRecord, ResolutionResult};
use crate::source::PhotoSource;
use crate::storage::PhotoCache;
use crate::validate::{UrlPolicy, UrlVerdict};

/// Languages tried by the encyclopedia tier, in order
pub const DEFAULT_LANGUAGES: &[&str] = &["id", "en"];

/// How cache write-backs are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteBack {
    /// Spawned and not awaited; the caller gets its result immediately
    #[default]
    Detached,
    /// Awaited before returning; failures are still only logged
    Awaited,
}

type Inflight = Mutex<HashMap<PhotoRequest, Arc<OnceCell<ResolutionResult>>>>;

/// Multi-tier photo resolver
pub struct Resolver {
    cache: Arc<dyn PhotoCache>,
    proxy: Option<Arc<dyn PhotoProxy>>,
    encyclopedia: Option<Arc<dyn EncyclopediaApi>>,
    languages: Vec<String>,
    policy: UrlPolicy,
    write_back: WriteBack,
    inflight: Option<Inflight>,
}

impl Resolver {
    pub fn builder(cache: Arc<dyn PhotoCache>) -> ResolverBuilder {
        ResolverBuilder::new(cache)
    }

    pub fn policy(&self) -> &UrlPolicy {
        &self.policy
    }

    /// Resolve a photo for `request`. Never fails.
    pub async fn resolve(&self, request: &PhotoRequest) -> ResolutionResult {
        match &self.inflight {
            Some(inflight) => self.resolve_shared(inflight, request).await,
            None => self.resolve_chain(request).await,
        }
    }

    /// Single-flight: identical concurrent requests share one chain run
    async fn resolve_shared(&self, inflight: &Inflight, request: &PhotoRequest) -> ResolutionResult {
        let cell = {
            let mut map = inflight.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(map.entry(request.clone()).or_default())
        };

        let result = cell.get_or_init(|| self.resolve_chain(request)).await.clone();

        let mut map = inflight.lock().unwrap_or_else(|p| p.into_inner());
        if map.get(request).is_some_and(|current| Arc::ptr_eq(current, &cell)) {
            map.remove(request);
        }

        result
    }

    async fn resolve_chain(&self, request: &PhotoRequest) -> ResolutionResult {
        let name = request.place_name.as_str();

        match self.from_cache(request).await {
            Ok(result) => {
                tracing::info!("Resolved {:?} from cache", name);
                return result;
            }
            Err(miss) => tracing::debug!("Cache tier missed for {:?}: {}", name, miss),
        }

        match self.from_proxy(request).await {
            Ok(found) => return self.finish(request, found).await,
            Err(miss) => tracing::debug!("Proxy tier missed for {:?}: {}", name, miss),
        }

        match self.from_encyclopedia(request).await {
            Ok(found) => return self.finish(request, found).await,
            Err(miss) => tracing::debug!("Encyclopedia tier missed for {:?}: {}", name, miss),
        }

        match from_curated(request) {
            Ok(found) => return self.finish(request, found).await,
            Err(miss) => tracing::debug!("Curated tier missed for {:?}: {}", name, miss),
        }

        let url = category_fallback(name, request.category.as_deref());
        tracing::info!("Resolved {:?} from category fallback", name);
        ResolutionResult::new(url, PhotoSource::Fallback)
    }

    async fn finish(&self, request: &PhotoRequest, found: FoundPhoto) -> ResolutionResult {
        tracing::info!("Resolved {:?} via {}", request.place_name, found.source);
        if !found.source.is_cacheable() {
            return found.into();
        }
        // rows the cache tier would reject are never stored
        if self.policy.accept(&found.image_url).is_none() {
            tracing::debug!(
                "Not caching {:?}: {} is not an accepted url shape",
                request.place_name,
                found.image_url
            );
            return found.into();
        }
        self.write_back(found.to_record(&request.place_name)).await;
        found.into()
    }

    async fn write_back(&self, record: PlacePhotoRecord) {
        match self.write_back {
            WriteBack::Awaited => store_record(self.cache.as_ref(), &record).await,
            WriteBack::Detached => {
                let cache = Arc::clone(&self.cache);
                tokio::spawn(async move {
                    store_record(cache.as_ref(), &record).await;
                });
            }
        }
    }

    // ========== Tiers ==========

    async fn from_cache(&self, request: &PhotoRequest) -> Result<ResolutionResult, Miss> {
        let record = self
            .cache
            .get(&request.place_name)
            .await
            .map_err(|e| Miss::Cache(e.to_string()))?
            .ok_or(Miss::NotCached)?;

        match self.policy.check(&record.image_url) {
            UrlVerdict::Accepted => Ok(ResolutionResult::from(&record)),
            UrlVerdict::Legacy(sig) => Err(Miss::Rejected(format!("legacy signature {}", sig))),
            UrlVerdict::Unrecognized => Err(Miss::Rejected("unrecognized url shape".to_string())),
        }
    }

    async fn from_proxy(&self, request: &PhotoRequest) -> Result<FoundPhoto, Miss> {
        let proxy = self.proxy.as_ref().ok_or(Miss::Disabled)?;
        proxy.fetch(request).await
    }

    async fn from_encyclopedia(&self, request: &PhotoRequest) -> Result<FoundPhoto, Miss> {
        let api = self.encyclopedia.as_ref().ok_or(Miss::Disabled)?;

        let mut last = Miss::Disabled;
        for language in &self.languages {
            match api.thumbnail(language, &request.place_name, request.max_width).await {
                Ok(url) => {
                    return Ok(FoundPhoto::new(url, PhotoSource::Wikimedia)
                        .with_attribution(Some(format!("Wikipedia ({})", language))));
                }
                Err(miss) => {
                    tracing::debug!("No {} thumbnail for {:?}: {}", language, request.place_name, miss);
                    last = miss;
                }
            }
        }

        Err(last)
    }
}

fn from_curated(request: &PhotoRequest) -> Result<FoundPhoto, Miss> {
    curated_match(&request.place_name)
        .map(|url| FoundPhoto::new(url, PhotoSource::Curated))
        .ok_or(Miss::NoResults)
}

async fn store_record(cache: &dyn PhotoCache, record: &PlacePhotoRecord) {
    if let Err(e) = cache.upsert(record).await {
        tracing::warn!("Failed to cache photo for {:?}: {}", record.place_name, e);
    }
}

/// Builder for [`Resolver`]
pub struct ResolverBuilder {
    cache: Arc<dyn PhotoCache>,
    proxy: Option<Arc<dyn PhotoProxy>>,
    encyclopedia: Option<Arc<dyn EncyclopediaApi>>,
    languages: Vec<String>,
    policy: UrlPolicy,
    write_back: WriteBack,
    single_flight: bool,
}

impl ResolverBuilder {
    pub fn new(cache: Arc<dyn PhotoCache>) -> Self {
        Self {
            cache,
            proxy: None,
            encyclopedia: None,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            policy: UrlPolicy::default(),
            write_back: WriteBack::default(),
            single_flight: false,
        }
    }

    pub fn proxy(mut self, proxy: Option<Arc<dyn PhotoProxy>>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn encyclopedia(mut self, api: Option<Arc<dyn EncyclopediaApi>>) -> Self {
        self.encyclopedia = api;
        self
    }

    /// Encyclopedia languages in lookup order; blank codes are dropped
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages = languages
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        self
    }

    pub fn policy(mut self, policy: UrlPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn write_back(mut self, write_back: WriteBack) -> Self {
        self.write_back = write_back;
        self
    }

    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            cache: self.cache,
            proxy: self.proxy,
            encyclopedia: self.encyclopedia,
            languages: self.languages,
            policy: self.policy,
            write_back: self.write_back,
            inflight: self.single_flight.then(|| Mutex::new(HashMap::new())),
        }
    }
}
