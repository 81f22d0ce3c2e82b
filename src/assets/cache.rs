//! Bounded image cache with deduplicated fetches.
//!
//! The cache maps an original URL to its fetched bytes so record navigation
//! can show images without refetching. It is constructor-injected (never
//! ambient state) so independent editing sessions get independent caches
//! and tests stay deterministic.
//!
//! Scene resolution itself never blocks on this cache: lookups are
//! synchronous, and a miss simply means the host displays the direct URL
//! while a background warm-up fills the entry.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::AssetPool;
use crate::ImprintError;
use crate::template::Record;

/// Fetched asset bytes plus the content type the server reported.
#[derive(Debug, Clone)]
pub struct CachedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// URL-keyed entries with strict LRU ordering by access.
struct Entries {
    map: HashMap<String, Arc<CachedAsset>>,
    /// Access order, least recent at the front.
    order: VecDeque<String>,
}

impl Entries {
    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.order.iter().position(|u| u == url) {
            let key = self.order.remove(pos).unwrap();
            self.order.push_back(key);
        }
    }
}

struct CacheInner {
    entries: Mutex<Entries>,
    /// Per-URL fetch gates: concurrent requests for one URL coalesce into
    /// a single download.
    inflight: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    client: reqwest::Client,
    capacity: usize,
}

/// Session-scoped, bounded, deduplicating image cache.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<CacheInner>,
}

impl ImageCache {
    /// Create a cache with its own HTTP client.
    pub fn new(capacity: usize) -> Result<Self, ImprintError> {
        let client = reqwest::Client::builder()
            .user_agent("imprint/0.1")
            .build()
            .map_err(|e| ImprintError::Fetch(format!("HTTP client error: {}", e)))?;
        Ok(Self::with_client(capacity, client))
    }

    /// Create a cache backed by an existing HTTP client.
    pub fn with_client(capacity: usize, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(Entries {
                    map: HashMap::new(),
                    order: VecDeque::new(),
                }),
                inflight: AsyncMutex::new(HashMap::new()),
                client,
                capacity,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().unwrap().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synchronous lookup. Marks the entry most-recently-used on a hit.
    pub fn get(&self, url: &str) -> Option<Arc<CachedAsset>> {
        let mut entries = self.inner.entries.lock().unwrap();
        let hit = entries.map.get(url).cloned();
        if hit.is_some() {
            entries.touch(url);
        }
        hit
    }

    /// Mark an entry most-recently-used without reading it. Returns whether
    /// the entry exists.
    pub fn touch(&self, url: &str) -> bool {
        let mut entries = self.inner.entries.lock().unwrap();
        let present = entries.map.contains_key(url);
        if present {
            entries.touch(url);
        }
        present
    }

    /// Insert an already-retrieved asset (host uploads, tests). Evicts the
    /// least-recently-accessed entries when over capacity.
    pub fn insert(&self, url: impl Into<String>, asset: CachedAsset) {
        self.store(url.into(), Arc::new(asset));
    }

    fn store(&self, url: String, asset: Arc<CachedAsset>) {
        if self.inner.capacity == 0 {
            return;
        }
        let mut entries = self.inner.entries.lock().unwrap();
        if entries.map.insert(url.clone(), asset).is_some() {
            entries.touch(&url);
        } else {
            entries.order.push_back(url);
        }
        while entries.map.len() > self.inner.capacity {
            // Strict LRU: front of the order queue goes first. Dropping the
            // Arc releases the bytes once readers finish.
            if let Some(evicted) = entries.order.pop_front() {
                entries.map.remove(&evicted);
                debug!(url = %evicted, "evicted cache entry");
            }
        }
    }

    /// Fetch a URL into the cache, deduplicating concurrent requests.
    ///
    /// Failures leave existing entries untouched; callers fall back to the
    /// uncached original URL.
    pub async fn fetch(&self, url: &str) -> Result<Arc<CachedAsset>, ImprintError> {
        if let Some(hit) = self.get(url) {
            return Ok(hit);
        }

        let gate = {
            let mut inflight = self.inner.inflight.lock().await;
            inflight
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        // Only one task per URL downloads; the rest wait here and then
        // find the entry already cached.
        let _guard = gate.lock().await;
        if let Some(hit) = self.get(url) {
            return Ok(hit);
        }

        let result = self.download(url).await;

        {
            let mut inflight = self.inner.inflight.lock().await;
            inflight.remove(url);
        }

        match result {
            Ok(asset) => {
                let asset = Arc::new(asset);
                self.store(url.to_string(), asset.clone());
                Ok(asset)
            }
            Err(e) => {
                warn!(url, error = %e, "asset fetch failed");
                Err(e)
            }
        }
    }

    async fn download(&self, url: &str) -> Result<CachedAsset, ImprintError> {
        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImprintError::Fetch(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(ImprintError::Fetch(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImprintError::Fetch(format!("Failed to read {}: {}", url, e)))?;
        Ok(CachedAsset {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// Prefetch everything a batch of records could display: every record
    /// field that matches a pool asset (or is itself an image reference),
    /// plus every pool entry. Fetches run in parallel; individual failures
    /// are logged and skipped.
    pub async fn prefetch_records(&self, records: &[Record], pool: &AssetPool) {
        let mut urls: HashSet<String> = HashSet::new();
        for record in records {
            urls.extend(candidate_urls(record, pool));
        }
        urls.extend(pool.urls().map(str::to_string));
        self.fetch_all(urls).await;
    }

    /// Warm a sliding window around the current record — previous, current,
    /// next, next+1 — so forward/backward navigation appears instantaneous
    /// without unbounded growth. Safe to call redundantly; superseded
    /// warm-ups complete harmlessly because entries are keyed by URL.
    pub async fn warm_adjacent(&self, records: &[Record], pool: &AssetPool, current: usize) {
        let mut urls: HashSet<String> = HashSet::new();
        let window = [
            current.checked_sub(1),
            Some(current),
            current.checked_add(1),
            current.checked_add(2),
        ];
        for index in window.into_iter().flatten() {
            if let Some(record) = records.get(index) {
                urls.extend(candidate_urls(record, pool));
            }
        }
        self.fetch_all(urls).await;
    }

    async fn fetch_all(&self, urls: HashSet<String>) {
        let mut tasks = JoinSet::new();
        for url in urls {
            if self.touch(&url) {
                continue;
            }
            let cache = self.clone();
            tasks.spawn(async move {
                // Failure already logged in fetch(); prefetch is best-effort
                let _ = cache.fetch(&url).await;
            });
        }
        while tasks.join_next().await.is_some() {}
    }
}

/// URLs a record could cause the resolver to display: pool matches first,
/// then field values that are themselves image references.
fn candidate_urls<'a>(
    record: &'a Record,
    pool: &'a AssetPool,
) -> impl Iterator<Item = String> + 'a {
    record.values().filter_map(|value| {
        if let Some(url) = pool.match_value(value) {
            Some(url.to_string())
        } else if super::looks_like_image_reference(value) {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}
