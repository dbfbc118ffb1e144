//! URL-keyed cache of decoded images with in-flight request deduplication.
//!
//! Concurrent loads of the same URL share one download through a
//! [`futures::future::Shared`] future kept in an in-flight map. The shared
//! future inserts its result into the LRU before removing its in-flight entry,
//! so a caller arriving in between always finds one or the other. Each
//! download runs as a spawned task, so loads must be awaited inside a Tokio
//! runtime.
//!
//! Lock order is in-flight map, then entries. The download future only ever
//! takes one of the two at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use image::DynamicImage;
use tracing::debug;

use crate::traits::{Headers, HttpClient};

/// Default maximum number of cached images.
pub const DEFAULT_COUNT_LIMIT: usize = 100;

/// Default maximum total decoded size (100 MiB).
pub const DEFAULT_COST_LIMIT: usize = 100 * 1024 * 1024;

type SharedLoad = Shared<BoxFuture<'static, Option<Arc<DynamicImage>>>>;

/// Eviction bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCacheConfig {
    pub count_limit: usize,
    /// Bytes of decoded pixel data.
    pub cost_limit: usize,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            count_limit: DEFAULT_COUNT_LIMIT,
            cost_limit: DEFAULT_COST_LIMIT,
        }
    }
}

impl ImageCacheConfig {
    pub fn with_count_limit(mut self, count_limit: usize) -> Self {
        self.count_limit = count_limit;
        self
    }

    pub fn with_cost_limit(mut self, cost_limit: usize) -> Self {
        self.cost_limit = cost_limit;
        self
    }
}

struct CachedImage {
    image: Arc<DynamicImage>,
    cost: usize,
}

/// LRU bookkeeping: `access_order` runs from least to most recently used.
struct LruImages {
    images: HashMap<String, CachedImage>,
    access_order: Vec<String>,
    total_cost: usize,
    config: ImageCacheConfig,
}

impl LruImages {
    fn new(config: ImageCacheConfig) -> Self {
        Self {
            images: HashMap::new(),
            access_order: Vec::new(),
            total_cost: 0,
            config,
        }
    }

    fn get(&mut self, url: &str) -> Option<Arc<DynamicImage>> {
        let image = self.images.get(url)?.image.clone();
        self.touch(url);
        Some(image)
    }

    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == url) {
            let key = self.access_order.remove(pos);
            self.access_order.push(key);
        }
    }

    fn insert(&mut self, url: &str, image: Arc<DynamicImage>) {
        let cost = image_cost(&image);
        if cost > self.config.cost_limit {
            debug!("Image {} ({} bytes) exceeds cache cost limit; not cached", url, cost);
            return;
        }
        if let Some(old) = self.images.remove(url) {
            self.total_cost -= old.cost;
            self.access_order.retain(|k| k != url);
        }
        self.images.insert(url.to_string(), CachedImage { image, cost });
        self.access_order.push(url.to_string());
        self.total_cost += cost;
        self.evict();
    }

    fn evict(&mut self) {
        while self.images.len() > self.config.count_limit
            || self.total_cost > self.config.cost_limit
        {
            if self.access_order.is_empty() {
                break;
            }
            let oldest = self.access_order.remove(0);
            if let Some(evicted) = self.images.remove(&oldest) {
                self.total_cost -= evicted.cost;
                debug!("Evicted cached image {}", oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.images.clear();
        self.access_order.clear();
        self.total_cost = 0;
    }
}

fn image_cost(image: &DynamicImage) -> usize {
    image.as_bytes().len()
}

/// Shared image loader.
///
/// Failures of any kind resolve to `None`; callers show a placeholder.
pub struct ImageCache {
    http: Arc<dyn HttpClient>,
    entries: Arc<Mutex<LruImages>>,
    in_flight: Arc<Mutex<HashMap<String, SharedLoad>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ImageCache {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_config(http, ImageCacheConfig::default())
    }

    pub fn with_config(http: Arc<dyn HttpClient>, config: ImageCacheConfig) -> Self {
        Self {
            http,
            entries: Arc::new(Mutex::new(LruImages::new(config))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load the image at `url`, from cache if present.
    pub async fn load(&self, url: &str) -> Option<Arc<DynamicImage>> {
        if let Some(image) = lock(&self.entries).get(url) {
            debug!("Image cache hit: {}", url);
            return Some(image);
        }

        let pending = {
            let mut in_flight = lock(&self.in_flight);
            // A load may have completed between the first check and taking
            // the in-flight lock.
            if let Some(image) = lock(&self.entries).get(url) {
                return Some(image);
            }
            match in_flight.get(url) {
                Some(pending) => {
                    debug!("Joining in-flight image load: {}", url);
                    pending.clone()
                }
                None => {
                    debug!("Image cache miss: {}", url);
                    let pending = self.download(url.to_string());
                    in_flight.insert(url.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn download(&self, url: String) -> SharedLoad {
        let http = Arc::clone(&self.http);
        let entries = Arc::clone(&self.entries);
        let in_flight = Arc::clone(&self.in_flight);

        // Runs as its own task so the in-flight entry is cleared even if
        // every caller is dropped mid-download.
        let task = tokio::spawn(async move {
            let image = fetch_and_decode(http.as_ref(), &url).await.map(Arc::new);
            if let Some(image) = &image {
                lock(&entries).insert(&url, Arc::clone(image));
            }
            lock(&in_flight).remove(&url);
            image
        });

        task.map(|joined| joined.ok().flatten()).boxed().shared()
    }

    pub fn contains(&self, url: &str) -> bool {
        lock(&self.entries).images.contains_key(url)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded bytes currently held.
    pub fn total_cost(&self) -> usize {
        lock(&self.entries).total_cost
    }

    /// Drop every cached image. In-flight loads still complete and insert.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub fn config(&self) -> ImageCacheConfig {
        lock(&self.entries).config
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("len", &self.len())
            .field("total_cost", &self.total_cost())
            .finish_non_exhaustive()
    }
}

async fn fetch_and_decode(http: &dyn HttpClient, url: &str) -> Option<DynamicImage> {
    let response = match http.get(url, &Headers::new()).await {
        Ok(response) => response,
        Err(e) => {
            debug!("Image download failed for {}: {}", url, e);
            return None;
        }
    };
    if !response.is_success() {
        debug!("Image download for {} returned HTTP {}", url, response.status);
        return None;
    }
    match image::load_from_memory(&response.body) {
        Ok(image) => Some(image),
        Err(e) => {
            debug!("Failed to decode image from {}: {}", url, e);
            None
        }
    }
}
