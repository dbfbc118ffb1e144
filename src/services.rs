//! Explicitly constructed service graph.
//!
//! One [`Services`] value owns the shared client, bookmark store and image
//! cache; sessions are created from it and hold `Arc`s into it.

use std::sync::Arc;

use tracing::info;

use crate::adapters::{FileKeyValueStore, ReqwestHttpClient, TokioSleeper};
use crate::api::RemoteUserClient;
use crate::bookmarks::BookmarkStore;
use crate::config::AppConfig;
use crate::image_cache::ImageCache;
use crate::models::UserRecord;
use crate::reachability::NetworkReachabilityMonitor;
use crate::session::{BookmarksSession, UserDetailSession, UserListSession};
use crate::traits::{HttpClient, KeyValueStore, Reachability, Sleeper};

pub struct Services {
    config: AppConfig,
    storage: Arc<dyn KeyValueStore>,
    monitor: Option<Arc<NetworkReachabilityMonitor>>,
    client: Arc<RemoteUserClient>,
    bookmarks: Arc<BookmarkStore>,
    images: Arc<ImageCache>,
}

impl Services {
    /// Production wiring: reqwest, files under `config.data_dir`, tokio timers.
    ///
    /// Must be called inside a tokio runtime when `config.probe_interval` is
    /// set, since the probe is spawned immediately.
    pub fn from_config(config: AppConfig) -> Self {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(config.request_timeout));
        let monitor = Arc::new(NetworkReachabilityMonitor::new());
        if let Some(interval) = config.probe_interval {
            monitor.start_monitoring(Arc::clone(&http), config.api_base_url.clone(), interval);
        }
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_dir));
        info!("Using data directory {}", config.data_dir.display());

        let mut services = Self::with_parts(
            config,
            http,
            Arc::clone(&monitor) as Arc<dyn Reachability>,
            storage,
            Arc::new(TokioSleeper),
        );
        services.monitor = Some(monitor);
        services
    }

    /// Wire the graph from caller-supplied adapters.
    pub fn with_parts(
        config: AppConfig,
        http: Arc<dyn HttpClient>,
        reachability: Arc<dyn Reachability>,
        storage: Arc<dyn KeyValueStore>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let client = Arc::new(
            RemoteUserClient::new(Arc::clone(&http), reachability, sleeper)
                .with_base_url(config.api_base_url.clone()),
        );
        let bookmarks = Arc::new(BookmarkStore::new(Arc::clone(&storage)));
        let images = Arc::new(ImageCache::with_config(http, config.image_cache_config()));
        Self {
            config,
            storage,
            monitor: None,
            client,
            bookmarks,
            images,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<RemoteUserClient> {
        &self.client
    }

    pub fn bookmarks(&self) -> &Arc<BookmarkStore> {
        &self.bookmarks
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// The reachability monitor, when built by [`Services::from_config`].
    pub fn monitor(&self) -> Option<&Arc<NetworkReachabilityMonitor>> {
        self.monitor.as_ref()
    }

    pub fn user_list_session(&self) -> UserListSession {
        UserListSession::new(
            Arc::clone(&self.client),
            Arc::clone(&self.bookmarks),
            Arc::clone(&self.storage),
            self.config.fetch_options(),
        )
    }

    pub fn bookmarks_session(&self) -> BookmarksSession {
        BookmarksSession::new(Arc::clone(&self.bookmarks))
    }

    pub fn user_detail_session(&self, user: UserRecord) -> UserDetailSession {
        UserDetailSession::new(user, Arc::clone(&self.bookmarks), Arc::clone(&self.images))
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .field("bookmarks", &self.bookmarks)
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}
