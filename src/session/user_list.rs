//! Paged user list with infinite-scroll continuation and local search.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::{FetchOptions, RemoteUserClient};
use crate::bookmarks::BookmarkStore;
use crate::error::FetchError;
use crate::models::{UserRecord, UserSummary};
use crate::traits::KeyValueStore;

/// Storage key for the seed pinning the current list ordering.
pub const PAGINATION_SEED_KEY: &str = "pagination_seed";

/// How close to the end of the list a visible row must be to trigger the
/// next page.
pub const PREFETCH_THRESHOLD: usize = 5;

const EVENT_CAPACITY: usize = 32;

/// Notifications for whoever renders the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    LoadingStarted,
    LoadingFinished,
    UsersUpdated,
    SearchResultsUpdated,
    LoadFailed(FetchError),
}

/// What a call to [`UserListSession::load_next_page`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A load was already running, the list is exhausted, or the response
    /// arrived after a refresh and was dropped.
    Skipped,
    /// A page was applied; holds the number of records it contributed.
    Loaded(usize),
}

#[derive(Debug)]
struct ListState {
    users: Vec<UserRecord>,
    filtered: Vec<UserRecord>,
    search_text: String,
    is_searching: bool,
    next_page: u32,
    seed: Option<String>,
    exhausted: bool,
    loading: bool,
    generation: u64,
}

impl ListState {
    fn visible(&self) -> &[UserRecord] {
        if self.is_searching {
            &self.filtered
        } else {
            &self.users
        }
    }

    fn apply_filter(&mut self) {
        let needle = self.search_text.to_lowercase();
        self.filtered = self
            .users
            .iter()
            .filter(|u| u.matches_lowercase(&needle))
            .cloned()
            .collect();
    }

    fn clear_search(&mut self) {
        self.is_searching = false;
        self.search_text.clear();
        self.filtered.clear();
    }
}

/// State holder for the main user list.
///
/// All methods take `&self`; the session can be shared behind an `Arc` between
/// a rendering task and an input task.
pub struct UserListSession {
    client: Arc<RemoteUserClient>,
    bookmarks: Arc<BookmarkStore>,
    store: Arc<dyn KeyValueStore>,
    options: FetchOptions,
    state: Mutex<ListState>,
    events: broadcast::Sender<ListEvent>,
}

/// Clears the loading flag when a load ends, including when its future is
/// dropped mid-request. A guard from before a refresh leaves the new
/// generation's flag alone.
struct LoadingGuard<'a> {
    session: &'a UserListSession,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        if state.generation == self.generation {
            state.loading = false;
        }
    }
}

impl UserListSession {
    /// Create a session. `options` supplies page size and retry policy; its
    /// seed is ignored in favour of the persisted one.
    pub fn new(
        client: Arc<RemoteUserClient>,
        bookmarks: Arc<BookmarkStore>,
        store: Arc<dyn KeyValueStore>,
        options: FetchOptions,
    ) -> Self {
        let seed = read_seed(store.as_ref());
        if let Some(seed) = &seed {
            debug!("Resuming pagination with stored seed {}", seed);
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            bookmarks,
            store,
            options: options.with_seed(None),
            state: Mutex::new(ListState {
                users: Vec::new(),
                filtered: Vec::new(),
                search_text: String::new(),
                is_searching: false,
                next_page: 1,
                seed,
                exhausted: false,
                loading: false,
                generation: 0,
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ListEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    /// Fetch the next page and merge it into the list.
    ///
    /// Does nothing while a load is running or once the list is exhausted.
    /// On failure the cursor and exhausted flag are untouched, so calling
    /// again retries the same page.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, FetchError> {
        let (page, options, generation) = {
            let mut state = self.lock();
            if state.loading || state.exhausted {
                return Ok(LoadOutcome::Skipped);
            }
            state.loading = true;
            (
                state.next_page,
                self.options.clone().with_seed(state.seed.clone()),
                state.generation,
            )
        };
        let _guard = LoadingGuard {
            session: self,
            generation,
        };
        self.emit(ListEvent::LoadingStarted);

        let result = self.client.fetch_page(page, &options).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!("Discarding page {} response from before refresh", page);
            return Ok(LoadOutcome::Skipped);
        }
        state.loading = false;
        self.emit(ListEvent::LoadingFinished);

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Failed to load page {}: {}", page, e);
                self.emit(ListEvent::LoadFailed(e.clone()));
                return Err(e);
            }
        };

        let count = fetched.users.len();
        if fetched.is_last(self.options.page_size) {
            info!("Page {} returned {} users; list exhausted", page, count);
            state.exhausted = true;
        }
        if page == 1 {
            state.users = fetched.users;
        } else {
            state.users.extend(fetched.users);
        }
        state.next_page = page + 1;

        if state.seed.is_none() {
            self.adopt_seed(&mut state, fetched.seed);
        }

        if state.is_searching {
            state.apply_filter();
            self.emit(ListEvent::SearchResultsUpdated);
        } else {
            self.emit(ListEvent::UsersUpdated);
        }
        Ok(LoadOutcome::Loaded(count))
    }

    fn adopt_seed(&self, state: &mut ListState, seed: String) {
        debug!("Adopting pagination seed {}", seed);
        if let Err(e) = self.store.set(PAGINATION_SEED_KEY, seed.as_bytes()) {
            warn!("Failed to persist pagination seed: {}", e);
        }
        state.seed = Some(seed);
    }

    /// Load the next page if row `visible_index` is within
    /// [`PREFETCH_THRESHOLD`] rows of the end. Never triggers while searching.
    pub async fn load_more_if_needed(&self, visible_index: usize) -> Result<LoadOutcome, FetchError> {
        let should_load = {
            let state = self.lock();
            !state.is_searching
                && !state.exhausted
                && !state.loading
                && visible_index.saturating_add(PREFETCH_THRESHOLD) >= state.users.len()
        };
        if should_load {
            self.load_next_page().await
        } else {
            Ok(LoadOutcome::Skipped)
        }
    }

    /// Start over from page 1 with a fresh seed.
    ///
    /// A load already in flight is abandoned; its response is ignored.
    pub async fn refresh(&self) -> Result<LoadOutcome, FetchError> {
        {
            let mut state = self.lock();
            state.generation += 1;
            state.next_page = 1;
            state.exhausted = false;
            state.seed = None;
            state.users.clear();
            state.clear_search();
            state.loading = false;
        }
        if let Err(e) = self.store.remove(PAGINATION_SEED_KEY) {
            warn!("Failed to clear stored pagination seed: {}", e);
        }
        info!("Refreshing user list");
        self.emit(ListEvent::UsersUpdated);
        self.load_next_page().await
    }

    /// Filter the loaded users. An empty query shows the full list again.
    pub fn search(&self, text: &str) {
        let mut state = self.lock();
        if text.is_empty() {
            state.clear_search();
            self.emit(ListEvent::UsersUpdated);
            return;
        }
        state.search_text = text.to_string();
        state.is_searching = true;
        state.apply_filter();
        debug!("Search {:?} matched {} users", text, state.filtered.len());
        self.emit(ListEvent::SearchResultsUpdated);
    }

    pub fn clear_search(&self) {
        self.lock().clear_search();
        self.emit(ListEvent::UsersUpdated);
    }

    /// Flip the bookmark of the visible row `index`. Returns the new
    /// membership, or `None` if the index is out of range.
    pub fn toggle_bookmark(&self, index: usize) -> Option<bool> {
        let user = self.user_at(index)?;
        Some(self.bookmarks.toggle(&user))
    }

    /// Users currently shown: search results while searching, else everything loaded.
    pub fn visible_users(&self) -> Vec<UserRecord> {
        self.lock().visible().to_vec()
    }

    /// Every loaded user, regardless of search.
    pub fn users(&self) -> Vec<UserRecord> {
        self.lock().users.clone()
    }

    pub fn user_at(&self, index: usize) -> Option<UserRecord> {
        self.lock().visible().get(index).cloned()
    }

    pub fn summary_at(&self, index: usize) -> Option<UserSummary> {
        let user = self.user_at(index)?;
        let bookmarked = self.bookmarks.is_bookmarked(&user.unique_id());
        Some(UserSummary::new(&user, bookmarked))
    }

    pub fn is_bookmarked_at(&self, index: usize) -> bool {
        self.user_at(index)
            .is_some_and(|user| self.bookmarks.is_bookmarked(&user.unique_id()))
    }

    /// Position of `unique_id` in the full loaded list.
    pub fn index_of_user(&self, unique_id: &str) -> Option<usize> {
        self.lock().users.iter().position(|u| u.unique_id() == unique_id)
    }

    pub fn visible_count(&self) -> usize {
        self.lock().visible().len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_count() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_searching(&self) -> bool {
        self.lock().is_searching
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().exhausted
    }

    pub fn search_text(&self) -> String {
        self.lock().search_text.clone()
    }

    pub fn seed(&self) -> Option<String> {
        self.lock().seed.clone()
    }

    /// Page number the next load will request.
    pub fn next_page(&self) -> u32 {
        self.lock().next_page
    }

    /// (title, subtitle) for an empty list.
    pub fn empty_state_message(&self) -> (&'static str, &'static str) {
        if self.is_searching() {
            ("No users found", "Try adjusting your search criteria")
        } else {
            ("No users available", "Pull to refresh or check your connection")
        }
    }

    /// True while the very first page is loading.
    pub fn should_show_initial_loading(&self) -> bool {
        let state = self.lock();
        state.loading && state.users.is_empty()
    }
}

impl std::fmt::Debug for UserListSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserListSession")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

fn read_seed(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(PAGINATION_SEED_KEY) {
        Ok(Some(bytes)) => match String::from_utf8(bytes) {
            Ok(seed) if !seed.is_empty() => Some(seed),
            Ok(_) => None,
            Err(e) => {
                warn!("Stored pagination seed is not UTF-8, ignoring: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read pagination seed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::fixtures::page_json;
    use crate::adapters::mock::{
        InMemoryStore, MockHttpClient, MockResponse, RecordingSleeper, StaticReachability,
    };
    use std::time::Duration;

    const BASE: &str = "http://api.test/";

    struct Harness {
        http: MockHttpClient,
        reachability: StaticReachability,
        storage: InMemoryStore,
        bookmarks: Arc<BookmarkStore>,
        session: Arc<UserListSession>,
    }

    fn harness_with_storage(storage: InMemoryStore) -> Harness {
        let http = MockHttpClient::new();
        let reachability = StaticReachability::connected();
        let client = Arc::new(
            RemoteUserClient::new(
                Arc::new(http.clone()),
                Arc::new(reachability.clone()),
                Arc::new(RecordingSleeper::new()),
            )
            .with_base_url(BASE),
        );
        let bookmarks = Arc::new(BookmarkStore::new(Arc::new(storage.clone())));
        let session = Arc::new(UserListSession::new(
            client,
            Arc::clone(&bookmarks),
            Arc::new(storage.clone()),
            FetchOptions::default(),
        ));
        Harness {
            http,
            reachability,
            storage,
            bookmarks,
            session,
        }
    }

    fn harness() -> Harness {
        harness_with_storage(InMemoryStore::new())
    }

    fn serve_page(h: &Harness, page: u32, count: usize, seed: &str) {
        h.http
            .enqueue(MockResponse::json(200, &page_json(page, count, 25, seed)));
    }

    #[tokio::test]
    async fn test_first_page_then_append() {
        let h = harness();
        serve_page(&h, 1, 25, "abc123");
        serve_page(&h, 2, 25, "abc123");

        assert_eq!(h.session.load_next_page().await.unwrap(), LoadOutcome::Loaded(25));
        assert_eq!(h.session.load_next_page().await.unwrap(), LoadOutcome::Loaded(25));
        assert_eq!(h.session.visible_count(), 50);
        assert_eq!(h.session.next_page(), 3);
        assert!(!h.session.is_exhausted());
        assert!(!h.session.is_loading());
    }

    #[tokio::test]
    async fn test_seed_is_adopted_and_sent_with_later_pages() {
        let h = harness();
        serve_page(&h, 1, 25, "abc123");
        serve_page(&h, 2, 25, "ignored");

        h.session.load_next_page().await.unwrap();
        h.session.load_next_page().await.unwrap();

        let requests = h.http.get_requests();
        assert_eq!(requests[0].query_param("seed"), None);
        assert_eq!(requests[1].query_param("seed").as_deref(), Some("abc123"));
        assert_eq!(requests[1].query_param("page").as_deref(), Some("2"));
        assert_eq!(h.session.seed().as_deref(), Some("abc123"));
        assert_eq!(h.storage.raw(PAGINATION_SEED_KEY), Some(b"abc123".to_vec()));
    }

    #[tokio::test]
    async fn test_stored_seed_is_used_from_the_start() {
        let storage = InMemoryStore::new();
        storage.insert_raw(PAGINATION_SEED_KEY, b"persisted");
        let h = harness_with_storage(storage);
        serve_page(&h, 1, 25, "persisted");

        h.session.load_next_page().await.unwrap();
        assert_eq!(
            h.http.get_requests()[0].query_param("seed").as_deref(),
            Some("persisted")
        );
    }

    #[tokio::test]
    async fn test_short_page_exhausts() {
        let h = harness();
        serve_page(&h, 1, 10, "s");

        h.session.load_next_page().await.unwrap();
        assert!(h.session.is_exhausted());
        assert_eq!(h.session.load_next_page().await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(h.session.load_more_if_needed(9).await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(h.http.request_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_cursor() {
        let h = harness();
        h.http.enqueue(MockResponse::status(500));
        serve_page(&h, 1, 25, "s");
        let mut events = h.session.subscribe();

        let err = h.session.load_next_page().await.unwrap_err();
        assert_eq!(err, FetchError::HttpError(500));
        assert_eq!(h.session.next_page(), 1);
        assert!(!h.session.is_loading());

        assert_eq!(events.recv().await.unwrap(), ListEvent::LoadingStarted);
        assert_eq!(events.recv().await.unwrap(), ListEvent::LoadingFinished);
        assert_eq!(
            events.recv().await.unwrap(),
            ListEvent::LoadFailed(FetchError::HttpError(500))
        );

        h.session.load_next_page().await.unwrap();
        assert_eq!(h.session.visible_count(), 25);
        assert_eq!(
            h.http.get_requests()[1].query_param("page").as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_offline_load_fails_without_request() {
        let h = harness();
        h.reachability.set_connected(false);
        let err = h.session.load_next_page().await.unwrap_err();
        assert_eq!(err, FetchError::NoConnectivity);
        assert_eq!(h.http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_load_is_skipped() {
        let h = harness();
        h.http.set_delay(Duration::from_millis(20));
        serve_page(&h, 1, 25, "s");

        let (a, b) = tokio::join!(h.session.load_next_page(), h.session.load_next_page());
        assert_eq!(a.unwrap(), LoadOutcome::Loaded(25));
        assert_eq!(b.unwrap(), LoadOutcome::Skipped);
        assert_eq!(h.http.request_count(), 1);
    }

    #[tokio::test]
    async fn test_load_more_threshold() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        serve_page(&h, 2, 25, "s");
        h.session.load_next_page().await.unwrap();

        assert_eq!(h.session.load_more_if_needed(19).await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(h.session.load_more_if_needed(20).await.unwrap(), LoadOutcome::Loaded(25));
        assert_eq!(h.http.request_count(), 2);
    }

    #[tokio::test]
    async fn test_load_more_with_huge_index_does_not_overflow() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        serve_page(&h, 2, 25, "s");
        h.session.load_next_page().await.unwrap();

        assert_eq!(
            h.session.load_more_if_needed(usize::MAX).await.unwrap(),
            LoadOutcome::Loaded(25)
        );
    }

    #[tokio::test]
    async fn test_load_more_is_suppressed_while_searching() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        h.session.load_next_page().await.unwrap();
        h.session.search("ada1");
        assert_eq!(h.session.load_more_if_needed(24).await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(h.http.request_count(), 1);
    }

    #[tokio::test]
    async fn test_search_round_trip_restores_list() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        h.session.load_next_page().await.unwrap();
        let before = h.session.visible_users();

        h.session.search("");
        h.session.search("anything");
        assert!(h.session.is_searching());
        assert!(h.session.is_empty());
        assert_eq!(h.session.empty_state_message().0, "No users found");
        h.session.search("");

        assert!(!h.session.is_searching());
        assert_eq!(h.session.visible_users(), before);
        assert_eq!(h.session.empty_state_message().0, "No users available");
    }

    #[tokio::test]
    async fn test_search_matches_case_insensitively() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        h.session.load_next_page().await.unwrap();

        h.session.search("LONDON12");
        let found = h.session.visible_users();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location.city, "London12");

        h.session.search("united kingdom");
        assert_eq!(h.session.visible_count(), 25);
    }

    #[tokio::test]
    async fn test_search_is_rerun_when_page_arrives() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        serve_page(&h, 2, 25, "s");
        h.session.load_next_page().await.unwrap();
        h.session.search("Lovelace3");
        // Lovelace3 plus Lovelace30..=Lovelace39 once page 2 lands.
        assert_eq!(h.session.visible_count(), 1);

        let mut events = h.session.subscribe();
        h.session.load_next_page().await.unwrap();
        assert_eq!(h.session.visible_count(), 11);

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(seen.contains(&ListEvent::SearchResultsUpdated));
        assert!(!seen.contains(&ListEvent::UsersUpdated));
    }

    #[tokio::test]
    async fn test_refresh_resets_everything_and_refetches_page_one() {
        let h = harness();
        serve_page(&h, 1, 25, "abc123");
        serve_page(&h, 2, 25, "abc123");
        h.session.load_next_page().await.unwrap();
        h.session.load_next_page().await.unwrap();
        h.session.search("ada");
        h.http.clear_requests();

        serve_page(&h, 1, 25, "fresh");
        h.session.refresh().await.unwrap();

        let requests = h.http.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query_param("page").as_deref(), Some("1"));
        assert_eq!(requests[0].query_param("seed"), None);
        assert!(!h.session.is_searching());
        assert_eq!(h.session.search_text(), "");
        assert_eq!(h.session.visible_count(), 25);
        assert_eq!(h.session.seed().as_deref(), Some("fresh"));
        assert_eq!(h.storage.raw(PAGINATION_SEED_KEY), Some(b"fresh".to_vec()));
    }

    #[tokio::test]
    async fn test_refresh_discards_in_flight_response() {
        let h = harness();
        h.http.set_delay(Duration::from_millis(30));
        serve_page(&h, 1, 25, "stale");
        serve_page(&h, 1, 10, "fresh");

        let stale = h.session.load_next_page();
        let refresh = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            h.session.refresh().await
        };
        let (stale, refreshed) = tokio::join!(stale, refresh);

        assert_eq!(stale.unwrap(), LoadOutcome::Skipped);
        assert_eq!(refreshed.unwrap(), LoadOutcome::Loaded(10));
        assert_eq!(h.session.visible_count(), 10);
        assert_eq!(h.session.seed().as_deref(), Some("fresh"));
        assert!(!h.session.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_load_resets_loading_flag() {
        let h = harness();
        h.http.set_delay(Duration::from_secs(10));
        serve_page(&h, 1, 25, "s");

        let result =
            tokio::time::timeout(Duration::from_millis(10), h.session.load_next_page()).await;
        assert!(result.is_err());
        assert!(!h.session.is_loading());
        assert_eq!(h.session.next_page(), 1);
        assert!(h.session.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_bookmark_uses_visible_index() {
        let h = harness();
        serve_page(&h, 1, 25, "s");
        h.session.load_next_page().await.unwrap();
        h.session.search("ada7@");

        assert_eq!(h.session.toggle_bookmark(0), Some(true));
        let user = h.session.user_at(0).unwrap();
        assert_eq!(user.email, "ada7@example.com");
        assert!(h.bookmarks.is_bookmarked(&user.unique_id()));
        assert!(h.session.is_bookmarked_at(0));
        assert!(h.session.summary_at(0).unwrap().is_bookmarked);

        assert_eq!(h.session.toggle_bookmark(1), None);
        assert_eq!(h.session.index_of_user(&user.unique_id()), Some(6));
    }

    #[tokio::test]
    async fn test_initial_loading_indicator() {
        let h = harness();
        h.http.set_delay(Duration::from_millis(20));
        serve_page(&h, 1, 25, "s");

        let session = Arc::clone(&h.session);
        let load = tokio::spawn(async move { session.load_next_page().await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(h.session.should_show_initial_loading());
        load.await.unwrap().unwrap();
        assert!(!h.session.should_show_initial_loading());
    }
}
