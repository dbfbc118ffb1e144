//! Durable set of bookmarked users with change notification.
//!
//! The set lives in memory behind a mutex and is written through to a
//! [`KeyValueStore`] on every mutation. Each mutation that actually changes the
//! set broadcasts a [`BookmarkEvent`]; the write and the broadcast happen while
//! the lock is held, so subscribers observe events in the same order as the
//! persisted state evolved.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::KeyValueStore;

/// Storage key holding the JSON array of bookmarked records.
pub const BOOKMARKS_KEY: &str = "bookmarked_users";

const EVENT_CAPACITY: usize = 64;

/// A change to the bookmark set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkEvent {
    Added(UserRecord),
    Removed(UserRecord),
    Cleared,
}

impl BookmarkEvent {
    /// Whether this event can change the membership of `unique_id`.
    pub fn concerns(&self, unique_id: &str) -> bool {
        match self {
            BookmarkEvent::Added(user) | BookmarkEvent::Removed(user) => {
                user.unique_id() == unique_id
            }
            BookmarkEvent::Cleared => true,
        }
    }
}

/// Receiving end of the bookmark bus. Dropping it unsubscribes.
#[derive(Debug)]
pub struct BookmarkSubscription {
    rx: broadcast::Receiver<BookmarkEvent>,
}

impl BookmarkSubscription {
    /// Wait for the next event.
    ///
    /// `Err(RecvError::Lagged(n))` means `n` events were dropped because this
    /// subscriber fell behind; callers should resynchronize from
    /// [`BookmarkStore::list`].
    pub async fn recv(&mut self) -> Result<BookmarkEvent, broadcast::error::RecvError> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Result<BookmarkEvent, broadcast::error::TryRecvError> {
        self.rx.try_recv()
    }
}

#[derive(Debug, Default)]
struct BookmarkState {
    users: Vec<UserRecord>,
    last_persist_error: Option<StorageError>,
}

/// Thread-safe bookmark set.
pub struct BookmarkStore {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<BookmarkState>,
    events: broadcast::Sender<BookmarkEvent>,
}

impl BookmarkStore {
    /// Open the store, loading whatever is persisted under [`BOOKMARKS_KEY`].
    ///
    /// Unreadable or corrupt data yields an empty set.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let users = load_users(store.as_ref());
        debug!("Loaded {} bookmarks", users.len());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            state: Mutex::new(BookmarkState {
                users,
                last_persist_error: None,
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BookmarkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the bookmarked records, oldest first.
    pub fn list(&self) -> Vec<UserRecord> {
        self.lock().users.clone()
    }

    pub fn is_bookmarked(&self, unique_id: &str) -> bool {
        self.lock().users.iter().any(|u| u.unique_id() == unique_id)
    }

    pub fn count(&self) -> usize {
        self.lock().users.len()
    }

    /// Bookmark `user`. Adding an already bookmarked record does nothing.
    pub fn add(&self, user: &UserRecord) {
        let id = user.unique_id();
        let mut state = self.lock();
        if state.users.iter().any(|u| u.unique_id() == id) {
            return;
        }
        state.users.push(user.clone());
        info!("Bookmarked {}", user.unique_id());
        self.persist(&mut state);
        self.emit(BookmarkEvent::Added(user.clone()));
    }

    /// Remove the bookmark matching `user`'s unique id, if any.
    pub fn remove(&self, user: &UserRecord) {
        let id = user.unique_id();
        let mut state = self.lock();
        let Some(position) = state.users.iter().position(|u| u.unique_id() == id) else {
            return;
        };
        let removed = state.users.remove(position);
        info!("Removed bookmark {}", removed.unique_id());
        self.persist(&mut state);
        self.emit(BookmarkEvent::Removed(removed));
    }

    /// Flip `user`'s membership. Returns `true` if it is now bookmarked.
    pub fn toggle(&self, user: &UserRecord) -> bool {
        let id = user.unique_id();
        let mut state = self.lock();
        match state.users.iter().position(|u| u.unique_id() == id) {
            Some(position) => {
                let removed = state.users.remove(position);
                info!("Removed bookmark {}", removed.unique_id());
                self.persist(&mut state);
                self.emit(BookmarkEvent::Removed(removed));
                false
            }
            None => {
                state.users.push(user.clone());
                info!("Bookmarked {}", user.unique_id());
                self.persist(&mut state);
                self.emit(BookmarkEvent::Added(user.clone()));
                true
            }
        }
    }

    /// Remove every bookmark and the persisted key. Always notifies.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        let cleared = state.users.len();
        state.users.clear();
        info!("Cleared {} bookmarks", cleared);
        match self.store.remove(BOOKMARKS_KEY) {
            Ok(()) => state.last_persist_error = None,
            Err(e) => {
                error!("Failed to clear persisted bookmarks: {}", e);
                state.last_persist_error = Some(e);
            }
        }
        self.emit(BookmarkEvent::Cleared);
    }

    /// New subscription to the change bus.
    ///
    /// The bus buffers the most recent 64 events. A subscriber that falls
    /// further behind loses the oldest ones and its next `recv` returns
    /// `Err(RecvError::Lagged(n))`; it must then rebuild its view from
    /// [`list`](Self::list) rather than replaying events.
    pub fn subscribe(&self) -> BookmarkSubscription {
        BookmarkSubscription {
            rx: self.events.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Most recent failed write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<StorageError> {
        self.lock().last_persist_error.clone()
    }

    fn persist(&self, state: &mut BookmarkState) {
        let result = serde_json::to_vec(&state.users)
            .map_err(StorageError::from)
            .and_then(|bytes| self.store.set(BOOKMARKS_KEY, &bytes));
        match result {
            Ok(()) => state.last_persist_error = None,
            Err(e) => {
                error!("Failed to persist bookmarks: {}", e);
                state.last_persist_error = Some(e);
            }
        }
    }

    fn emit(&self, event: BookmarkEvent) {
        // No receivers is not an error.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for BookmarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkStore")
            .field("count", &self.count())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn load_users(store: &dyn KeyValueStore) -> Vec<UserRecord> {
    let bytes = match store.get(BOOKMARKS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read bookmarks, starting empty: {}", e);
            return Vec::new();
        }
    };
    match serde_json::from_slice::<Vec<UserRecord>>(&bytes) {
        Ok(mut users) => {
            let mut seen = std::collections::HashSet::new();
            users.retain(|u| seen.insert(u.unique_id()));
            users
        }
        Err(e) => {
            warn!("Stored bookmarks are corrupt, starting empty: {}", e);
            Vec::new()
        }
    }
}
