//! Bookmarks screen: a snapshot of the bookmark set kept current from the
//! store's change bus.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;

use crate::bookmarks::{BookmarkStore, BookmarkSubscription};
use crate::models::{UserRecord, UserSummary};

/// Placeholder shown when there are no bookmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub icon: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub struct BookmarksSession {
    store: Arc<BookmarkStore>,
    subscription: BookmarkSubscription,
    snapshot: Vec<UserRecord>,
}

impl BookmarksSession {
    pub fn new(store: Arc<BookmarkStore>) -> Self {
        let subscription = store.subscribe();
        let snapshot = store.list();
        Self {
            store,
            subscription,
            snapshot,
        }
    }

    /// Wait for the next change to the bookmark set and refresh the snapshot.
    ///
    /// The session holds the store, so the bus stays open for as long as the
    /// session exists.
    pub async fn changed(&mut self) {
        match self.subscription.recv().await {
            Ok(_) | Err(RecvError::Closed) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!("Bookmarks view skipped {} events; resyncing", skipped);
            }
        }
        self.drain();
        self.reload();
    }

    /// Apply any queued changes without waiting. Returns `true` if the
    /// snapshot was refreshed.
    pub fn sync(&mut self) -> bool {
        if self.drain() {
            self.reload();
            true
        } else {
            false
        }
    }

    /// Consume queued events; true if there were any.
    fn drain(&mut self) -> bool {
        let mut any = false;
        loop {
            match self.subscription.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => any = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return any,
            }
        }
    }

    /// Re-read the store unconditionally.
    pub fn reload(&mut self) {
        self.snapshot = self.store.list();
    }

    pub fn bookmarks(&self) -> &[UserRecord] {
        &self.snapshot
    }

    pub fn user_at(&self, index: usize) -> Option<&UserRecord> {
        self.snapshot.get(index)
    }

    pub fn summary_at(&self, index: usize) -> Option<UserSummary> {
        let user = self.user_at(index)?;
        Some(UserSummary::new(user, self.store.is_bookmarked(&user.unique_id())))
    }

    pub fn index_of_user(&self, unique_id: &str) -> Option<usize> {
        self.snapshot.iter().position(|u| u.unique_id() == unique_id)
    }

    /// Remove the bookmark at `index`. The snapshot catches up on the next
    /// `sync`/`changed`.
    pub fn remove_at(&self, index: usize) {
        if let Some(user) = self.user_at(index) {
            self.store.remove(user);
        }
    }

    pub fn toggle_at(&self, index: usize) -> Option<bool> {
        let user = self.user_at(index)?;
        Some(self.store.toggle(user))
    }

    pub fn clear_all(&self) {
        self.store.clear_all();
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn can_clear_all(&self) -> bool {
        !self.is_empty()
    }

    pub fn remove_confirmation_message(&self, index: usize) -> String {
        match self.user_at(index) {
            Some(user) => format!("Remove {} from bookmarks?", user.full_name()),
            None => "Remove bookmark?".to_string(),
        }
    }

    pub fn empty_state() -> EmptyState {
        EmptyState {
            icon: "bookmark.slash",
            title: "No Bookmarks Yet",
            subtitle: "Start bookmarking users to see them here",
        }
    }
}

impl std::fmt::Debug for BookmarksSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarksSession")
            .field("count", &self.snapshot.len())
            .finish_non_exhaustive()
    }
}
