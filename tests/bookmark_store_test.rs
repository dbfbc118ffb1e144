//! BookmarkStore persistence through the file-backed key-value store.

use std::sync::Arc;

use tempfile::TempDir;
use userdeck::adapters::mock::fixtures::sample_user;
use userdeck::adapters::FileKeyValueStore;
use userdeck::bookmarks::{BookmarkEvent, BookmarkStore, BOOKMARKS_KEY};
use userdeck::traits::KeyValueStore;

fn open(dir: &TempDir) -> BookmarkStore {
    BookmarkStore::new(Arc::new(FileKeyValueStore::new(dir.path())))
}

#[test]
fn test_bookmarks_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        store.add(&sample_user(1));
        store.add(&sample_user(2));
        store.toggle(&sample_user(1));
        store.add(&sample_user(3));
    }

    let reopened = open(&dir);
    let ids: Vec<String> = reopened.list().iter().map(|u| u.unique_id()).collect();
    assert_eq!(ids, vec![sample_user(2).unique_id(), sample_user(3).unique_id()]);
    // Full records round-trip, including integer postcodes.
    assert_eq!(reopened.list()[0].location.postcode, sample_user(2).location.postcode);
}

#[test]
fn test_clear_all_removes_file() {
    let dir = TempDir::new().unwrap();
    let files = FileKeyValueStore::new(dir.path());
    let store = open(&dir);
    store.add(&sample_user(1));
    assert!(files.path_for(BOOKMARKS_KEY).exists());

    store.clear_all();
    assert!(!files.path_for(BOOKMARKS_KEY).exists());
    assert_eq!(open(&dir).count(), 0);
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let files = FileKeyValueStore::new(dir.path());
    files.set(BOOKMARKS_KEY, b"[{\"truncated\":").unwrap();

    let store = open(&dir);
    assert_eq!(store.count(), 0);
    store.add(&sample_user(9));
    assert_eq!(open(&dir).count(), 1);
}

#[test]
fn test_unwritable_directory_keeps_memory_state() {
    let dir = TempDir::new().unwrap();
    // A regular file where the data directory should be.
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();

    let store = BookmarkStore::new(Arc::new(FileKeyValueStore::new(&blocked)));
    store.add(&sample_user(1));
    assert!(store.is_bookmarked(&sample_user(1).unique_id()));
    assert!(store.last_persist_error().is_some());
}

#[tokio::test]
async fn test_subscribers_on_other_tasks_see_every_event() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open(&dir));
    let mut subscription = store.subscribe();

    let listener = tokio::spawn(async move {
        let mut events = Vec::new();
        while events.len() < 3 {
            events.push(subscription.recv().await.unwrap());
        }
        events
    });

    store.add(&sample_user(1));
    store.remove(&sample_user(1));
    store.clear_all();

    let events = listener.await.unwrap();
    assert_eq!(
        events,
        vec![
            BookmarkEvent::Added(sample_user(1)),
            BookmarkEvent::Removed(sample_user(1)),
            BookmarkEvent::Cleared,
        ]
    );
}
