//! End-to-end list scenarios: reqwest against wiremock, files in a temp dir.

mod common;

use common::{mount_page, services_for, API_PATH};
use tempfile::TempDir;
use userdeck::session::{LoadOutcome, PAGINATION_SEED_KEY};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_pages_share_the_first_seed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 1, 25, None, "abc123").await;
    mount_page(&server, 2, 25, Some("abc123"), "abc123").await;

    let services = services_for(&server, dir.path());
    let session = services.user_list_session();
    session.load_next_page().await.unwrap();
    session.load_more_if_needed(24).await.unwrap();

    assert_eq!(session.visible_count(), 50);
    assert_eq!(session.seed().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_seed_is_resumed_after_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 1, 25, None, "abc123").await;
    mount_page(&server, 1, 25, Some("abc123"), "abc123").await;

    {
        let services = services_for(&server, dir.path());
        services.user_list_session().load_next_page().await.unwrap();
    }
    assert!(dir.path().join(format!("{}.json", PAGINATION_SEED_KEY)).exists());

    let services = services_for(&server, dir.path());
    let session = services.user_list_session();
    assert_eq!(session.seed().as_deref(), Some("abc123"));
    session.load_next_page().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].url.query().unwrap_or_default().contains("seed=abc123"));
}

#[tokio::test]
async fn test_refresh_with_active_search() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 1, 25, None, "abc123").await;
    mount_page(&server, 2, 25, Some("abc123"), "abc123").await;

    let services = services_for(&server, dir.path());
    let session = services.user_list_session();
    session.load_next_page().await.unwrap();
    session.load_next_page().await.unwrap();
    assert_eq!(session.visible_count(), 50);
    session.search("lovelace4");
    assert!(session.is_searching());

    server.reset().await;
    mount_page(&server, 1, 25, None, "fresh").await;

    session.refresh().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("page=1"), "query was {}", query);
    assert!(!query.contains("seed="), "query was {}", query);
    assert!(!session.is_searching());
    assert_eq!(session.visible_count(), 25);
    assert_eq!(session.seed().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_short_page_stops_pagination() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 1, 7, None, "tiny").await;

    let services = services_for(&server, dir.path());
    let session = services.user_list_session();
    assert_eq!(session.load_next_page().await.unwrap(), LoadOutcome::Loaded(7));
    assert!(session.is_exhausted());
    assert_eq!(session.load_next_page().await.unwrap(), LoadOutcome::Skipped);
    assert_eq!(session.load_more_if_needed(6).await.unwrap(), LoadOutcome::Skipped);

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_round_trip_and_bookmarks() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 1, 25, None, "abc123").await;

    let services = services_for(&server, dir.path());
    let session = services.user_list_session();
    session.load_next_page().await.unwrap();
    let full = session.visible_users();

    session.search("");
    session.search("anything");
    assert_eq!(session.visible_count(), 0);
    session.search("");
    assert_eq!(session.visible_users(), full);

    session.search("ada12@");
    assert_eq!(session.toggle_bookmark(0), Some(true));
    let mut bookmarks = services.bookmarks_session();
    assert_eq!(bookmarks.count(), 1);
    assert_eq!(bookmarks.user_at(0).map(|u| u.email.as_str()), Some("ada12@example.com"));

    bookmarks.clear_all();
    bookmarks.sync();
    assert!(bookmarks.is_empty());
    session.clear_search();
    assert!(!session.is_bookmarked_at(11));
}

#[tokio::test]
async fn test_failed_page_can_be_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, 25, None, "abc123").await;

    let services = services_for(&server, dir.path());
    let session = services.user_list_session();
    assert!(session.load_next_page().await.is_err());
    assert!(session.is_empty());
    assert_eq!(session.load_next_page().await.unwrap(), LoadOutcome::Loaded(25));
}
