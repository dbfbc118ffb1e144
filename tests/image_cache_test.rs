//! ImageCache over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use userdeck::adapters::mock::fixtures::png_bytes;
use userdeck::adapters::ReqwestHttpClient;
use userdeck::image_cache::{ImageCache, ImageCacheConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cache() -> ImageCache {
    ImageCache::new(Arc::new(ReqwestHttpClient::new()))
}

#[tokio::test]
async fn test_concurrent_loads_issue_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png_bytes(8, 8))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache();
    let url = format!("{}/img.png", server.uri());
    let (a, b) = tokio::join!(cache.load(&url), cache.load(&url));

    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.width(), 8);

    // Served from memory afterwards.
    assert!(cache.load(&url).await.is_some());
    assert!(cache.contains(&url));
}

#[tokio::test]
async fn test_error_status_and_bad_bytes_yield_none() {
    let server = MockServer::start().await;
    Mock::given(path("/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/text.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let cache = cache();
    assert!(cache.load(&format!("{}/missing.jpg", server.uri())).await.is_none());
    assert!(cache.load(&format!("{}/text.jpg", server.uri())).await.is_none());
    assert!(cache.load("not a url").await.is_none());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_count_limit_evicts_oldest() {
    let server = MockServer::start().await;
    for name in ["a", "b", "c"] {
        Mock::given(path(format!("/{}.png", name)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(2, 2)))
            .mount(&server)
            .await;
    }

    let cache = ImageCache::with_config(
        Arc::new(ReqwestHttpClient::new()),
        ImageCacheConfig::default().with_count_limit(2),
    );
    for name in ["a", "b", "c"] {
        cache.load(&format!("{}/{}.png", server.uri(), name)).await.unwrap();
    }

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&format!("{}/a.png", server.uri())));
    assert_eq!(cache.total_cost(), 2 * 2 * 4 * 2);
}
