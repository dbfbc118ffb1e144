//! Common test utilities for integration tests.
//!
//! Tests run the real [`ReqwestHttpClient`] against a wiremock server, with
//! the in-crate doubles standing in for connectivity and retry timing.
//!
//! # Example
//!
//! ```ignore
//! let server = MockServer::start().await;
//! mount_page(&server, 1, 25, None, "abc123").await;
//! let client = client_for(&server, StaticReachability::connected());
//! ```

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use userdeck::adapters::mock::fixtures::page_json;
use userdeck::adapters::{FileKeyValueStore, RecordingSleeper, ReqwestHttpClient, StaticReachability};
use userdeck::api::RemoteUserClient;
use userdeck::config::AppConfig;
use userdeck::services::Services;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the listing endpoint is mounted on.
pub const API_PATH: &str = "/api/";

/// Listing URL on `server`.
pub fn api_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_PATH)
}

/// Fetch client wired to `server` through reqwest.
pub fn client_for(server: &MockServer, reachability: StaticReachability) -> RemoteUserClient {
    RemoteUserClient::new(
        Arc::new(ReqwestHttpClient::new()),
        Arc::new(reachability),
        Arc::new(RecordingSleeper::new()),
    )
    .with_base_url(api_url(server))
}

/// Full service graph against `server`, persisting under `data_dir`.
pub fn services_for(server: &MockServer, data_dir: &Path) -> Services {
    Services::with_parts(
        AppConfig::default()
            .with_api_base_url(api_url(server))
            .with_data_dir(data_dir),
        Arc::new(ReqwestHttpClient::new()),
        Arc::new(StaticReachability::connected()),
        Arc::new(FileKeyValueStore::new(data_dir)),
        Arc::new(RecordingSleeper::new()),
    )
}

/// Serve `count` users for `page`. `request_seed` restricts the mock to
/// requests carrying that seed (or none at all when `None`); the response
/// always reports `response_seed`.
pub async fn mount_page(
    server: &MockServer,
    page: u32,
    count: usize,
    request_seed: Option<&str>,
    response_seed: &str,
) {
    let mock = Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("page", page.to_string()))
        .and(query_param("results", "25"));
    let mock = match request_seed {
        Some(seed) => mock.and(query_param("seed", seed)),
        None => mock.and(query_param_is_missing("seed")),
    };
    mock.respond_with(
        ResponseTemplate::new(200).set_body_json(page_json(page, count, 25, response_seed)),
    )
    .mount(server)
    .await;
}
