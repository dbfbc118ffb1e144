//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP transport using reqwest
//! - [`FileKeyValueStore`] - one JSON file per key under a data directory
//! - [`TokioSleeper`] - retry delays on the tokio timer
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - scripted responses, recorded requests
//! - [`mock::InMemoryStore`] - map-backed store with failure injection
//! - [`mock::StaticReachability`] - switchable connectivity
//! - [`mock::RecordingSleeper`] - returns immediately, records delays
//! - [`mock::fixtures`] - sample user records and page payloads

pub mod file_store;
pub mod mock;
pub mod reqwest_http;
pub mod tokio_sleeper;

pub use file_store::FileKeyValueStore;
pub use mock::{InMemoryStore, MockHttpClient, RecordingSleeper, StaticReachability};
pub use reqwest_http::ReqwestHttpClient;
pub use tokio_sleeper::TokioSleeper;
