//! Mock implementations for testing.
//!
//! These doubles let unit and integration tests exercise the client, store,
//! cache and sessions without network or filesystem access.

pub mod fixtures;
pub mod http;
pub mod reachability;
pub mod sleep;
pub mod storage;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use reachability::StaticReachability;
pub use sleep::RecordingSleeper;
pub use storage::InMemoryStore;
