//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP GET transport
//! - [`KeyValueStore`] - flat blob persistence
//! - [`Reachability`] - connectivity query
//! - [`Sleeper`] - retry delay timer

pub mod http;
pub mod reachability;
pub mod sleep;
pub mod storage;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use reachability::Reachability;
pub use sleep::Sleeper;
pub use storage::KeyValueStore;
