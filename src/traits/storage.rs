//! Flat key-value persistence abstraction.
//!
//! Bookmarks and the pagination seed are each stored as one opaque blob under
//! a fixed key. Reads and writes are synchronous: a mutation is durable (or
//! has failed) by the time the call returns.

use crate::error::StorageError;

/// Trait for blob storage keyed by name.
///
/// Implementations must replace a value as a unit: after a failed `set` the
/// previous value (or absence) is still what `get` returns.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, `Ok(None)` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
