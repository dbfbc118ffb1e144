//! Error types for userdeck.
//!
//! - [`FetchError`]: terminal outcome of a failed page fetch
//! - [`StorageError`]: key-value persistence failures
//! - [`ErrorCategory`]: coarse classification shared by both, used to decide
//!   whether a retry affordance makes sense
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Offline, connection, DNS, timeout | Yes |
//! | Server | 5xx, empty or malformed payloads | Yes |
//! | Client | Invalid arguments, 4xx | No |
//! | System | Filesystem errors | No |
//! | Configuration | Unusable base URL | No |
//!
//! The image cache never surfaces errors; a failed load is simply "no image".

mod category;
mod fetch;
mod storage;

pub use category::ErrorCategory;
pub use fetch::FetchError;
pub use storage::StorageError;
