//! Per-screen state holders built on the shared services.
//!
//! | Session | Backing services |
//! |---------|------------------|
//! | [`UserListSession`] | `RemoteUserClient`, `BookmarkStore`, key-value store (seed) |
//! | [`BookmarksSession`] | `BookmarkStore` |
//! | [`UserDetailSession`] | `BookmarkStore`, `ImageCache` |

mod bookmarks;
mod user_detail;
mod user_list;

pub use bookmarks::{BookmarksSession, EmptyState};
pub use user_detail::{BookmarkAction, InfoRow, UserDetailSession};
pub use user_list::{ListEvent, LoadOutcome, UserListSession, PAGINATION_SEED_KEY, PREFETCH_THRESHOLD};
