//! Injectable timer used between retry attempts.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task for a duration.
///
/// Production code uses [`TokioSleeper`](crate::adapters::TokioSleeper); tests
/// swap in [`RecordingSleeper`](crate::adapters::mock::RecordingSleeper) so
/// retry chains run instantly and the requested delays can be asserted.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration` without blocking the runtime.
    async fn sleep(&self, duration: Duration);
}
