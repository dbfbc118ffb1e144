//! Switchable reachability for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::traits::Reachability;

/// Reachability that reports whatever the test last set.
#[derive(Debug, Clone)]
pub struct StaticReachability {
    connected: Arc<AtomicBool>,
}

impl StaticReachability {
    pub fn connected() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl Default for StaticReachability {
    fn default() -> Self {
        Self::connected()
    }
}

impl Reachability for StaticReachability {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
