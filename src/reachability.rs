//! Network reachability tracking.
//!
//! [`NetworkReachabilityMonitor`] holds the last known connectivity state in a
//! `watch` channel so any number of tasks can read it or await transitions.
//! State changes come either from the embedding application (`set_connected`,
//! e.g. wired to an OS path monitor) or from an optional background probe that
//! periodically issues a GET against a known URL.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::traits::{Headers, HttpClient, Reachability};

/// Connectivity as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
}

/// Tracks connectivity transitions.
///
/// Starts out `Connected`: until something says otherwise, requests are
/// attempted and their own failures speak for the network.
#[derive(Debug)]
pub struct NetworkReachabilityMonitor {
    state: watch::Sender<Connectivity>,
    probe: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkReachabilityMonitor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Connectivity::Connected);
        Self {
            state,
            probe: Mutex::new(None),
        }
    }

    /// Current state.
    pub fn connectivity(&self) -> Connectivity {
        *self.state.borrow()
    }

    /// Receiver that yields on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.subscribe()
    }

    /// Record a connectivity observation. Returns `true` if this was a
    /// transition; repeated observations of the same state notify no one.
    pub fn set_connected(&self, connected: bool) -> bool {
        record(&self.state, connected)
    }

    /// Start probing `probe_url` every `interval` on a background task.
    ///
    /// Any HTTP response (even an error status) counts as connected; a
    /// transport failure counts as disconnected. Replaces a running probe.
    pub fn start_monitoring(
        &self,
        http: Arc<dyn HttpClient>,
        probe_url: impl Into<String>,
        interval: Duration,
    ) {
        let probe_url = probe_url.into();
        let state = self.state.clone();
        info!("Starting reachability probe against {} every {:?}", probe_url, interval);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let connected = http.get(&probe_url, &Headers::new()).await.is_ok();
                record(&state, connected);
            }
        });

        let previous = self
            .probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stop the background probe, if any. The last observed state is kept.
    pub fn stop_monitoring(&self) {
        let handle = self
            .probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            debug!("Stopping reachability probe");
            handle.abort();
        }
    }

    /// Whether a background probe is running.
    pub fn is_monitoring(&self) -> bool {
        self.probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn record(state: &watch::Sender<Connectivity>, connected: bool) -> bool {
    let next = if connected {
        Connectivity::Connected
    } else {
        Connectivity::Disconnected
    };
    let changed = state.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
    if changed {
        info!("Network connectivity changed: {:?}", next);
    }
    changed
}

impl Default for NetworkReachabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reachability for NetworkReachabilityMonitor {
    fn is_connected(&self) -> bool {
        self.connectivity() == Connectivity::Connected
    }
}

impl Drop for NetworkReachabilityMonitor {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}
