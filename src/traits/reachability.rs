//! Connectivity query abstraction.

/// Answers "is the network usable right now?".
///
/// The user listing client consults this once per call, before the first
/// attempt. [`NetworkReachabilityMonitor`](crate::reachability::NetworkReachabilityMonitor)
/// is the production implementation.
pub trait Reachability: Send + Sync {
    /// Whether the last known connectivity state is "connected".
    fn is_connected(&self) -> bool;
}
