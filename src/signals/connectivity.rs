//! Network reachability monitoring
//!
//! The actual detection mechanism is platform-specific and lives in the
//! embedding application; [`ConnectivityTracker`] is a ready-made state
//! holder the application drives from its platform hooks. Monitoring is
//! started and stopped by the push controller together with the keep-alive
//! service: while push is fully shut down there is nothing to react to.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Reachability transition delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityEvent {
    /// Network became available, or its properties changed enough that
    /// existing connections should be re-established.
    Changed,
    /// Network is gone.
    Lost,
}

pub trait ConnectivityMonitor: Send + Sync {
    /// Begin monitoring. Availability reads false until the first report
    /// after starting.
    fn start(&self);

    fn stop(&self);

    fn is_network_available(&self) -> bool;

    fn subscribe(&self) -> flume::Receiver<ConnectivityEvent>;
}

/// Platform-agnostic [`ConnectivityMonitor`] implementation.
///
/// The embedding application calls [`set_network_available`] from whatever
/// OS notification it has. Edge-triggered: subscribers are only notified on
/// availability transitions, and only while monitoring is running.
///
/// [`set_network_available`]: ConnectivityTracker::set_network_available
pub struct ConnectivityTracker {
    running: AtomicBool,
    available: AtomicBool,
    subscribers: Mutex<Vec<flume::Sender<ConnectivityEvent>>>,
}

impl ConnectivityTracker {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            available: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Report the current reachability state.
    pub fn set_network_available(&self, available: bool) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }

        let previous = self.available.swap(available, Ordering::SeqCst);
        if previous == available {
            return;
        }

        debug!("Network availability changed: {}", available);
        let event = if available {
            ConnectivityEvent::Changed
        } else {
            ConnectivityEvent::Lost
        };
        self.notify(event);
    }

    /// Report a change in network properties (e.g. new link addresses) that
    /// warrants reconnecting even though availability did not flip.
    pub fn notify_network_changed(&self) {
        if self.running.load(Ordering::SeqCst) && self.available.load(Ordering::SeqCst) {
            self.notify(ConnectivityEvent::Changed);
        }
    }

    fn notify(&self, event: ConnectivityEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

impl Default for ConnectivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor for ConnectivityTracker {
    fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            // Unknown until the platform reports in
            self.available.store(false, Ordering::SeqCst);
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_network_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> flume::Receiver<ConnectivityEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}
