//! Settings interface

use crate::config::BackgroundSync;

/// Snapshot and change stream for the background-sync policy.
///
/// [`SettingsManager`](crate::config::SettingsManager) is the default
/// implementation. The stream may repeat values; the controller deduplicates
/// before triggering reconciliation.
pub trait SettingsStore: Send + Sync {
    fn background_sync(&self) -> BackgroundSync;

    fn subscribe(&self) -> flume::Receiver<BackgroundSync>;
}
