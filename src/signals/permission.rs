//! Platform power-state interfaces
//!
//! Background permission, the system-wide auto-sync switch, and the
//! boot-complete receiver are all platform services; only their query and
//! registration surfaces are modeled here.

use crate::types::error::Result;

/// Query whether the platform currently allows long-running background work.
pub trait BackgroundPermissionManager: Send + Sync {
    /// Returns false when the user revoked the permission. A query failure is
    /// treated by the controller as revoked, so implementations should only
    /// fail when the platform genuinely cannot answer.
    fn can_run_background_services(&self) -> Result<bool>;
}

/// System-level auto-sync switch.
pub trait AutoSyncManager: Send + Sync {
    /// True when background sync is suppressed at the system level. Expected
    /// to already account for whether the user's policy defers to the system
    /// switch at all.
    fn is_auto_sync_disabled(&self) -> bool;

    /// Whether the user's policy defers to the system switch. Controls
    /// whether the auto-sync change stream is worth watching.
    fn respect_system_auto_sync(&self) -> bool;

    /// Stream of system auto-sync toggles.
    fn subscribe(&self) -> flume::Receiver<()>;
}

/// Receiver that restarts push after a device reboot. Enabled only while the
/// keep-alive service is desired, so a reboot with push fully off stays off.
pub trait BootCompleteManager: Send + Sync {
    fn enable_receiver(&self);

    fn disable_receiver(&self);
}
