//! Per-account push listener contract
//!
//! A listener owns one account's live push session (the wire protocol behind
//! it is not this crate's concern). The controller creates listeners through
//! the factory, starts them exactly once, and stops them when the account
//! leaves the target set.

use std::sync::Arc;

use crate::types::error::Result;
use crate::types::Account;

/// A running (or startable) push session for a single account.
///
/// All methods are invoked from the controller's reconciliation task and must
/// not block; long-running work belongs in tasks the listener spawns itself.
pub trait PushListener: Send + Sync {
    /// Begin receiving push notifications for the bound account. Called at
    /// most once per instance.
    fn start(&self) -> Result<()>;

    /// Release all resources. Idempotent, and safe even if `start` never
    /// completed.
    fn stop(&self) -> Result<()>;

    /// Re-establish the underlying connection, e.g. after the network came
    /// back. Only meaningful between `start` and `stop`; does not change
    /// whether the listener counts as running.
    fn reconnect(&self);
}

/// Creates listeners for accounts entering the target set.
pub trait PushListenerFactory: Send + Sync {
    /// Pure construction; must not start the listener and must not fail for
    /// a structurally valid account. Connection errors surface from
    /// [`PushListener::start`] instead.
    fn create(&self, account: &Account) -> Arc<dyn PushListener>;
}
