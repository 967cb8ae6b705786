//! Backend registry interface

use crate::types::{Account, AccountId};

/// Capability queries against the per-account mail backend.
///
/// `subscribe_changes` yields the uuid of an account whose backend instance
/// was replaced (e.g. after editing server settings). The old backend's
/// listener must be discarded before the next reconciliation pass; see
/// [`PushController::on_backend_changed`](crate::push::PushController::on_backend_changed).
pub trait BackendStore: Send + Sync {
    /// Whether the account's backend supports push at all.
    fn is_push_capable(&self, account: &Account) -> bool;

    fn subscribe_changes(&self) -> flume::Receiver<AccountId>;
}
