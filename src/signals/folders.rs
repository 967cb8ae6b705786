//! Folder configuration interface
//!
//! Per-folder push settings live in the folder repository. The controller
//! only ever asks the aggregate question "does this account have at least one
//! push-enabled folder" and watches that answer per account.

use crate::types::Account;

pub trait FolderStore: Send + Sync {
    /// Whether any folder of this account is currently configured for push.
    fn has_push_enabled_folder(&self, account: &Account) -> bool;

    /// Stream of changes to the account's push-enabled state. Each received
    /// value is the new aggregate answer; the controller re-queries during
    /// the pass anyway, so values may be coalesced or stale.
    fn subscribe_push_enabled(&self, account: &Account) -> flume::Receiver<bool>;

    /// Clear push configuration on every folder of the account. Invoked when
    /// the background permission is revoked, so that eligibility computes to
    /// empty from the stored configuration rather than from a cached value.
    fn disable_push(&self, account: &Account);
}
