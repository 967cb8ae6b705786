//! Account registry interface

use crate::types::{Account, AccountId};

/// Read access to the account registry plus a change stream.
///
/// The registry owns account data; the controller re-reads it on every
/// reconciliation pass instead of caching. `subscribe` returns a stream that
/// yields a unit value whenever the account set changes (accounts added,
/// removed, or reconfigured).
pub trait AccountStore: Send + Sync {
    fn accounts(&self) -> Vec<Account>;

    fn account(&self, uuid: AccountId) -> Option<Account>;

    fn subscribe(&self) -> flume::Receiver<()>;
}
