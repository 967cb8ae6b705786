pub mod error;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies an account across all collaborators.
pub type AccountId = Uuid;

/// A mail account as seen by the push subsystem.
///
/// Accounts are owned by the external account registry; the controller only
/// holds clones and never mutates them. The fields carried here are the ones
/// the listener factory and the folder queries need to operate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub uuid: AccountId,
    pub name: String,
    pub email: String,
}

impl Account {
    /// Create an account with a fresh uuid.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        }
    }
}
