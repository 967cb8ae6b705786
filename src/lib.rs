//! mail-push - Push notification lifecycle for a multi-account email client
//!
//! This crate keeps the set of running per-account push listeners in step
//! with the accounts that should currently receive push notifications, and
//! keeps a shared keep-alive service running exactly while it is needed.
//! The wire protocol behind an individual listener, message storage, and UI
//! are all external concerns.
//!
//! ## Module Organization
//!
//! - `push/`: Reconciliation controller, listener contracts, keep-alive handle
//! - `signals/`: Signal-source interfaces (accounts, folders, backends,
//!   settings, connectivity, power state)
//! - `config/`: Push settings with TOML loading and change notification
//! - `types/`: Shared data structures and error types
//!
//! ## Usage
//!
//! Implement the traits in [`signals`] and [`push`] against your
//! application's account registry, folder repository, and platform services,
//! then hand them to [`PushController::new`] and call
//! [`init`](PushController::init) once at startup:
//!
//! ```ignore
//! let controller = PushController::new(PushDeps {
//!     accounts,
//!     folders,
//!     backends,
//!     settings: SettingsManager::global(),
//!     connectivity: Arc::new(ConnectivityTracker::new()),
//!     permission,
//!     auto_sync,
//!     boot,
//!     service,
//!     factory,
//! });
//! controller.init();
//! ```

pub mod config;
pub mod push;
pub mod signals;
pub mod types;

pub use config::{BackgroundSync, PushSettings, SettingsManager};
pub use push::{PushController, PushDeps, PushStatus, SuppressionReason};
pub use signals::connectivity::{ConnectivityEvent, ConnectivityMonitor, ConnectivityTracker};
pub use types::error::{PushError, Result};
pub use types::{Account, AccountId};
