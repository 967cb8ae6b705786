//! Push lifecycle management
//!
//! [`PushController`] keeps the set of running per-account push listeners in
//! step with the accounts that should currently receive push notifications,
//! and keeps the shared keep-alive service running exactly while it is
//! needed.

pub mod controller;
pub mod listener;
pub mod service;

pub use controller::{PushController, PushDeps, PushStatus, SuppressionReason};
pub use listener::{PushListener, PushListenerFactory};
pub use service::PushServiceManager;
