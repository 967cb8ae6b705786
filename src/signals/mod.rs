//! Signal sources consumed by the push controller
//!
//! Every collaborator here is an independent, asynchronously-changing input:
//! the account registry, per-account folder configuration, backend
//! capabilities, user settings, network reachability, and platform power
//! state. Each is modeled as a trait combining synchronous snapshot queries
//! with flume change streams; the controller folds all of them into a single
//! serialized reconciliation loop.

pub mod accounts;
pub mod backend;
pub mod connectivity;
pub mod folders;
pub mod permission;
pub mod settings;
