//! Unified error types for the push subsystem
//!
//! Errors here are never surfaced to an end user directly; they are logged
//! and exposed through diagnostics. All variants are serializable so an
//! embedding application can forward them to its own reporting channel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for push controller operations and collaborator contracts.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PushError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Push listener error: {0}")]
    Listener(String),

    #[error("Background permission query failed: {0}")]
    Permission(String),
}

impl From<std::io::Error> for PushError {
    fn from(err: std::io::Error) -> Self {
        PushError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for PushError {
    fn from(err: toml::de::Error) -> Self {
        PushError::Config(err.to_string())
    }
}

/// Result type alias using PushError
pub type Result<T> = std::result::Result<T, PushError>;
