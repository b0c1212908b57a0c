//! Error types for SSH connection, command execution and room management.
//!
//! This module defines the failure taxonomy described in the design's
//! error handling section: connect failures, transport failures, execution
//! failures and validation failures each get their own variant so callers
//! can decide per-scope whether to retry, surface to the stream, or just log.

use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

/// Errors that can occur while establishing or using a pooled SSH session.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Authentication was rejected by the remote host.
    #[error("authentication denied for {0}")]
    AuthDenied(String),

    /// Authentication against the jump host failed; the caller almost
    /// certainly needs to configure key-based authentication.
    #[error("jump host authentication failed for {0}: configure key authentication")]
    JumpAuthDenied(String),

    /// The TCP transport dropped or never came up.
    #[error("transport disconnected: {0}")]
    TransportDisconnect(String),

    /// An already-established connection was lost mid-use.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Opening a channel (exec or direct-tcpip) on a live session failed.
    #[error("channel open failed: {0}")]
    ChannelOpenError(String),

    /// The underlying SSH connection is no longer usable.
    #[error("connection closed")]
    ConnectClosedError,

    /// Launching or reading the output of a command exceeded its deadline.
    #[error("exec command timeout: {0}")]
    ExecTimeout(String),

    /// Connecting/authenticating took longer than the allotted budget.
    #[error("connection initialization timeout for {0}")]
    InitTimeout(String),

    /// An error surfaced directly from the `russh` library.
    #[error("russh error: {0}")]
    RusshError(#[from] russh::Error),

    /// An error surfaced directly from `russh::keys`.
    #[error("ssh key error: {0}")]
    KeyError(#[from] russh::keys::Error),

    /// Failed to send data through an internal channel.
    #[error("failed to send data: {0}")]
    SendDataError(#[from] SendError<String>),

    /// Generic I/O failure (reading a key file, etc).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for failures that don't fit a more specific variant.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by the Room Registry's validation of an incoming batch.
#[derive(Error, Debug)]
pub enum BatchValidationError {
    /// `rows` was empty.
    #[error("no server data provided")]
    EmptyBatch,

    /// A row enabled the jump server but left `ip` or `user` blank.
    #[error("jump server ip and user are required when jump server is enabled")]
    IncompleteJumpConfig,
}

/// Errors returned by the Config Store.
#[derive(Error, Debug)]
pub enum ConfigStoreError {
    /// No config exists with the given id.
    #[error("config not found")]
    NotFound,

    /// The underlying SQLite operation failed.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The stored `config_data` column was not valid JSON.
    #[error("corrupt config data: {0}")]
    CorruptData(#[from] serde_json::Error),
}
