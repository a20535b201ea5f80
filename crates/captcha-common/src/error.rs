//! Error taxonomy for verification calls.
//!
//! A wrong answer is not an error: `Verify` reports it as `Ok(false)` and stores the
//! authority's code on the session. Everything here is an operational fault that must
//! never be shown to the end user as a failed challenge.

use thiserror::Error;

/// Errors returned by a verification session
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// The session already succeeded once
    #[error("Session already verified: create a new session for another challenge")]
    AlreadyVerified,

    /// Remote address could not be split into host and port
    #[error("Invalid remote address: {0}")]
    InvalidAddress(String),

    /// Authority unreachable, timed out, or answered with a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Authority reply did not match the line protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`CaptchaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyVerified,
    InvalidAddress,
    TransportError,
    ProtocolError,
    Config,
}

impl CaptchaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyVerified => ErrorKind::AlreadyVerified,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Protocol(_) => ErrorKind::ProtocolError,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyVerified => 409,
            Self::InvalidAddress(_) => 400,
            Self::Transport(_) => 502,
            Self::Protocol(_) => 502,
            Self::Config(_) => 500,
        }
    }

    /// Returns true if the caller may retry with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
