//! Core types shared across CAPTCHA session components.

use serde::{Deserialize, Serialize};

/// Parsed verdict of the verification authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum VerificationOutcome {
    /// Challenge answered correctly
    Success,
    /// Challenge answered incorrectly; `code` may be empty if the authority omitted it
    Failure { code: String },
    /// Reply matched neither recognized shape
    Malformed,
}

impl VerificationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Lifecycle state of one verification session
///
/// - `Fresh`: no verdict received yet
/// - `Failed`: last verdict was a wrong answer
/// - `Succeeded`: terminal, any further attempt is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Fresh,
    Failed,
    Succeeded,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Inputs the challenge widget needs from a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFields {
    pub public_key: String,
    /// Most recent authority error code, empty if none
    pub error_code: String,
}
