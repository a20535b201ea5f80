//! # CAPTCHA Session
//!
//! Per-client challenge/response session against a remote verification authority.
//!
//! ```text
//! caller → VerificationSession::verify → Authority::submit → protocol::parse_reply
//!                   ↓
//!          state / last error code → widget::render_widget
//! ```
//!
//! ## Modules
//! - `protocol` - Line protocol parser for authority verdicts
//! - `session` - Session state machine enforcing single-use success
//! - `authority` - Transport seam and the reqwest-backed authority client
//! - `address` - Client IP extraction from a `host:port` remote address
//! - `widget` - Challenge widget markup

pub mod address;
pub mod authority;
pub mod protocol;
pub mod session;
pub mod widget;

pub use address::client_ip;
pub use authority::{Authority, AuthorityEndpoints, HttpAuthority, VerifyRequest};
pub use protocol::parse_reply;
pub use session::VerificationSession;
pub use widget::render_widget;

pub use captcha_common::{
    CaptchaError, ErrorKind, RenderedFields, SessionState, VerificationOutcome,
};
