//! # CAPTCHA Common
//!
//! Shared types, errors, and constants used across the CAPTCHA session components.
//!
//! ## Modules
//! - `types` - Verification outcome, session state, rendered widget fields
//! - `error` - Error taxonomy for verification calls
//! - `constants` - Authority endpoints, form field names, service defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::{CaptchaError, ErrorKind};
pub use types::*;
