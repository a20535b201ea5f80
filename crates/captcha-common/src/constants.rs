//! Shared constants for CAPTCHA session components.

/// Verification endpoint of the authority
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/verify";

/// Script endpoint that issues a challenge to the browser
pub const DEFAULT_CHALLENGE_URL: &str = "https://www.google.com/recaptcha/api/challenge";

/// Fallback iframe endpoint for clients without JavaScript
pub const DEFAULT_NOSCRIPT_URL: &str = "https://www.google.com/recaptcha/api/noscript";

/// Authority request timeout (seconds)
pub const DEFAULT_AUTHORITY_TIMEOUT_SECS: u64 = 10;

/// Default gate HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8888";

/// Unverified session lifetime in the gate registry (10 minutes)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 600;

/// Reply tokens on the first line of an authority verdict
pub mod verdict {
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
}

/// Form fields the widget submits from the end user's browser
pub mod widget_fields {
    /// Challenge token set by the widget script
    pub const CHALLENGE: &str = "recaptcha_challenge_field";

    /// End user's answer
    pub const RESPONSE: &str = "recaptcha_response_field";
}
