//! Verification authority transport.
//!
//! The session talks to the authority through [`Authority`], so the state machine can
//! be driven by any transport. [`HttpAuthority`] is the production client: one
//! form-encoded POST per attempt, body read to the end before it is handed back.

use std::future::Future;
use std::time::Duration;

use captcha_common::CaptchaError;
use captcha_common::constants::{
    DEFAULT_AUTHORITY_TIMEOUT_SECS, DEFAULT_CHALLENGE_URL, DEFAULT_NOSCRIPT_URL,
    DEFAULT_VERIFY_URL,
};
use serde::Serialize;

/// Endpoints of one verification authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityEndpoints {
    /// Form POST target for verdicts
    pub verify_url: String,
    /// Script that issues a challenge in the browser
    pub challenge_url: String,
    /// Iframe fallback for browsers without JavaScript
    pub noscript_url: String,
}

impl Default for AuthorityEndpoints {
    fn default() -> Self {
        Self {
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            challenge_url: DEFAULT_CHALLENGE_URL.to_string(),
            noscript_url: DEFAULT_NOSCRIPT_URL.to_string(),
        }
    }
}

/// Form body of a verification request
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VerifyRequest<'a> {
    #[serde(rename = "privatekey")]
    pub private_key: &'a str,
    #[serde(rename = "remoteip")]
    pub remote_ip: &'a str,
    pub challenge: &'a str,
    pub response: &'a str,
}

/// A remote service that judges challenge/response pairs
pub trait Authority {
    /// Submit one request and return the complete reply body.
    ///
    /// Connection failures, timeouts and non-success statuses are `Transport` errors.
    fn submit(
        &self,
        request: &VerifyRequest<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, CaptchaError>> + Send;
}

/// Authority client over HTTPS
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpAuthority {
    /// Client with the default request timeout
    pub fn new(verify_url: impl Into<String>) -> Result<Self, CaptchaError> {
        Self::with_timeout(
            verify_url,
            Duration::from_secs(DEFAULT_AUTHORITY_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        verify_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CaptchaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CaptchaError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::from_client(client, verify_url))
    }

    /// Reuse an existing client (shares its connection pool)
    pub fn from_client(client: reqwest::Client, verify_url: impl Into<String>) -> Self {
        Self {
            client,
            verify_url: verify_url.into(),
        }
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }
}

impl Authority for HttpAuthority {
    async fn submit(&self, request: &VerifyRequest<'_>) -> Result<Vec<u8>, CaptchaError> {
        let response = self
            .client
            .post(&self.verify_url)
            .form(request)
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?;

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(body.to_vec())
    }
}

fn transport_error(err: reqwest::Error) -> CaptchaError {
    if err.is_timeout() {
        CaptchaError::Transport(format!("authority request timed out: {err}"))
    } else {
        CaptchaError::Transport(err.to_string())
    }
}
