//! Verification session for one challenge lifecycle.
//!
//! ```text
//! Fresh ──wrong──▶ Failed ──wrong──▶ Failed
//!   │                 │
//!   └────correct──────┴──correct──▶ Succeeded (terminal)
//! ```
//!
//! Transport, address and protocol faults are reported to the caller and leave the
//! session exactly as it was. `verify` takes `&mut self`, so a shared session has to be
//! handed out by the caller one request at a time; the session itself does no locking.

use std::fmt;
use std::io;

use captcha_common::{CaptchaError, RenderedFields, SessionState, VerificationOutcome};

use crate::address::client_ip;
use crate::authority::{Authority, AuthorityEndpoints, HttpAuthority, VerifyRequest};
use crate::protocol::parse_reply;
use crate::widget;

/// One client's CAPTCHA session.
///
/// Keeps track of failed attempts so a re-rendered widget tells the end user which
/// failure occurred. Discard it once [`verify`](Self::verify) has returned `Ok(true)`.
#[derive(Clone)]
pub struct VerificationSession<A = HttpAuthority> {
    public_key: String,
    private_key: String,
    last_error_code: String,
    state: SessionState,
    authority: A,
    endpoints: AuthorityEndpoints,
}

impl<A: Authority> VerificationSession<A> {
    /// Create a fresh session. No I/O happens here and the keys are not validated.
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>, authority: A) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            last_error_code: String::new(),
            state: SessionState::Fresh,
            authority,
            endpoints: AuthorityEndpoints::default(),
        }
    }

    /// Use non-default widget endpoints when rendering
    pub fn with_endpoints(mut self, endpoints: AuthorityEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_verified(&self) -> bool {
        self.state.is_terminal()
    }

    /// Code of the last wrong answer, empty if none
    pub fn last_error_code(&self) -> &str {
        &self.last_error_code
    }

    /// Values the challenge widget is rendered from
    pub fn rendered_fields(&self) -> RenderedFields {
        RenderedFields {
            public_key: self.public_key.clone(),
            error_code: self.last_error_code.clone(),
        }
    }

    pub fn write_html<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        widget::write_widget(writer, &self.endpoints, &self.rendered_fields())
    }

    pub fn html_string(&self) -> String {
        widget::render_widget(&self.endpoints, &self.rendered_fields())
    }

    pub fn html_bytes(&self) -> Vec<u8> {
        self.html_string().into_bytes()
    }

    /// Ask the authority whether `response` solves `challenge`.
    ///
    /// `Ok(false)` is a wrong answer: the authority's code is stored and shows up in the
    /// next rendered widget. Errors are operational faults and must not be presented to
    /// the end user as a failed challenge.
    ///
    /// - `challenge`: challenge token posted by the widget
    /// - `response`: the end user's answer
    /// - `remote_addr`: the client's `host:port` (e.g. `"127.0.0.1:45435"`)
    pub async fn verify(
        &mut self,
        challenge: &str,
        response: &str,
        remote_addr: &str,
    ) -> Result<bool, CaptchaError> {
        if self.state.is_terminal() {
            tracing::debug!(
                public_key = %self.public_key,
                "Rejected verification of an already verified session"
            );
            return Err(CaptchaError::AlreadyVerified);
        }

        let remote_ip = client_ip(remote_addr)?;

        let request = VerifyRequest {
            private_key: &self.private_key,
            remote_ip: &remote_ip,
            challenge,
            response,
        };

        let body = match self.authority.submit(&request).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(remote_ip = %remote_ip, error = %e, "CAPTCHA authority call failed");
                return Err(e);
            }
        };

        match parse_reply(body.as_slice()) {
            VerificationOutcome::Success => {
                self.state = SessionState::Succeeded;
                self.last_error_code.clear();

                tracing::info!(remote_ip = %remote_ip, "CAPTCHA verified successfully");
                Ok(true)
            }
            VerificationOutcome::Failure { code } => {
                tracing::debug!(
                    remote_ip = %remote_ip,
                    error_code = %code,
                    "CAPTCHA verification failed"
                );

                self.state = SessionState::Failed;
                self.last_error_code = code;
                Ok(false)
            }
            VerificationOutcome::Malformed => {
                tracing::warn!(
                    remote_ip = %remote_ip,
                    reply_len = body.len(),
                    "Unexpected reply from CAPTCHA authority"
                );
                Err(CaptchaError::Protocol(
                    "Received unexpected result value from the CAPTCHA authority".to_string(),
                ))
            }
        }
    }
}

impl<A> fmt::Debug for VerificationSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationSession")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("last_error_code", &self.last_error_code)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
