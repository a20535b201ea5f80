//! Authority reply parser.
//!
//! The authority answers with one verdict per newline-terminated line:
//!
//! ```text
//! true\n                       → Success (nothing else is read)
//! false\n<error-code>[\n]      → Failure, trailing newline optional
//! anything else                → Malformed
//! ```
//!
//! Protocol oddities never surface as errors here; the session decides what a
//! `Malformed` verdict means for its caller.

use std::io::BufRead;

use captcha_common::VerificationOutcome;
use captcha_common::constants::verdict;

/// Parse an authority reply into exactly one outcome
pub fn parse_reply<R: BufRead>(mut reader: R) -> VerificationOutcome {
    let mut first = String::new();
    match reader.read_line(&mut first) {
        // A first line cut short by end of stream is not a verdict
        Ok(_) if first.ends_with('\n') => {}
        _ => return VerificationOutcome::Malformed,
    }

    match first.strip_suffix('\n') {
        Some(verdict::TRUE) => VerificationOutcome::Success,
        Some(verdict::FALSE) => read_error_code(&mut reader),
        _ => VerificationOutcome::Malformed,
    }
}

fn read_error_code<R: BufRead>(reader: &mut R) -> VerificationOutcome {
    let mut second = String::new();
    match reader.read_line(&mut second) {
        Ok(_) => {
            let code = second.strip_suffix('\n').unwrap_or(&second);
            VerificationOutcome::Failure {
                code: code.to_string(),
            }
        }
        Err(_) => VerificationOutcome::Malformed,
    }
}
