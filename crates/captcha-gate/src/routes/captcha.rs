//! CAPTCHA challenge and verification endpoints.

use std::net::SocketAddr;

use axum::{
    Form,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use captcha_common::ErrorKind;

use crate::state::AppState;

/// Issue a new challenge page backed by a fresh session
pub async fn get_challenge(State(state): State<AppState>) -> Html<String> {
    let session = state.new_session();
    let widget = session.html_string();
    let session_id = state.sessions.insert(session).await;

    tracing::debug!(session_id = %session_id, "Issued CAPTCHA challenge");

    Html(challenge_page(&session_id, &widget, None))
}

#[derive(Deserialize)]
pub struct VerifyForm {
    session_id: String,
    #[serde(rename = "recaptcha_challenge_field", default)]
    challenge: String,
    #[serde(rename = "recaptcha_response_field", default)]
    response: String,
}

/// Verify the answer submitted from a challenge page
pub async fn verify_challenge(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    Form(form): Form<VerifyForm>,
) -> Response {
    let Some(mut session) = state.sessions.take(&form.session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Html(message_page("Challenge expired or invalid. Please request a new one.")),
        )
            .into_response();
    };

    let result = session
        .verify(&form.challenge, &form.response, &remote_addr.to_string())
        .await;

    match result {
        Ok(true) => {
            // Session is terminal now and is dropped here
            tracing::info!(session_id = %form.session_id, "Client passed CAPTCHA");
            (StatusCode::OK, Html(message_page("Verified. You may continue."))).into_response()
        }
        Ok(false) => {
            let page = challenge_page(
                &form.session_id,
                &session.html_string(),
                Some("Incorrect answer, please try again."),
            );
            state.sessions.put_back(&form.session_id, session).await;
            (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
        }
        Err(e) => {
            tracing::error!(
                session_id = %form.session_id,
                kind = ?e.kind(),
                error = %e,
                "CAPTCHA verification error"
            );
            if e.kind() != ErrorKind::AlreadyVerified {
                state.sessions.put_back(&form.session_id, session).await;
            }
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Html(message_page("Verification is temporarily unavailable. Please try again later.")),
            )
                .into_response()
        }
    }
}

fn challenge_page(session_id: &str, widget: &str, notice: Option<&str>) -> String {
    let notice = notice
        .map(|text| format!("<p class=\"notice\">{text}</p>\n"))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Verification</title></head>
<body>
{notice}<form action="/verify" method="post">
<input type="hidden" name="session_id" value="{session_id}">
{widget}
<input type="submit" value="Submit">
</form>
</body>
</html>
"#
    )
}

fn message_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Verification</title></head>\n<body>\n<p>{message}</p>\n</body>\n</html>\n"
    )
}
