use super::*;
use crate::config::{AppConfig, AuthorityConfig};
use axum::{
    body::{Body, to_bytes},
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode, header},
    response::Response,
};
use std::net::SocketAddr;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_state(verify_url: String) -> AppState {
    let config = AppConfig {
        public_key: "site-key".into(),
        private_key: "secret".into(),
        authority: AuthorityConfig {
            verify_url,
            ..Default::default()
        },
        ..Default::default()
    };
    AppState::new(config).unwrap()
}

fn app(state: AppState) -> Router {
    create_router(state).layer(MockConnectInfo(SocketAddr::from(([203, 0, 113, 5], 54321))))
}

fn verify_request(session_id: &str, answer: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/verify")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "session_id={session_id}&recaptcha_challenge_field=chal&recaptcha_response_field={answer}"
        )))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mount_reply(server: &MockServer, status: u16, body: &str, times: u64) {
    Mock::given(method("POST"))
        .and(body_string_contains("privatekey=secret"))
        .and(body_string_contains("remoteip=203.0.113.5"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health() {
    let app = app(test_state("http://127.0.0.1:9/verify".into()));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn test_challenge_issues_session() {
    let state = test_state("http://127.0.0.1:9/verify".into());
    let response = app(state.clone())
        .oneshot(Request::get("/challenge").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("k=site-key&amp;error=\""));
    assert!(page.contains("name=\"session_id\""));
    assert_eq!(state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_wrong_then_right_answer() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, "false\nincorrect-captcha-sol\n", 1).await;
    mount_reply(&server, 200, "true\n", 1).await;

    let state = test_state(format!("{}/verify", server.uri()));
    let id = state.sessions.insert(state.new_session()).await;
    let app = app(state.clone());

    let response = app.clone().oneshot(verify_request(&id, "wrong")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = body_text(response).await;
    assert!(page.contains("error=incorrect-captcha-sol"));
    assert!(page.contains("Incorrect answer"));

    let response = app.clone().oneshot(verify_request(&id, "right")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Verified"));

    // A verified session is discarded and cannot be replayed
    let response = app.oneshot(verify_request(&id, "right")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(state.sessions.len().await, 0);
}

#[tokio::test]
async fn test_authority_failure_is_not_a_wrong_answer() {
    let server = MockServer::start().await;
    mount_reply(&server, 500, "", 1).await;
    mount_reply(&server, 200, "true\n", 1).await;

    let state = test_state(server.uri());
    let id = state.sessions.insert(state.new_session()).await;
    let app = app(state.clone());

    let response = app.clone().oneshot(verify_request(&id, "right")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let page = body_text(response).await;
    assert!(!page.contains("Incorrect answer"));
    assert!(page.contains("temporarily unavailable"));

    // Session survives the fault and can still be verified
    let response = app.oneshot(verify_request(&id, "right")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_reply_keeps_session() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, "<html>maintenance</html>\n", 1).await;

    let state = test_state(server.uri());
    let id = state.sessions.insert(state.new_session()).await;

    let response = app(state.clone()).oneshot(verify_request(&id, "x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(!body_text(response).await.contains("Incorrect answer"));
    assert_eq!(state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_unknown_session() {
    let server = MockServer::start().await;
    let state = test_state(server.uri());

    let response = app(state).oneshot(verify_request("nope", "x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(server.received_requests().await.unwrap().is_empty());
}
