//! HTTP route handlers for the gate.

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

mod captcha;
mod health;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // Leave room for the authority's own timeout to surface as a 502 first
    let request_timeout = state.config.authority.timeout() + Duration::from_secs(5);

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/stats", get(health::stats))

        // CAPTCHA endpoints
        .route("/challenge", get(captcha::get_challenge))
        .route("/verify", post(captcha::verify_challenge))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )

        // Add shared state
        .with_state(state)
}

#[cfg(test)]
mod tests;
