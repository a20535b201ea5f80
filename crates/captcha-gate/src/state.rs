//! Application state and the in-memory session registry.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use captcha_session::{AuthorityEndpoints, HttpAuthority, VerificationSession};

use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Authority client (shared connection pool)
    pub authority: HttpAuthority,

    /// Widget and verify endpoints
    pub endpoints: AuthorityEndpoints,

    /// Sessions waiting for an answer
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let authority = HttpAuthority::with_timeout(
            config.authority.verify_url.clone(),
            config.authority.timeout(),
        )
        .context("Failed to create authority client")?;

        let endpoints = config.authority.endpoints();
        let sessions = SessionRegistry::new(config.session_ttl_secs);

        Ok(Self {
            config,
            authority,
            endpoints,
            sessions,
        })
    }

    /// Start a fresh session with the configured credentials
    pub fn new_session(&self) -> VerificationSession {
        VerificationSession::new(
            self.config.public_key.clone(),
            self.config.private_key.clone(),
            self.authority.clone(),
        )
        .with_endpoints(self.endpoints.clone())
    }
}

struct StoredSession {
    session: VerificationSession,
    expires_at: i64,
}

/// Sessions keyed by a random id.
///
/// A session is taken out for the duration of a verification and put back afterwards
/// unless it succeeded, so the same session is never verified by two requests at once.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    ttl_secs: u64,
}

impl SessionRegistry {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs,
        }
    }

    /// Store a session and return its id
    pub async fn insert(&self, session: VerificationSession) -> String {
        let id = generate_session_id();
        self.put_back(&id, session).await;
        id
    }

    /// Store a session under an existing id, restarting its lifetime
    pub async fn put_back(&self, id: &str, session: VerificationSession) {
        let expires_at = chrono::Utc::now().timestamp() + self.ttl_secs as i64;
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions);
        sessions.insert(id.to_string(), StoredSession { session, expires_at });
    }

    /// Remove and return a live session
    pub async fn take(&self, id: &str) -> Option<VerificationSession> {
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions);
        sessions.remove(id).map(|stored| stored.session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn prune_expired(sessions: &mut HashMap<String, StoredSession>) {
    let now = chrono::Utc::now().timestamp();
    let before = sessions.len();
    sessions.retain(|_, stored| now < stored.expires_at);

    let pruned = before - sessions.len();
    if pruned > 0 {
        tracing::debug!(pruned, remaining = sessions.len(), "Pruned expired sessions");
    }
}

/// Generate a cryptographically random session ID
fn generate_session_id() -> String {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use rand::Rng;

    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
