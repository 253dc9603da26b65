use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::principal::Identity;
use super::provider::{AuthProvider, LoginRequest, RemoteAuthProvider};
use super::session::{Session, SessionStore};
use super::signer::TokenSigner;
use crate::api::fetcher::SessionSource;
use crate::api::transport::Transport;
use crate::config::AdminConfig;
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Login flow: verifies credentials with the authority, keeps the whitelisted
/// claims, and hands out freshly signed sessions on every read.
pub struct SessionBridge {
    provider: Arc<dyn AuthProvider>,
    signer: TokenSigner,
    store: SessionStore,
    max_age: Duration,
}

impl SessionBridge {
    pub fn new(provider: Arc<dyn AuthProvider>, signer: TokenSigner, max_age: Duration) -> Self {
        Self { provider, signer, store: SessionStore::new(), max_age }
    }

    /// Remote authority at `{backend}/api/admin/auth`, signer keyed by the configured secret.
    pub fn from_config(cfg: &AdminConfig, transport: Arc<dyn Transport>) -> AppResult<Self> {
        let signer = TokenSigner::from_config(cfg)?;
        let provider = Arc::new(RemoteAuthProvider::new(cfg, transport));
        Ok(Self::new(provider, signer, cfg.session_max_age))
    }

    /// Never fails past this boundary: any rejection is logged and reported as `None`.
    pub async fn login(&self, email: &str, password: &str) -> Option<Session> {
        let req = LoginRequest::new(email, password);
        let identity = match self.provider.login(&req).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(target: "auth", email = %email, error = %e, "Error while authorizing user");
                return None;
            }
        };
        let claims = self.store.store(identity, self.max_age);
        info!(target: "auth", id = ?claims.identity.id, role = ?claims.identity.role, "session created");
        self.current()
    }

    /// The session as a page sees it, re-signed on every call.
    pub fn current(&self) -> Option<Session> {
        match self.store.read(&self.signer) {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "auth", error = %e, "could not sign session token");
                None
            }
        }
    }

    /// Whitelisted claims held for the current session.
    pub fn identity(&self) -> Option<Identity> {
        self.store.claims().map(|c| c.identity)
    }

    pub fn logout(&self) -> bool {
        let removed = self.store.clear();
        if removed { info!(target: "auth", "session destroyed"); }
        removed
    }

    pub fn state(&self) -> AuthState {
        if self.store.claims().is_some() { AuthState::Authenticated } else { AuthState::Unauthenticated }
    }

    pub fn signer(&self) -> &TokenSigner { &self.signer }
}

impl SessionSource for SessionBridge {
    fn current_session(&self) -> Option<Session> {
        self.current()
    }
}
