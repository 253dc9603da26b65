use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use tracing::debug;

use super::principal::Identity;
use crate::api::transport::{ApiRequest, Body, Method, Transport};
use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new<S: Into<String>>(email: S, password: S) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

/// The remote credential authority. Resolves with the verified identity or an
/// `AppError::Credential`/`AppError::Transport` describing why not.
pub trait AuthProvider: Send + Sync {
    fn login<'a>(&'a self, req: &'a LoginRequest) -> BoxFuture<'a, AppResult<Identity>>;
}

/// `POST {backend}/api/admin/auth` with `{email, password}`.
pub struct RemoteAuthProvider {
    url: String,
    transport: Arc<dyn Transport>,
}

impl RemoteAuthProvider {
    pub fn new(cfg: &AdminConfig, transport: Arc<dyn Transport>) -> Self {
        Self { url: cfg.admin_url("/auth"), transport }
    }

    async fn verify(&self, req: &LoginRequest) -> AppResult<Identity> {
        let body = serde_json::to_string(req).map_err(|e| AppError::Internal(e.to_string()))?;
        let resp = self
            .transport
            .send(ApiRequest {
                method: Method::Post,
                url: self.url.clone(),
                headers: vec![("Content-Type".into(), "application/json".into())],
                body: Some(Body::Json(body)),
            })
            .await?;
        if !resp.is_success() {
            return Err(AppError::Credential(format!("authority answered HTTP {} {}", resp.status, resp.status_text)));
        }
        let identity: Identity = resp
            .json()
            .map_err(|e| AppError::Credential(format!("malformed identity payload: {}", e)))?;
        if identity.id.is_none() && identity.email.is_none() {
            return Err(AppError::Credential("identity payload has neither id nor email".into()));
        }
        debug!(target: "auth", email = ?identity.email, role = ?identity.role, "authority accepted credentials");
        Ok(identity)
    }
}

impl AuthProvider for RemoteAuthProvider {
    fn login<'a>(&'a self, req: &'a LoginRequest) -> BoxFuture<'a, AppResult<Identity>> {
        self.verify(req).boxed()
    }
}
