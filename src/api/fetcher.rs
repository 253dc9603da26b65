use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, Body, Method, Transport};
use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::identity::Session;

/// Where the fetcher gets the current session from. Resolved on every request.
pub trait SessionSource: Send + Sync {
    fn current_session(&self) -> Option<Session>;
}

/// No session at all; requests go out with an empty bearer.
pub struct Anonymous;

impl SessionSource for Anonymous {
    fn current_session(&self) -> Option<Session> { None }
}

/// Caller overrides for a single request. Headers given here replace the
/// fetcher's defaults of the same name.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl RequestOptions {
    pub fn get() -> Self { Self::default() }

    pub fn delete() -> Self { Self { method: Method::Delete, ..Self::default() } }

    pub fn post_json<T: Serialize>(payload: &T) -> AppResult<Self> {
        Self::json(Method::Post, payload)
    }

    pub fn json<T: Serialize>(method: Method, payload: &T) -> AppResult<Self> {
        let text = serde_json::to_string(payload).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self { method, headers: Vec::new(), body: Some(Body::Json(text)) })
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// The one function every view calls the backend through.
#[derive(Clone)]
pub struct Fetcher {
    cfg: AdminConfig,
    transport: Arc<dyn Transport>,
    sessions: Arc<dyn SessionSource>,
}

impl Fetcher {
    pub fn new(cfg: AdminConfig, transport: Arc<dyn Transport>, sessions: Arc<dyn SessionSource>) -> Self {
        Self { cfg, transport, sessions }
    }

    pub fn config(&self) -> &AdminConfig { &self.cfg }

    pub fn transport(&self) -> Arc<dyn Transport> { self.transport.clone() }

    /// Issue `path` against `{backend}/api/admin`. An empty path resolves to
    /// `None` without touching the network.
    pub async fn request(&self, path: &str, opts: RequestOptions) -> AppResult<Option<Value>> {
        Ok(self.exchange(path, opts).await?.map(|(_, body)| body))
    }

    /// `request` plus deserialization into the caller's expected shape.
    pub async fn request_as<T: DeserializeOwned>(&self, path: &str, opts: RequestOptions) -> AppResult<Option<T>> {
        let Some((resp, body)) = self.exchange(path, opts).await? else { return Ok(None); };
        match serde_json::from_value(body) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(target: "fetch", status = resp.status, path = %path, error = %e, "unexpected response shape");
                Err(AppError::decode(resp.status, resp.status_text))
            }
        }
    }

    async fn exchange(&self, path: &str, opts: RequestOptions) -> AppResult<Option<(ApiResponse, Value)>> {
        if path.is_empty() {
            return Ok(None);
        }
        let req = self.build(path, opts);
        debug!(target: "fetch", method = %req.method, path = %path, "request");
        let resp = self.transport.send(req).await?;

        let body: Value = match resp.json() {
            Ok(v) => v,
            Err(_) => {
                warn!(target: "fetch", status = resp.status, status_text = %resp.status_text, path = %path, "unparseable response body");
                return Err(AppError::decode(resp.status, resp.status_text));
            }
        };
        if !resp.is_success() {
            warn!(target: "fetch", status = resp.status, status_text = %resp.status_text, path = %path, "Error in fetch");
            let message = body.get("message").and_then(|m| m.as_str()).map(|m| m.to_string());
            return Err(AppError::remote(resp.status, resp.status_text, message));
        }
        Ok(Some((resp, body)))
    }

    fn build(&self, path: &str, opts: RequestOptions) -> ApiRequest {
        let token = self.sessions.current_session().map(|s| s.access_token).unwrap_or_default();
        let mut headers: Vec<(String, String)> = vec![
            ("Authorization".to_string(), format!("Bearer {}", token)),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        for (name, value) in opts.headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }
        ApiRequest { method: opts.method, url: self.cfg.admin_url(path), headers, body: opts.body }
    }
}
