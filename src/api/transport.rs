use std::fmt;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A single file sent as one multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Pre-serialized JSON text.
    Json(String),
    Multipart(FilePart),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The network seam. Implementations must resolve with a response for any status
/// code and only fail when no response was received.
pub trait Transport: Send + Sync {
    fn send(&self, req: ApiRequest) -> BoxFuture<'_, AppResult<ApiResponse>>;
}

/// reqwest-backed transport. The cookie store plays the part of `credentials: include`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> AppResult<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self { Self { client } }

    async fn execute(&self, req: ApiRequest) -> AppResult<ApiResponse> {
        let method = reqwest::Method::from_bytes(req.method.as_str().as_bytes())
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let mut headers = HeaderMap::new();
        for (k, v) in &req.headers {
            // Never sent, so it surfaces like any other request that got no response.
            let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| AppError::Transport(format!("bad header name '{}': {}", k, e)))?;
            let value = HeaderValue::from_str(v).map_err(|e| AppError::Transport(format!("bad header value for '{}': {}", k, e)))?;
            headers.insert(name, value);
        }
        let mut builder = self.client.request(method, &req.url).headers(headers);
        match req.body {
            Some(Body::Json(text)) => { builder = builder.body(text); }
            Some(Body::Multipart(part)) => {
                let mut file = reqwest::multipart::Part::bytes(part.bytes).file_name(part.file_name);
                if let Some(m) = part.mime.as_deref() { file = file.mime_str(m)?; }
                builder = builder.multipart(reqwest::multipart::Form::new().part(part.field, file));
            }
            None => {}
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        Ok(ApiResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, req: ApiRequest) -> BoxFuture<'_, AppResult<ApiResponse>> {
        self.execute(req).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = ApiRequest {
            method: Method::Get,
            url: "http://x".into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[tokio::test]
    async fn unsendable_header_is_a_transport_error() {
        let http = HttpTransport::new().unwrap();
        for (name, value) in [("X Bad Name", "v"), ("X-Trace", "line\nbreak")] {
            let err = http
                .send(ApiRequest {
                    method: Method::Get,
                    url: "http://127.0.0.1:9/never".into(),
                    headers: vec![(name.into(), value.into())],
                    body: None,
                })
                .await
                .unwrap_err();
            assert_eq!(err.code_str(), "transport", "{} -> {:?}", name, err);
        }
    }

    #[test]
    fn success_range() {
        let ok = ApiResponse { status: 204, status_text: "No Content".into(), body: vec![] };
        let bad = ApiResponse { status: 302, status_text: "Found".into(), body: vec![] };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
