//! In-memory transport for unit tests. Every request is recorded and answered by
//! a caller-supplied handler.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::AppResult;

type Handler = dyn Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync;

#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<Handler>,
    seen: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> AppResult<ApiResponse> + Send + Sync + 'static,
    {
        Self { handler: Arc::new(handler), seen: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Answer every request with the same status and JSON body.
    pub fn always(status: u16, body: Value) -> Self {
        Self::new(move |_| Ok(json_response(status, &body)))
    }

    pub fn calls(&self) -> usize { self.seen.lock().len() }

    pub fn requests(&self) -> Vec<ApiRequest> { self.seen.lock().clone() }

    pub fn last(&self) -> Option<ApiRequest> { self.seen.lock().last().cloned() }
}

impl Transport for MockTransport {
    fn send(&self, req: ApiRequest) -> BoxFuture<'_, AppResult<ApiResponse>> {
        let out = (self.handler)(&req);
        self.seen.lock().push(req);
        async move { out }.boxed()
    }
}

pub fn json_response(status: u16, body: &Value) -> ApiResponse {
    raw_response(status, body.to_string().into_bytes())
}

pub fn raw_response(status: u16, body: Vec<u8>) -> ApiResponse {
    let status_text = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string();
    ApiResponse { status, status_text, body }
}
