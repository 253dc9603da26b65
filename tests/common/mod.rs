#![allow(dead_code)]

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use admindash::api::{AdminApi, Fetcher, HttpTransport, Transport};
use admindash::config::AdminConfig;
use admindash::identity::{SessionBridge, TokenClaims, TokenSigner};

pub const SECRET: &str = "integration-secret";
pub const ADMIN_EMAIL: &str = "admin@blog.test";
pub const USER_EMAIL: &str = "reader@blog.test";
pub const PASSWORD: &str = "correct horse";

/// Requests the fake backend saw, as `"METHOD /path?query"`.
#[derive(Default)]
pub struct Seen {
    pub requests: Mutex<Vec<String>>,
    pub bearer: Mutex<Vec<Option<TokenClaims>>>,
}

impl Seen {
    pub fn requests(&self) -> Vec<String> { self.requests.lock().clone() }

    fn record(&self, method: &str, path: &str, query: &Option<String>) {
        let line = match query {
            Some(q) => format!("{} {}?{}", method, path, q),
            None => format!("{} {}", method, path),
        };
        self.requests.lock().push(line);
    }
}

type Shared = State<Arc<Seen>>;

/// Verifies the bearer token the way the real backend does.
fn admin_claims(seen: &Seen, headers: &HeaderMap) -> Result<TokenClaims, (StatusCode, Json<Value>)> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");
    let claims = TokenSigner::new(SECRET).ok().and_then(|s| s.verify::<TokenClaims>(token).ok());
    seen.bearer.lock().push(claims.clone());
    match claims {
        Some(c) if c.identity.is_admin() => Ok(c),
        Some(_) => Err((StatusCode::FORBIDDEN, Json(json!({"message": "Admins only"})))),
        None => Err((StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"})))),
    }
}

async fn auth(State(seen): Shared, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    seen.record("POST", "/api/admin/auth", &None);
    let email = body.get("email").and_then(|v| v.as_str()).unwrap_or("");
    let password = body.get("password").and_then(|v| v.as_str()).unwrap_or("");
    if password != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"})));
    }
    let role = match email {
        ADMIN_EMAIL => "ADMIN",
        USER_EMAIL => "USER",
        _ => return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"}))),
    };
    (
        StatusCode::OK,
        Json(json!({
            "id": format!("{}-id", role.to_lowercase()),
            "username": role.to_lowercase(),
            "email": email,
            "image": null,
            "role": role,
            "password": "$argon2id$v=19$hash",
            "status": "ALLOWED",
            "createdAt": "2024-03-01T10:00:00.000Z"
        })),
    )
}

fn user_row(n: u32, role: &str) -> Value {
    json!({
        "id": format!("u{}", n),
        "username": format!("user{}", n),
        "email": format!("user{}@blog.test", n),
        "role": role,
        "status": "ALLOWED",
        "private": false,
        "createdAt": "2024-05-06T07:08:09.000Z",
        "_count": {"blogThread": 1, "blogThreadLike": 0, "likes": 3, "threads": 2, "blogLikes": 5}
    })
}

async fn users_list(State(seen): Shared, headers: HeaderMap, RawQuery(query): RawQuery) -> (StatusCode, Json<Value>) {
    seen.record("GET", "/api/admin/users/list", &query);
    if let Err(e) = admin_claims(&seen, &headers) {
        return e;
    }
    let q = query.unwrap_or_default();
    let page: u32 = q
        .split('&')
        .find_map(|kv| kv.strip_prefix("page="))
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let role = q.split('&').find_map(|kv| kv.strip_prefix("role=")).unwrap_or("USER").to_string();
    let users: Vec<Value> = (0..2).map(|i| user_row(page * 10 + i, &role)).collect();
    (
        StatusCode::OK,
        Json(json!({"users": users, "total": 6, "total_pages": 3, "limit": 20, "page": page})),
    )
}

async fn blogs(State(seen): Shared, headers: HeaderMap, RawQuery(query): RawQuery) -> (StatusCode, Json<Value>) {
    seen.record("GET", "/api/admin/blogs", &query);
    if let Err(e) = admin_claims(&seen, &headers) {
        return e;
    }
    let page: u32 = query
        .unwrap_or_default()
        .split('&')
        .find_map(|kv| kv.strip_prefix("page="))
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let data: Vec<Value> = (0..2)
        .map(|i| {
            json!({
                "id": format!("b{}{}", page, i),
                "title": format!("Post {}.{}", page, i),
                "slug": format!("post-{}-{}", page, i),
                "tags": ["rust"],
                "username": "author",
                "user_id": "a1",
                "views": 10,
                "likes_count": 2,
                "createdAt": "2024-06-01T00:00:00.000Z"
            })
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({"data": data, "page": page, "total_pages": 2, "total_blogs": 4, "topTags": ["rust", "film", "travel"]})),
    )
}

async fn delete_blog(State(seen): Shared, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    seen.record("DELETE", "/api/admin/blogs/delete", &None);
    if let Err(e) = admin_claims(&seen, &headers) {
        return e;
    }
    (StatusCode::OK, Json(json!({"message": "Blog deleted"})))
}

async fn dashboard(State(seen): Shared, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    seen.record("GET", "/api/admin/dashboard/data", &None);
    if let Err(e) = admin_claims(&seen, &headers) {
        return e;
    }
    (
        StatusCode::OK,
        Json(json!({
            "discussions": {"count": 4, "last7Days": 1},
            "blogs": {"count": 12, "last7Days": 3},
            "threads": {"count": 40, "last7Days": 9},
            "users": {"count": 7, "last7Days": 2},
            "lastFive": {"users": [user_row(1, "USER")], "blogs": [], "threads": []}
        })),
    )
}

async fn upload(State(seen): Shared, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    seen.record("POST", "/api/upload/image", &None);
    let multipart = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);
    if !multipart {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "expected a form upload"})));
    }
    (StatusCode::OK, Json(json!({"url": "https://cdn.test/img/1.png", "public_id": "img/1"})))
}

/// In-process stand-in for the blog backend, stopped on drop.
pub struct Backend {
    pub origin: String,
    pub seen: Arc<Seen>,
    task: JoinHandle<()>,
}

impl Drop for Backend {
    fn drop(&mut self) { self.task.abort(); }
}

pub async fn start_backend() -> Backend {
    let seen = Arc::new(Seen::default());
    let app = Router::new()
        .route("/api/admin/auth", post(auth))
        .route("/api/admin/users/list", get(users_list))
        .route("/api/admin/blogs", get(blogs))
        .route("/api/admin/blogs/delete/{slug}", delete(delete_blog))
        .route("/api/admin/dashboard/data", get(dashboard))
        .route("/api/upload/image", post(upload))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock backend error: {e:?}");
        }
    });
    Backend { origin: format!("http://127.0.0.1:{}", port), seen, task }
}

pub struct Wired {
    pub cfg: AdminConfig,
    pub bridge: Arc<SessionBridge>,
    pub api: AdminApi,
}

/// Real HTTP transport, session bridge and admin API pointed at `backend`.
pub fn wire(backend: &Backend) -> Wired {
    let cfg = AdminConfig::new(backend.origin.as_str(), "http://site.test", SECRET);
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new().expect("http client"));
    let bridge = Arc::new(SessionBridge::from_config(&cfg, transport.clone()).expect("bridge"));
    let api = AdminApi::new(Fetcher::new(cfg.clone(), transport, bridge.clone()));
    Wired { cfg, bridge, api }
}
