use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::principal::Role;
use super::session::Session;

pub const SIGN_IN_PATH: &str = "/auth/signin";

// Paths that never pass through the guard: API routes, static and optimized
// image assets, the favicon, and the sign-in pages themselves.
static UNGUARDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(?:api|_next/static|_next/image|favicon\.ico|auth)").expect("static regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Path is outside the matcher; no check performed.
    Skip,
    Allow,
    Redirect { location: String },
}

/// Navigation gate admitting only the administrative role.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: Role,
    sign_in: String,
}

impl Default for RouteGuard {
    fn default() -> Self { Self { required: Role::Admin, sign_in: SIGN_IN_PATH.to_string() } }
}

impl RouteGuard {
    pub fn new() -> Self { Self::default() }

    pub fn is_guarded(&self, path: &str) -> bool {
        !UNGUARDED.is_match(path)
    }

    pub fn check(&self, path: &str, session: Option<&Session>) -> GuardDecision {
        if !self.is_guarded(path) {
            return GuardDecision::Skip;
        }
        let role = session.and_then(|s| s.user.role);
        if role == Some(self.required) {
            return GuardDecision::Allow;
        }
        debug!(target: "auth", path = %path, role = ?role, "guard redirect");
        GuardDecision::Redirect { location: self.sign_in_location(path) }
    }

    fn sign_in_location(&self, path: &str) -> String {
        format!("{}?callbackUrl={}", self.sign_in, urlencoding::encode(path))
    }
}
