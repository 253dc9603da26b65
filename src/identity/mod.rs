//! Identity, session and access control for the admin dashboard.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod signer;
mod session;
mod provider;
mod bridge;
mod guard;

pub use principal::{Identity, Role, TokenClaims};
pub use signer::TokenSigner;
pub use session::{AccessToken, Session, SessionStore};
pub use provider::{AuthProvider, LoginRequest, RemoteAuthProvider};
pub use bridge::{AuthState, SessionBridge};
pub use guard::{GuardDecision, RouteGuard, SIGN_IN_PATH};
