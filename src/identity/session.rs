use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde::Serialize;
use tracing::debug;

use super::principal::{Identity, TokenClaims};
use super::signer::TokenSigner;
use crate::error::AppResult;

pub type AccessToken = String;

/// What a page sees: the whitelisted identity plus a freshly signed bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: Identity,
    #[serde(rename = "accessToken")]
    pub access_token: AccessToken,
    pub expires: DateTime<Utc>,
}

/// Client-side holder of the current token claims. Only the claims are kept; the
/// signed token is derived again on every read.
#[derive(Debug, Default)]
pub struct SessionStore {
    claims: RwLock<Option<TokenClaims>>,
}

impl SessionStore {
    pub fn new() -> Self { Self::default() }

    /// Persist `identity` for `max_age` starting now.
    pub fn store(&self, identity: Identity, max_age: Duration) -> TokenClaims {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims { identity, iat, exp: iat.saturating_add(ttl) };
        *self.claims.write() = Some(claims.clone());
        claims
    }

    /// Current claims, dropping them once expired. The expiry check and the
    /// removal happen under one lock so a concurrent `store` is never lost.
    pub fn claims(&self) -> Option<TokenClaims> {
        let now = Utc::now().timestamp();
        let slot = self.claims.upgradable_read();
        let exp = match slot.as_ref() {
            None => return None,
            Some(c) if c.exp > now => return Some(c.clone()),
            Some(c) => c.exp,
        };
        debug!(target: "auth", exp, "session expired");
        RwLockUpgradableReadGuard::upgrade(slot).take();
        None
    }

    /// Re-sign the stored claims into a session projection.
    pub fn read(&self, signer: &TokenSigner) -> AppResult<Option<Session>> {
        let Some(claims) = self.claims() else { return Ok(None); };
        let access_token = signer.sign(&claims)?;
        let expires = Utc.timestamp_opt(claims.exp, 0).single().unwrap_or(DateTime::<Utc>::MAX_UTC);
        Ok(Some(Session { user: claims.identity, access_token, expires }))
    }

    pub fn clear(&self) -> bool {
        self.claims.write().take().is_some()
    }

    pub fn is_present(&self) -> bool {
        self.claims.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    fn admin() -> Identity {
        Identity {
            id: Some("1".into()),
            username: Some("root".into()),
            email: Some("root@x.io".into()),
            image: None,
            role: Some(Role::Admin),
        }
    }

    #[test]
    fn read_resigns_from_stored_claims() {
        let store = SessionStore::new();
        let signer = TokenSigner::new("k").unwrap();
        store.store(admin(), Duration::from_secs(60));
        let s = store.read(&signer).unwrap().unwrap();
        assert_eq!(s.user, admin());
        let back: TokenClaims = signer.verify(&s.access_token).unwrap();
        assert_eq!(back.identity, admin());
    }

    #[test]
    fn rotated_secret_applies_on_next_read() {
        let store = SessionStore::new();
        store.store(admin(), Duration::from_secs(60));
        let old = TokenSigner::new("old").unwrap();
        let new = TokenSigner::new("new").unwrap();
        let tok = store.read(&new).unwrap().unwrap().access_token;
        assert!(new.verify::<TokenClaims>(&tok).is_ok());
        assert!(old.verify::<TokenClaims>(&tok).is_err());
    }

    #[test]
    fn expired_session_is_destroyed() {
        let store = SessionStore::new();
        store.store(admin(), Duration::from_secs(0));
        assert!(store.claims().is_none());
        assert!(!store.is_present());
    }

    #[test]
    fn huge_max_age_saturates_instead_of_overflowing() {
        let store = SessionStore::new();
        let claims = store.store(admin(), Duration::from_secs(i64::MAX as u64));
        assert_eq!(claims.exp, i64::MAX);
        assert!(store.claims().is_some());

        let claims = store.store(admin(), Duration::from_secs(u64::MAX));
        assert_eq!(claims.exp, i64::MAX);
        let s = store.read(&TokenSigner::new("k").unwrap()).unwrap().expect("still signed in");
        assert_eq!(s.expires, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn expiry_sweep_never_drops_a_fresh_login() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        store.claims();
                    }
                })
            })
            .collect();
        for _ in 0..2_000 {
            store.store(admin(), Duration::from_secs(0));
            store.store(admin(), Duration::from_secs(60));
        }
        for r in readers {
            r.join().unwrap();
        }
        assert!(store.claims().is_some());
    }

    #[test]
    fn clear_reports_removal() {
        let store = SessionStore::new();
        assert!(!store.clear());
        store.store(admin(), Duration::from_secs(60));
        assert!(store.clear());
        assert!(store.read(&TokenSigner::new("k").unwrap()).unwrap().is_none());
    }
}
