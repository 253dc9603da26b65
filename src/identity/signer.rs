use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};

/// HS256 signer over a symmetric secret. Stateless: the same claims and secret
/// always produce the same token.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::Config("token signing secret is empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn from_config(cfg: &AdminConfig) -> AppResult<Self> {
        Self::new(cfg.auth_secret())
    }

    /// Encode `claims` as `header.body.signature`. No expiry is added here; callers
    /// embed `exp` in the claims when they want one.
    pub fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        let header = Header::new(Algorithm::HS256);
        Ok(jsonwebtoken::encode(&header, claims, &self.encoding)?)
    }

    /// Check the signature and return the claims. `exp` is enforced when present.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> AppResult<T> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<T>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSigner { alg: HS256, secret: <redacted> }")
    }
}
