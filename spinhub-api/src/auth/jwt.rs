//! JWT issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::models::User;

/// Default token lifetime when `JWT_TTL_SECS` is not configured.
const DEFAULT_TTL_SECS: i64 = 86_400;

/// Manages the HS256 signing keys and token lifetime.
///
/// Managed as Rocket state; built from the environment at launch and from
/// a fixed test secret in `orm::testing`.
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtKeys {
    /// Create a new `JwtKeys` with the given secret and token lifetime.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Build keys from `JWT_SECRET` / `JWT_TTL_SECS`.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is unset; the server cannot gate anything
    /// without it.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let ttl_secs = std::env::var("JWT_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS);
        Self::new(secret.as_bytes(), ttl_secs)
    }

    /// Issue an access token for the given user.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_ttl(user, self.ttl_secs)
    }

    /// Issue a token with an explicit lifetime. Negative lifetimes produce
    /// already-expired tokens, which the tests lean on.
    pub fn issue_with_ttl(
        &self,
        user: &User,
        ttl_secs: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = now_secs();
        let claims = Claims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            iat: now,
            exp: now + ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token's signature and expiry and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
