//! Bearer-token request guard for Rocket routes.
//!
//! The guard extracts a token from the `Authorization` header (raw value
//! or `Bearer` scheme) or the `access_token` query parameter, verifies it
//! against the managed [`JwtKeys`], and attaches the decoded claims to the
//! request. Requests with no token at all are rejected with 403; requests
//! with a token that fails verification (bad signature, expired) with 401.
//!
//! ```rust
//! use rocket::get;
//! use spinhub_api::auth::AuthenticatedUser;
//!
//! #[get("/profile")]
//! fn get_profile(user: AuthenticatedUser) -> String {
//!     format!("Welcome, {}!", user.claims.email)
//! }
//! ```

use rocket::State;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::auth::claims::Claims;
use crate::auth::jwt::JwtKeys;

/// A request guard for routes that require a verified bearer token.
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// Decoded claims from the presented token
    pub claims: Claims,
}

/// Pulls a candidate token out of the request, header first.
///
/// The header value is accepted both bare and `Bearer`-prefixed; machine
/// controllers send the raw token.
fn token_from_request(request: &Request<'_>) -> Option<String> {
    if let Some(header) = request.headers().get_one("Authorization") {
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        return Some(token.trim().to_string());
    }

    match request.query_value::<String>("access_token") {
        Some(Ok(token)) => Some(token),
        _ => None,
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let keys = match request.guard::<&State<JwtKeys>>().await {
            Outcome::Success(keys) => keys,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        // No token anywhere on the request
        let token = match token_from_request(request) {
            Some(token) => token,
            None => return Outcome::Error((Status::Forbidden, ())),
        };

        match keys.validate(&token) {
            Ok(claims) => Outcome::Success(AuthenticatedUser { claims }),
            Err(e) => {
                info!("Rejected bearer token: {}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}
