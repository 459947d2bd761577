//! API endpoints for user login and authentication.
//!
//! This module provides HTTP endpoints for user authentication and token
//! issuance. It handles user login requests, generates signed access
//! tokens, and provides an authenticated probe endpoint.

use rocket::{Route, State, get, post, serde::json::Json};
use rocket::response;
use rocket::serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::auth::{AuthenticatedUser, Claims, JwtKeys};
use crate::orm::login::process_login;

/// Login success response containing the access token and user information.
#[derive(Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub name: String,
}

/// Login request structure containing user credentials.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login endpoint that authenticates users and issues access tokens.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates a user by email and password and returns a
///   signed bearer token
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "userpassword"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiJ9...",
///   "user_id": 7,
///   "email": "user@example.com",
///   "name": "Jane Rider"
/// }
/// ```
///
/// **Failure (HTTP 401 Unauthorized):**
/// ```json
/// { "error": "Invalid credentials" }
/// ```
///
/// # Security
/// - Passwords are verified using Argon2 hashing
/// - Invalid credentials return generic error messages to prevent
///   enumeration
/// - The token carries the user id and email as claims; clients present it
///   in the `Authorization` header or the `access_token` query parameter
#[post("/1/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    keys: &State<JwtKeys>,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    match process_login(&db, keys.inner(), &login).await {
        Ok((user, token)) => Ok(Json(LoginSuccessResponse {
            token,
            user_id: user.id,
            email: user.email,
            name: user.name,
        })),
        Err(status) => {
            let err_json = Json(ErrorResponse::new("Invalid credentials"));
            Err(response::status::Custom(status, err_json))
        }
    }
}

/// Hello (Authentication Check) endpoint.
///
/// - **URL:** `/api/1/hello`
/// - **Method:** `GET`
/// - **Purpose:** Returns the caller's decoded claims; useful for checking
///   token validity
/// - **Authentication:** Required
///
/// The `AuthenticatedUser` guard rejects requests without a token with 403
/// and requests with an invalid or expired token with 401.
#[get("/1/hello")]
pub fn secure_hello(auth_user: AuthenticatedUser) -> Json<Claims> {
    Json(auth_user.claims)
}

/// Returns all login-related API routes.
pub fn routes() -> Vec<Route> {
    routes![login, secure_hello]
}
