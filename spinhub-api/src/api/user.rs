//! API endpoints for managing users.
//!
//! This module provides HTTP endpoints for sign-up, profile reads, and the
//! password-reset flow. Sign-up is open; profile reads require a token.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::Deserialize;
use rocket::serde::json::Json;
use ts_rs::TS;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::auth::AuthenticatedUser;
use crate::models::{UserInput, UserProfile};
use crate::orm::login::hash_password;
use crate::orm::user::{
    get_user, get_user_by_email, insert_user, redeem_reset_code, set_reset_code,
};

/// Sign-up request. The password arrives in plain text and is hashed
/// server-side before storage.
#[derive(Deserialize, TS)]
#[ts(export)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub rfid: Option<i64>,
}

#[derive(Deserialize)]
pub struct ResetCodeRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub reset_code: String,
    pub new_password: String,
}

/// Create User endpoint.
///
/// - **URL:** `/api/1/users`
/// - **Method:** `POST`
/// - **Purpose:** Creates a new user account
/// - **Authentication:** None required (open sign-up)
///
/// # Request Format
///
/// ```json
/// {
///   "name": "Jane Rider",
///   "email": "jane@example.com",
///   "password": "plaintext",
///   "weight": 61.5,
///   "rfid": 9000000001
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** the created profile, without credential
/// material.
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "Email and password must not be empty" }
/// ```
///
/// **Failure (HTTP 409 Conflict):**
/// ```json
/// { "error": "User with this email already exists" }
/// ```
#[post("/1/users", data = "<signup>")]
pub async fn create_user(
    db: DbConn,
    signup: Json<SignupRequest>,
) -> Result<status::Created<Json<UserProfile>>, response::status::Custom<Json<ErrorResponse>>> {
    let signup = signup.into_inner();

    if signup.email.trim().is_empty() || signup.password.trim().is_empty() {
        return Err(response::status::Custom(
            Status::BadRequest,
            Json(ErrorResponse::new("Email and password must not be empty")),
        ));
    }

    let email = signup.email.clone();
    let existing = db
        .run(move |conn| get_user_by_email(conn, &email))
        .await
        .map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Database error while creating user")),
            )
        })?;

    if existing.is_some() {
        return Err(response::status::Custom(
            Status::Conflict,
            Json(ErrorResponse::new("User with this email already exists")),
        ));
    }

    let user_input = UserInput {
        name: signup.name,
        email: signup.email,
        password_hash: hash_password(&signup.password),
        gender: signup.gender,
        weight: signup.weight,
        age: signup.age,
        height: signup.height,
        rfid: signup.rfid,
    };

    let user = db
        .run(move |conn| insert_user(conn, user_input))
        .await
        .map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Database error while creating user")),
            )
        })?;

    let location = format!("/api/1/users/{}", user.id);
    Ok(status::Created::new(location).body(Json(UserProfile::from(user))))
}

/// Current-user profile endpoint.
///
/// - **URL:** `/api/1/users/me`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Resolves the caller from their token claims and returns the stored
/// profile. Returns 404 when the account behind the token no longer
/// exists.
#[get("/1/users/me")]
pub async fn get_me(
    auth_user: AuthenticatedUser,
    db: DbConn,
) -> Result<Json<UserProfile>, response::status::Custom<Json<ErrorResponse>>> {
    let user_id = auth_user.claims.user_id;
    let user = db
        .run(move |conn| get_user(conn, user_id))
        .await
        .map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Database error while fetching user")),
            )
        })?;

    match user {
        Some(user) => Ok(Json(UserProfile::from(user))),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("User not found")),
        )),
    }
}

/// Profile read by id. Requires a token.
#[get("/1/users/<user_id>")]
pub async fn get_user_by_id(
    _auth: AuthenticatedUser,
    db: DbConn,
    user_id: i32,
) -> Result<Json<UserProfile>, response::status::Custom<Json<ErrorResponse>>> {
    let user = db
        .run(move |conn| get_user(conn, user_id))
        .await
        .map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Database error while fetching user")),
            )
        })?;

    match user {
        Some(user) => Ok(Json(UserProfile::from(user))),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("User not found")),
        )),
    }
}

/// Requests a password-reset code for an account.
///
/// - **URL:** `/api/1/users/reset-code`
/// - **Method:** `POST`
/// - **Authentication:** None required
///
/// Always answers 204 so the endpoint cannot be used to enumerate
/// accounts. There is no mailer; the code is surfaced in the server log
/// for an operator to relay.
#[post("/1/users/reset-code", data = "<request>")]
pub async fn request_reset_code(db: DbConn, request: Json<ResetCodeRequest>) -> Status {
    let email = request.email.clone();
    let result = db
        .run(move |conn| {
            let user = get_user_by_email(conn, &email)?;
            match user {
                Some(user) => set_reset_code(conn, user.id).map(|code| Some((user.email, code))),
                None => Ok(None),
            }
        })
        .await;

    match result {
        Ok(Some((email, code))) => {
            info!("Password reset code for {}: {}", email, code);
        }
        Ok(None) => {
            info!("Password reset requested for unknown account");
        }
        Err(e) => {
            error!("Database error while setting reset code: {:?}", e);
        }
    }

    Status::NoContent
}

/// Redeems a reset code for a new password.
///
/// - **URL:** `/api/1/users/reset-password`
/// - **Method:** `POST`
/// - **Authentication:** None required (the code is the credential)
///
/// Returns 204 on success, 401 when the code does not match, and 400 for
/// an empty replacement password. Codes are single-use.
#[post("/1/users/reset-password", data = "<request>")]
pub async fn reset_password(
    db: DbConn,
    request: Json<ResetPasswordRequest>,
) -> Result<Status, response::status::Custom<Json<ErrorResponse>>> {
    let request = request.into_inner();

    if request.new_password.trim().is_empty() {
        return Err(response::status::Custom(
            Status::BadRequest,
            Json(ErrorResponse::new("New password must not be empty")),
        ));
    }

    let new_hash = hash_password(&request.new_password);
    let redeemed = db
        .run(move |conn| redeem_reset_code(conn, &request.email, &request.reset_code, &new_hash))
        .await
        .map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Database error while resetting password")),
            )
        })?;

    if redeemed {
        Ok(Status::NoContent)
    } else {
        Err(response::status::Custom(
            Status::Unauthorized,
            Json(ErrorResponse::new("Invalid reset code")),
        ))
    }
}

/// Returns all user-related API routes.
pub fn routes() -> Vec<Route> {
    routes![
        create_user,
        get_me,
        get_user_by_id,
        request_reset_code,
        reset_password
    ]
}
