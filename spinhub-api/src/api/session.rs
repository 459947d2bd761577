//! API endpoints for ride sessions.
//!
//! A controller opens a session at tap-in and closes it at tap-out. The
//! tag and rider may be attached mid-ride when the tap-in used an
//! unrecognized tag.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::{Deserialize, Serialize};
use rocket::serde::json::Json;
use ts_rs::TS;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::auth::AuthenticatedUser;
use crate::models::{Session, SessionStart};
use crate::orm::session::{
    attach_tag, current_session_for_machine, end_session, get_session, sessions_for_user,
    start_session,
};

#[derive(Deserialize)]
pub struct EndSessionRequest {
    pub machine_id: i32,
}

/// Reports how many sessions an end request closed. Zero means there was
/// no open session and the request was a no-op.
#[derive(Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EndSessionResponse {
    pub ended: usize,
}

#[derive(Deserialize)]
pub struct AttachTagRequest {
    pub machine_id: i32,
    pub rfid: i64,
    pub user_id: i32,
}

fn internal_error(message: &str) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(Status::InternalServerError, Json(ErrorResponse::new(message)))
}

/// Start a session on a machine.
///
/// - **URL:** `/api/1/sessions`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// # Request Format
///
/// ```json
/// { "machine_id": 3, "rfid": 9000000001, "user_id": 7 }
/// ```
///
/// `rfid` and `user_id` may be omitted at tap-in and attached later via
/// `/api/1/sessions/tag`.
///
/// # Response
///
/// **Success (HTTP 201 Created):** the open session row.
///
/// **Failure (HTTP 409 Conflict):** the machine (or the rider) already has
/// an open session.
#[post("/1/sessions", data = "<start>")]
pub async fn create_session(
    _auth: AuthenticatedUser,
    db: DbConn,
    start: Json<SessionStart>,
) -> Result<status::Created<Json<Session>>, response::status::Custom<Json<ErrorResponse>>> {
    let start = start.into_inner();

    match db
        .run(move |conn| start_session(conn, start.machine_id, start.rfid, start.user_id))
        .await
    {
        Ok(session) => {
            let location = format!("/api/1/sessions/{}", session.id);
            Ok(status::Created::new(location).body(Json(session)))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse::new("Machine or rider already has an open session")),
            ))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            Err(response::status::Custom(
                Status::BadRequest,
                Json(ErrorResponse::new("Unknown rider for session")),
            ))
        }
        Err(_) => Err(internal_error("Database error while starting session")),
    }
}

/// End the open session on a machine.
///
/// - **URL:** `/api/1/sessions/end`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// Always answers 200; `ended` reports the affected rows, and zero rows
/// (no open session) is a no-op rather than an error.
#[post("/1/sessions/end", data = "<request>")]
pub async fn close_session(
    _auth: AuthenticatedUser,
    db: DbConn,
    request: Json<EndSessionRequest>,
) -> Result<Json<EndSessionResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let machine_id = request.machine_id;

    db.run(move |conn| end_session(conn, machine_id))
        .await
        .map(|ended| Json(EndSessionResponse { ended }))
        .map_err(|_| internal_error("Database error while ending session"))
}

/// Attach a tag and rider to a machine's open session.
///
/// Returns the updated session, 404 when the machine has no open session,
/// or 409 when the rider is already mid-ride elsewhere.
#[post("/1/sessions/tag", data = "<request>")]
pub async fn tag_session(
    _auth: AuthenticatedUser,
    db: DbConn,
    request: Json<AttachTagRequest>,
) -> Result<Json<Session>, response::status::Custom<Json<ErrorResponse>>> {
    let request = request.into_inner();

    let session = db
        .run(move |conn| {
            let rows = attach_tag(conn, request.machine_id, request.rfid, request.user_id)?;
            if rows == 0 {
                return Ok(None);
            }
            current_session_for_machine(conn, request.machine_id)
        })
        .await;

    match session {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("No open session for machine")),
        )),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse::new("Rider already has an open session")),
            ))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            Err(response::status::Custom(
                Status::BadRequest,
                Json(ErrorResponse::new("Unknown rider for session")),
            ))
        }
        Err(_) => Err(internal_error("Database error while tagging session")),
    }
}

/// The current (open) session for a machine.
#[get("/1/sessions/current?<machine_id>")]
pub async fn get_current_session(
    _auth: AuthenticatedUser,
    db: DbConn,
    machine_id: i32,
) -> Result<Json<Session>, response::status::Custom<Json<ErrorResponse>>> {
    let session = db
        .run(move |conn| current_session_for_machine(conn, machine_id))
        .await
        .map_err(|_| internal_error("Database error while fetching session"))?;

    match session {
        Some(session) => Ok(Json(session)),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("No open session for machine")),
        )),
    }
}

/// Session lookup by id.
#[get("/1/sessions/<session_id>")]
pub async fn get_session_by_id(
    _auth: AuthenticatedUser,
    db: DbConn,
    session_id: i32,
) -> Result<Json<Session>, response::status::Custom<Json<ErrorResponse>>> {
    let session = db
        .run(move |conn| get_session(conn, session_id))
        .await
        .map_err(|_| internal_error("Database error while fetching session"))?;

    match session {
        Some(session) => Ok(Json(session)),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("Session not found")),
        )),
    }
}

/// A rider's session history, newest first.
#[get("/1/sessions/by-user/<user_id>")]
pub async fn get_sessions_for_user(
    _auth: AuthenticatedUser,
    db: DbConn,
    user_id: i32,
) -> Result<Json<Vec<Session>>, response::status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| sessions_for_user(conn, user_id))
        .await
        .map(Json)
        .map_err(|_| internal_error("Database error while listing sessions"))
}

/// Returns all session-related API routes.
pub fn routes() -> Vec<Route> {
    routes![
        create_session,
        close_session,
        tag_session,
        get_current_session,
        get_session_by_id,
        get_sessions_for_user
    ]
}
