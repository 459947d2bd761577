//! API endpoints for bike telemetry.
//!
//! Controllers stream one sample per revolution batch while a session is
//! open; the log is append-only and read back per session.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::auth::AuthenticatedUser;
use crate::models::{BikeData, BikeDataInput};
use crate::orm::bike_data::{insert_sample, latest_sample_within, samples_for_session};
use crate::orm::session::get_session;

fn internal_error(message: &str) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(Status::InternalServerError, Json(ErrorResponse::new(message)))
}

/// Append a telemetry sample to a session.
///
/// - **URL:** `/api/1/telemetry`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// # Request Format
///
/// ```json
/// { "rpm": 84, "bike_id": 3, "session_id": 12 }
/// ```
///
/// Returns 404 when the session id is unknown.
#[post("/1/telemetry", data = "<sample>")]
pub async fn create_sample(
    _auth: AuthenticatedUser,
    db: DbConn,
    sample: Json<BikeDataInput>,
) -> Result<status::Created<Json<BikeData>>, response::status::Custom<Json<ErrorResponse>>> {
    let sample = sample.into_inner();

    let result = db
        .run(move |conn| {
            if get_session(conn, sample.session_id)?.is_none() {
                return Ok(None);
            }
            insert_sample(conn, sample).map(Some)
        })
        .await;

    match result {
        Ok(Some(created)) => Ok(status::Created::new("/api/1/telemetry").body(Json(created))),
        // The session check and the FK constraint agree on unknown sessions
        Ok(None) | Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            Err(response::status::Custom(
                Status::NotFound,
                Json(ErrorResponse::new("Unknown session for sample")),
            ))
        }
        Err(_) => Err(internal_error("Database error while recording sample")),
    }
}

/// The newest sample recorded within the last `seconds` seconds.
///
/// Controllers poll this as a liveness probe for the data feed; 404 means
/// nothing has been recorded inside the window.
#[get("/1/telemetry/recent?<seconds>")]
pub async fn get_recent_sample(
    _auth: AuthenticatedUser,
    db: DbConn,
    seconds: i64,
) -> Result<Json<BikeData>, response::status::Custom<Json<ErrorResponse>>> {
    let sample = db
        .run(move |conn| latest_sample_within(conn, seconds))
        .await
        .map_err(|_| internal_error("Database error while fetching sample"))?;

    match sample {
        Some(sample) => Ok(Json(sample)),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("No sample within window")),
        )),
    }
}

/// All samples for a session, in recording order.
#[get("/1/sessions/<session_id>/telemetry")]
pub async fn get_session_samples(
    _auth: AuthenticatedUser,
    db: DbConn,
    session_id: i32,
) -> Result<Json<Vec<BikeData>>, response::status::Custom<Json<ErrorResponse>>> {
    let samples = db
        .run(move |conn| {
            if get_session(conn, session_id)?.is_none() {
                return Ok(None);
            }
            samples_for_session(conn, session_id).map(Some)
        })
        .await
        .map_err(|_: DieselError| internal_error("Database error while fetching samples"))?;

    match samples {
        Some(samples) => Ok(Json(samples)),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("Session not found")),
        )),
    }
}

/// Returns all telemetry-related API routes.
pub fn routes() -> Vec<Route> {
    routes![create_sample, get_recent_sample, get_session_samples]
}
