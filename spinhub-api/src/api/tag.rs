//! API endpoints for RFID tag provisioning and registration.
//!
//! A tap on an unknown tag makes the controller provision a pending row;
//! the member app later claims the newest pending tag for that machine and
//! binds it to an account.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::Deserialize;
use rocket::serde::json::Json;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::auth::AuthenticatedUser;
use crate::models::{Tag, TagInput};
use crate::orm::tag::{get_tag, insert_tag, register_tag};

#[derive(Deserialize)]
pub struct RegisterTagRequest {
    pub tag_name: Option<String>,
    pub user_id: i32,
    pub machine_id: i32,
}

/// Provision a tag row, pending by default.
///
/// - **URL:** `/api/1/tags`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// Returns 409 when the RFID is already known and 400 when the payload
/// references a missing owner.
#[post("/1/tags", data = "<tag>")]
pub async fn create_tag(
    _auth: AuthenticatedUser,
    db: DbConn,
    tag: Json<TagInput>,
) -> Result<status::Created<Json<Tag>>, response::status::Custom<Json<ErrorResponse>>> {
    let tag = tag.into_inner();
    let rfid = tag.rfid;

    match db.run(move |conn| insert_tag(conn, tag)).await {
        Ok(created) => {
            let location = format!("/api/1/tags/{}", rfid);
            Ok(status::Created::new(location).body(Json(created)))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse::new("Tag with this RFID already exists")),
            ))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            Err(response::status::Custom(
                Status::BadRequest,
                Json(ErrorResponse::new("Unknown user for tag")),
            ))
        }
        Err(_) => Err(response::status::Custom(
            Status::InternalServerError,
            Json(ErrorResponse::new("Database error while creating tag")),
        )),
    }
}

/// Claim the newest pending tag on a machine for a user.
///
/// - **URL:** `/api/1/tags/register`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// With no pending tag on the machine the operation is a no-op and
/// answers 404.
#[post("/1/tags/register", data = "<request>")]
pub async fn register_pending_tag(
    _auth: AuthenticatedUser,
    db: DbConn,
    request: Json<RegisterTagRequest>,
) -> Result<Json<Tag>, response::status::Custom<Json<ErrorResponse>>> {
    let request = request.into_inner();

    let registered = db
        .run(move |conn| {
            register_tag(conn, request.tag_name, request.user_id, request.machine_id)
        })
        .await
        .map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse::new("Database error while registering tag")),
            )
        })?;

    match registered {
        Some(tag) => Ok(Json(tag)),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("No pending tag for machine")),
        )),
    }
}

/// Tag lookup by RFID.
#[get("/1/tags/<rfid>")]
pub async fn get_tag_by_rfid(
    _auth: AuthenticatedUser,
    db: DbConn,
    rfid: i64,
) -> Result<Json<Tag>, response::status::Custom<Json<ErrorResponse>>> {
    let tag = db.run(move |conn| get_tag(conn, rfid)).await.map_err(|_| {
        response::status::Custom(
            Status::InternalServerError,
            Json(ErrorResponse::new("Database error while fetching tag")),
        )
    })?;

    match tag {
        Some(tag) => Ok(Json(tag)),
        None => Err(response::status::Custom(
            Status::NotFound,
            Json(ErrorResponse::new("Tag not found")),
        )),
    }
}

/// Returns all tag-related API routes.
pub fn routes() -> Vec<Route> {
    routes![create_tag, register_pending_tag, get_tag_by_rfid]
}
