//! API endpoints for Raspberry Pi machine controllers.
//!
//! Controllers check in by serial number. Pings and reboot reports keep
//! the last-seen timestamps current so stale machines stand out.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;

use crate::DbConn;
use crate::api::ErrorResponse;
use crate::auth::AuthenticatedUser;
use crate::models::{Controller, ControllerInput};
use crate::orm::controller::{
    get_controller_by_serial, insert_controller, list_controllers, record_ping, record_reboot,
};

fn internal_error(message: &str) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(Status::InternalServerError, Json(ErrorResponse::new(message)))
}

fn not_found() -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(Status::NotFound, Json(ErrorResponse::new("Controller not found")))
}

/// Register a controller.
///
/// - **URL:** `/api/1/controllers`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// Returns 409 when the serial number is already registered.
#[post("/1/controllers", data = "<controller>")]
pub async fn create_controller(
    _auth: AuthenticatedUser,
    db: DbConn,
    controller: Json<ControllerInput>,
) -> Result<status::Created<Json<Controller>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = controller.into_inner();
    let serial = input.serial_number;

    match db.run(move |conn| insert_controller(conn, input)).await {
        Ok(created) => {
            let location = format!("/api/1/controllers/{}", serial);
            Ok(status::Created::new(location).body(Json(created)))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse::new("Controller with this serial already exists")),
            ))
        }
        Err(_) => Err(internal_error("Database error while creating controller")),
    }
}

/// List all controllers.
#[get("/1/controllers")]
pub async fn get_controllers(
    _auth: AuthenticatedUser,
    db: DbConn,
) -> Result<Json<Vec<Controller>>, response::status::Custom<Json<ErrorResponse>>> {
    db.run(list_controllers)
        .await
        .map(Json)
        .map_err(|_| internal_error("Database error while listing controllers"))
}

/// Controller lookup by serial number.
#[get("/1/controllers/<serial>")]
pub async fn get_controller(
    _auth: AuthenticatedUser,
    db: DbConn,
    serial: i32,
) -> Result<Json<Controller>, response::status::Custom<Json<ErrorResponse>>> {
    let controller = db
        .run(move |conn| get_controller_by_serial(conn, serial))
        .await
        .map_err(|_| internal_error("Database error while fetching controller"))?;

    controller.map(Json).ok_or_else(not_found)
}

/// Liveness ping from a controller; stamps `last_ping`.
#[post("/1/controllers/<serial>/ping")]
pub async fn ping_controller(
    _auth: AuthenticatedUser,
    db: DbConn,
    serial: i32,
) -> Result<Json<Controller>, response::status::Custom<Json<ErrorResponse>>> {
    let updated = db
        .run(move |conn| {
            let rows = record_ping(conn, serial)?;
            if rows == 0 {
                return Ok(None);
            }
            get_controller_by_serial(conn, serial)
        })
        .await
        .map_err(|_: DieselError| internal_error("Database error while recording ping"))?;

    updated.map(Json).ok_or_else(not_found)
}

/// Reboot report from a controller; stamps `last_reboot`.
#[post("/1/controllers/<serial>/reboot")]
pub async fn reboot_controller(
    _auth: AuthenticatedUser,
    db: DbConn,
    serial: i32,
) -> Result<Json<Controller>, response::status::Custom<Json<ErrorResponse>>> {
    let updated = db
        .run(move |conn| {
            let rows = record_reboot(conn, serial)?;
            if rows == 0 {
                return Ok(None);
            }
            get_controller_by_serial(conn, serial)
        })
        .await
        .map_err(|_: DieselError| internal_error("Database error while recording reboot"))?;

    updated.map(Json).ok_or_else(not_found)
}

/// Returns all controller-related API routes.
pub fn routes() -> Vec<Route> {
    routes![
        create_controller,
        get_controllers,
        get_controller,
        ping_controller,
        reboot_controller
    ]
}
