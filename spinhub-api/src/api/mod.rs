pub mod controller;
pub mod login;
pub mod session;
pub mod status;
pub mod tag;
pub mod telemetry;
pub mod user;

use rocket::Route;
use rocket::serde::Serialize;
use ts_rs::TS;

/// Error response structure shared by the API modules.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse { error: message.into() }
    }
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(controller::routes());
    routes.extend(login::routes());
    routes.extend(session::routes());
    routes.extend(status::routes());
    routes.extend(tag::routes());
    routes.extend(telemetry::routes());
    routes.extend(user::routes());
    routes
}
