use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::controllers;

/// A Raspberry Pi machine controller, keyed by its serial number.
#[derive(Deserialize, Queryable, Identifiable, Debug, Serialize, TS)]
#[diesel(table_name = controllers)]
#[diesel(primary_key(serial_number))]
#[ts(export)]
pub struct Controller {
    pub serial_number: i32,
    pub machine_id: i32,
    pub machine_type: String,
    #[ts(type = "string | null")]
    pub last_ping: Option<NaiveDateTime>,
    #[ts(type = "string | null")]
    pub last_reboot: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = controllers)]
pub struct NewController {
    pub serial_number: i32,
    pub machine_id: i32,
    pub machine_type: String,
    pub last_ping: Option<NaiveDateTime>,
    pub last_reboot: Option<NaiveDateTime>,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ControllerInput {
    pub serial_number: i32,
    pub machine_id: i32,
    pub machine_type: String,
}
