use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::sessions;

/// A ride: the open interval between a tap-in and a tap-out on a machine.
/// An open session is the row with `ended_at` null.
#[derive(Deserialize, Queryable, Identifiable, Debug, Serialize, TS)]
#[diesel(table_name = sessions)]
#[ts(export)]
pub struct Session {
    pub id: i32,
    pub rfid: Option<i64>,
    pub user_id: Option<i32>,
    pub machine_id: i32,
    #[ts(type = "string")]
    pub started_at: NaiveDateTime,
    #[ts(type = "string | null")]
    pub ended_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub rfid: Option<i64>,
    pub user_id: Option<i32>,
    pub machine_id: i32,
    pub started_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct SessionStart {
    pub machine_id: i32,
    pub rfid: Option<i64>,
    pub user_id: Option<i32>,
}
