use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::bike_data;

/// One telemetry sample within a session. Append-only, no upper bound
/// on samples per session.
#[derive(Deserialize, Queryable, Identifiable, Debug, Serialize, TS)]
#[diesel(table_name = bike_data)]
#[ts(export)]
pub struct BikeData {
    pub id: i32,
    #[ts(type = "string")]
    pub recorded_at: NaiveDateTime,
    pub rpm: i32,
    pub bike_id: i32,
    pub session_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = bike_data)]
pub struct NewBikeData {
    pub recorded_at: NaiveDateTime,
    pub rpm: i32,
    pub bike_id: i32,
    pub session_id: i32,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct BikeDataInput {
    pub rpm: i32,
    pub bike_id: i32,
    pub session_id: i32,
}
