use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::tags;

#[derive(Deserialize, Queryable, Identifiable, Debug, Serialize, TS)]
#[diesel(table_name = tags)]
#[diesel(primary_key(rfid))]
#[ts(export)]
pub struct Tag {
    pub rfid: i64,
    pub tag_name: Option<String>,
    pub user_id: Option<i32>,
    pub machine_id: i32,
    pub registered: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = tags)]
pub struct NewTag {
    pub rfid: i64,
    pub tag_name: Option<String>,
    pub user_id: Option<i32>,
    pub machine_id: i32,
    pub registered: bool,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TagInput {
    pub rfid: i64,
    pub tag_name: Option<String>,
    pub user_id: Option<i32>,
    pub machine_id: i32,
    pub registered: Option<bool>, // Defaults to pending when omitted
}
