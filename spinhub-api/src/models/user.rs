use crate::schema::users;
use diesel::{Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Deserialize, Queryable, Identifiable, QueryableByName, Debug, Serialize, TS)]
#[diesel(table_name = users)]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String, // Will be unique
    pub password_hash: String,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub rfid: Option<i64>,
    pub reset_code: Option<String>,
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub rfid: Option<i64>,
    pub reset_code: Option<String>,
}

/// Insert-side input carrying an already-hashed password.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub rfid: Option<i64>,
}

/// Wire-safe projection of a user, without credential material.
#[derive(Deserialize, Debug, Serialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub rfid: Option<i64>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            gender: user.gender,
            weight: user.weight,
            age: user.age,
            height: user.height,
            rfid: user.rfid,
        }
    }
}
