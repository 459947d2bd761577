use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use crate::models::{NewUser, User, UserInput};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new user. The caller is responsible for hashing the password
/// (see `orm::login::hash_password`).
pub fn insert_user(
    conn: &mut SqliteConnection,
    new_user: UserInput,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    let insertable_user = NewUser {
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        gender: new_user.gender,
        weight: new_user.weight,
        age: new_user.age,
        height: new_user.height,
        rfid: new_user.rfid,
        reset_code: None,
    };

    diesel::insert_into(users)
        .values(&insertable_user)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    users.filter(id.eq(last_id as i32)).first::<User>(conn)
}

/// Returns all users in ascending order by id.
pub fn list_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.order(id.asc()).load::<User>(conn)
}

/// Gets a single user by ID.
pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(id.eq(user_id)).first::<User>(conn).optional()
}

/// Gets a single user by email (case-insensitive).
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    user_email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    // Convert to lowercase for case-insensitive comparison
    let lowercase_email = user_email.to_lowercase();

    // Use raw SQL with parameter binding for case-insensitive search
    diesel::sql_query("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
        .bind::<diesel::sql_types::Text, _>(&lowercase_email)
        .get_result::<User>(conn)
        .optional()
}

/// Gets the user currently linked to an RFID tag, if any.
pub fn get_user_by_rfid(
    conn: &mut SqliteConnection,
    tag_rfid: i64,
) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(rfid.eq(tag_rfid)).first::<User>(conn).optional()
}

/// Updates a user's fields. All fields are optional - only provided fields
/// will be updated.
///
/// # Arguments
/// * `conn` - Database connection
/// * `user_id` - ID of the user to update
/// * `new_name` - Optional new display name
/// * `new_email` - Optional new email address
/// * `new_password_hash` - Optional new password hash
/// * `new_rfid` - Optional new linked RFID
///
/// # Returns
/// * `Ok(User)` - Updated user object
/// * `Err(diesel::result::Error)` - Database error
pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i32,
    new_name: Option<String>,
    new_email: Option<String>,
    new_password_hash: Option<String>,
    new_rfid: Option<i64>,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    // Update each field individually if provided
    if let Some(name_val) = new_name {
        diesel::update(users.filter(id.eq(user_id)))
            .set(name.eq(name_val))
            .execute(conn)?;
    }

    if let Some(email_val) = new_email {
        diesel::update(users.filter(id.eq(user_id)))
            .set(email.eq(email_val))
            .execute(conn)?;
    }

    if let Some(password_val) = new_password_hash {
        diesel::update(users.filter(id.eq(user_id)))
            .set(password_hash.eq(password_val))
            .execute(conn)?;
    }

    if let Some(rfid_val) = new_rfid {
        diesel::update(users.filter(id.eq(user_id)))
            .set(rfid.eq(rfid_val))
            .execute(conn)?;
    }

    // Return the updated user
    users.filter(id.eq(user_id)).first::<User>(conn)
}

/// Stamps a fresh password-reset code onto the user and returns it.
///
/// The code is an opaque UUID; redeeming it goes through
/// [`redeem_reset_code`].
pub fn set_reset_code(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<String, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    let code = Uuid::new_v4().to_string();
    diesel::update(users.filter(id.eq(user_id)))
        .set(reset_code.eq(&code))
        .execute(conn)?;
    Ok(code)
}

/// Exchanges a valid reset code for a new password hash.
///
/// Returns `Ok(true)` when the code matched and the password was replaced
/// (the code is cleared in the same update), `Ok(false)` when the user does
/// not exist or the code does not match.
pub fn redeem_reset_code(
    conn: &mut SqliteConnection,
    user_email: &str,
    code: &str,
    new_password_hash: &str,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::users::dsl::*;

    let user = match get_user_by_email(conn, user_email)? {
        Some(u) => u,
        None => return Ok(false),
    };

    if user.reset_code.as_deref() != Some(code) {
        return Ok(false);
    }

    diesel::update(users.filter(id.eq(user.id)))
        .set((
            password_hash.eq(new_password_hash),
            reset_code.eq(None::<String>),
        ))
        .execute(conn)?;

    Ok(true)
}
