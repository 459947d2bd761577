use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewSession, Session};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Opens a session on a machine, stamped with the current time.
///
/// The tag RFID and rider may be unknown at tap-in and attached later via
/// [`attach_tag`]. A partial unique index keeps at most one open session
/// per machine (and per rider); starting a second one surfaces as a
/// `DatabaseError(UniqueViolation, _)`.
pub fn start_session(
    conn: &mut SqliteConnection,
    target_machine_id: i32,
    tag_rfid: Option<i64>,
    rider_id: Option<i32>,
) -> Result<Session, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    let new_session = NewSession {
        rfid: tag_rfid,
        user_id: rider_id,
        machine_id: target_machine_id,
        started_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(sessions)
        .values(&new_session)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    sessions.filter(id.eq(last_id as i32)).first::<Session>(conn)
}

/// Attaches a tag and rider to the machine's open session.
///
/// Returns the number of rows affected; zero means the machine has no open
/// session and the call is a no-op.
pub fn attach_tag(
    conn: &mut SqliteConnection,
    target_machine_id: i32,
    tag_rfid: i64,
    rider_id: i32,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    diesel::update(
        sessions
            .filter(machine_id.eq(target_machine_id))
            .filter(ended_at.is_null()),
    )
    .set((rfid.eq(tag_rfid), user_id.eq(rider_id)))
    .execute(conn)
}

/// Closes the machine's open session, stamping the end time.
///
/// Returns the number of rows affected; zero means no session was open and
/// the call is a no-op.
pub fn end_session(
    conn: &mut SqliteConnection,
    target_machine_id: i32,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    diesel::update(
        sessions
            .filter(machine_id.eq(target_machine_id))
            .filter(ended_at.is_null()),
    )
    .set(ended_at.eq(Utc::now().naive_utc()))
    .execute(conn)
}

/// Gets a session by id.
pub fn get_session(
    conn: &mut SqliteConnection,
    session_id: i32,
) -> Result<Option<Session>, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;
    sessions.filter(id.eq(session_id)).first::<Session>(conn).optional()
}

/// The current session for a machine: the unique row with a null end stamp.
pub fn current_session_for_machine(
    conn: &mut SqliteConnection,
    target_machine_id: i32,
) -> Result<Option<Session>, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;
    sessions
        .filter(machine_id.eq(target_machine_id))
        .filter(ended_at.is_null())
        .first::<Session>(conn)
        .optional()
}

/// The current session for a rider, if they are on a machine right now.
pub fn current_session_for_user(
    conn: &mut SqliteConnection,
    rider_id: i32,
) -> Result<Option<Session>, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;
    sessions
        .filter(user_id.eq(rider_id))
        .filter(ended_at.is_null())
        .first::<Session>(conn)
        .optional()
}

/// A rider's session history, newest first.
pub fn sessions_for_user(
    conn: &mut SqliteConnection,
    rider_id: i32,
) -> Result<Vec<Session>, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;
    sessions
        .filter(user_id.eq(rider_id))
        .order(started_at.desc())
        .load::<Session>(conn)
}
