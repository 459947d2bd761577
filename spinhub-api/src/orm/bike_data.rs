use chrono::{Duration, Utc};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{BikeData, BikeDataInput, NewBikeData};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Appends one telemetry sample to a session's log, stamped with the
/// current time.
pub fn insert_sample(
    conn: &mut SqliteConnection,
    sample: BikeDataInput,
) -> Result<BikeData, diesel::result::Error> {
    use crate::schema::bike_data::dsl::*;

    let new_sample = NewBikeData {
        recorded_at: Utc::now().naive_utc(),
        rpm: sample.rpm,
        bike_id: sample.bike_id,
        session_id: sample.session_id,
    };

    diesel::insert_into(bike_data)
        .values(&new_sample)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    bike_data.filter(id.eq(last_id as i32)).first::<BikeData>(conn)
}

/// The newest sample recorded within the last `window_secs` seconds, if
/// any. Controllers use this as a liveness probe for the data feed.
pub fn latest_sample_within(
    conn: &mut SqliteConnection,
    window_secs: i64,
) -> Result<Option<BikeData>, diesel::result::Error> {
    use crate::schema::bike_data::dsl::*;

    let cutoff = Utc::now().naive_utc() - Duration::seconds(window_secs);

    bike_data
        .filter(recorded_at.gt(cutoff))
        .order(recorded_at.desc())
        .first::<BikeData>(conn)
        .optional()
}

/// All samples for a session in recording order.
pub fn samples_for_session(
    conn: &mut SqliteConnection,
    target_session_id: i32,
) -> Result<Vec<BikeData>, diesel::result::Error> {
    use crate::schema::bike_data::dsl::*;

    bike_data
        .filter(session_id.eq(target_session_id))
        .order(id.asc())
        .load::<BikeData>(conn)
}
