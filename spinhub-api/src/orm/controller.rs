use chrono::Utc;
use diesel::prelude::*;

use crate::models::{Controller, ControllerInput, NewController};

/// Registers a machine controller by serial number.
pub fn insert_controller(
    conn: &mut SqliteConnection,
    input: ControllerInput,
) -> Result<Controller, diesel::result::Error> {
    use crate::schema::controllers::dsl::*;

    let insertable = NewController {
        serial_number: input.serial_number,
        machine_id: input.machine_id,
        machine_type: input.machine_type,
        last_ping: None,
        last_reboot: None,
    };

    diesel::insert_into(controllers)
        .values(&insertable)
        .execute(conn)?;

    controllers
        .filter(serial_number.eq(insertable.serial_number))
        .first::<Controller>(conn)
}

/// Gets a controller by its serial number.
pub fn get_controller_by_serial(
    conn: &mut SqliteConnection,
    serial: i32,
) -> Result<Option<Controller>, diesel::result::Error> {
    use crate::schema::controllers::dsl::*;
    controllers
        .filter(serial_number.eq(serial))
        .first::<Controller>(conn)
        .optional()
}

/// Returns all controllers ordered by serial number.
pub fn list_controllers(
    conn: &mut SqliteConnection,
) -> Result<Vec<Controller>, diesel::result::Error> {
    use crate::schema::controllers::dsl::*;
    controllers.order(serial_number.asc()).load::<Controller>(conn)
}

/// Stamps `last_ping` with the current time.
///
/// Returns the number of rows affected; zero means the serial is unknown.
pub fn record_ping(
    conn: &mut SqliteConnection,
    serial: i32,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::controllers::dsl::*;
    diesel::update(controllers.filter(serial_number.eq(serial)))
        .set(last_ping.eq(Utc::now().naive_utc()))
        .execute(conn)
}

/// Stamps `last_reboot` with the current time.
///
/// Returns the number of rows affected; zero means the serial is unknown.
pub fn record_reboot(
    conn: &mut SqliteConnection,
    serial: i32,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::controllers::dsl::*;
    diesel::update(controllers.filter(serial_number.eq(serial)))
        .set(last_reboot.eq(Utc::now().naive_utc()))
        .execute(conn)
}
