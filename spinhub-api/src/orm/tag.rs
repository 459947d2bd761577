use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewTag, Tag, TagInput};

/// Inserts a tag row. Tags arrive from a controller as pending
/// (`registered = false`) and are later claimed via [`register_tag`].
pub fn insert_tag(
    conn: &mut SqliteConnection,
    new_tag: TagInput,
) -> Result<Tag, diesel::result::Error> {
    use crate::schema::tags::dsl::*;

    let insertable_tag = NewTag {
        rfid: new_tag.rfid,
        tag_name: new_tag.tag_name,
        user_id: new_tag.user_id,
        machine_id: new_tag.machine_id,
        registered: new_tag.registered.unwrap_or(false),
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(tags)
        .values(&insertable_tag)
        .execute(conn)?;

    tags.filter(rfid.eq(insertable_tag.rfid)).first::<Tag>(conn)
}

/// Gets a single tag by RFID.
pub fn get_tag(conn: &mut SqliteConnection, tag_rfid: i64) -> Result<Option<Tag>, diesel::result::Error> {
    use crate::schema::tags::dsl::*;
    tags.filter(rfid.eq(tag_rfid)).first::<Tag>(conn).optional()
}

/// Returns all tags owned by a user, newest first.
pub fn list_tags_for_user(
    conn: &mut SqliteConnection,
    owner_id: i32,
) -> Result<Vec<Tag>, diesel::result::Error> {
    use crate::schema::tags::dsl::*;
    tags.filter(user_id.eq(owner_id))
        .order(created_at.desc())
        .load::<Tag>(conn)
}

/// Claims the most recently created pending tag for a machine.
///
/// A tap on an unprovisioned tag leaves a pending row behind; registration
/// assigns it a display name and owner and flips `registered`. The newest
/// pending row for *that machine* is selected (ordered by `created_at`,
/// ties broken by RFID) and updated by primary key, so concurrent pending
/// tags on other machines are never consumed.
///
/// Returns `Ok(None)` when the machine has no pending tag - registration
/// is then a no-op.
pub fn register_tag(
    conn: &mut SqliteConnection,
    new_tag_name: Option<String>,
    owner_id: i32,
    target_machine_id: i32,
) -> Result<Option<Tag>, diesel::result::Error> {
    use crate::schema::tags::dsl::*;

    let pending = tags
        .filter(machine_id.eq(target_machine_id))
        .filter(registered.eq(false))
        .order((created_at.desc(), rfid.desc()))
        .first::<Tag>(conn)
        .optional()?;

    let claimed = match pending {
        Some(tag) => tag,
        None => return Ok(None),
    };

    diesel::update(tags.filter(rfid.eq(claimed.rfid)))
        .set((
            registered.eq(true),
            tag_name.eq(new_tag_name),
            user_id.eq(owner_id),
        ))
        .execute(conn)?;

    tags.filter(rfid.eq(claimed.rfid)).first::<Tag>(conn).map(Some)
}
