use diesel::prelude::*;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult};

use crate::models::{NewProfile, Profile};
use crate::schema::profiles;
use crate::DbPool;

/// Creates an empty profile for a newly registered user.
/// Called from the RabbitMQ subscriber when a `user.registered` event is
/// received; the user fills it in afterwards via `PATCH /me`.
pub fn create_default_profile(pool: &DbPool, user_id: Uuid, _email: &str) -> AppResult<Profile> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let new_profile = NewProfile { user_id };

    let profile = diesel::insert_into(profiles::table)
        .values(&new_profile)
        .on_conflict(profiles::user_id)
        .do_nothing()
        .get_result::<Profile>(&mut conn)
        .optional()?;

    match profile {
        Some(profile) => {
            tracing::info!(
                profile_id = %profile.id,
                user_id = %user_id,
                "default profile created"
            );
            Ok(profile)
        }
        // Redelivered event; the existing row wins.
        None => {
            let existing = profiles::table
                .filter(profiles::user_id.eq(user_id))
                .first::<Profile>(&mut conn)?;
            Ok(existing)
        }
    }
}
