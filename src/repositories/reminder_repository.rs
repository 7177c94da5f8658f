use diesel::prelude::*;
use diesel::result::Error as DieselError;

use crate::{
    models::reminder_models::{ReminderEvent, UserSettings},
    schema::{reminder_events, user_settings},
    DbPool,
};

pub struct ReminderRepository {
    pool: DbPool,
}

impl ReminderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Every settings row, including incomplete ones. The runner skips rows
    /// missing fetch_time or timezone rather than treating them as errors.
    pub fn list_user_settings(&self) -> Result<Vec<UserSettings>, DieselError> {
        let mut conn = self.pool.get().expect("Failed to get DB connection");
        user_settings::table.load::<UserSettings>(&mut conn)
    }

    /// A user's events for one local calendar date, ascending by start time,
    /// truncated to `limit`. An empty result means nothing to publish.
    pub fn list_events_for_date(
        &self,
        user_id: i32,
        date: &str,
        limit: i64,
    ) -> Result<Vec<ReminderEvent>, DieselError> {
        let mut conn = self.pool.get().expect("Failed to get DB connection");
        reminder_events::table
            .filter(reminder_events::user_id.eq(user_id))
            .filter(reminder_events::date.eq(date))
            .order(reminder_events::start_time.asc())
            .limit(limit)
            .load::<ReminderEvent>(&mut conn)
    }

    /// Records the uploaded audio URL and sets the processed flag, which is
    /// the sole idempotence marker preventing re-synthesis on later runs.
    pub fn mark_event_rendered(&self, event_id: i32, audio_url: &str) -> Result<(), DieselError> {
        let mut conn = self.pool.get().expect("Failed to get DB connection");
        diesel::update(reminder_events::table.find(event_id))
            .set((
                reminder_events::audio_url.eq(audio_url),
                reminder_events::processed.eq(true),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}
