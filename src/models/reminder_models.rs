use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::reminder_events;
use crate::schema::user_settings;

/// Current manifest schema revision. Bumped whenever the published document
/// shape changes so devices can reject manifests they don't understand.
pub const MANIFEST_VERSION: u32 = 4;

#[derive(Queryable, Selectable, Insertable, Clone)]
#[diesel(table_name = user_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserSettings {
    pub id: Option<i32>,
    pub user_id: i32,
    pub fetch_time: Option<String>, // "HH:MM" in the user's own timezone
    pub timezone: Option<String>,   // IANA identifier, e.g. "Europe/Helsinki"
}

#[derive(Queryable, Selectable, Insertable, Clone)]
#[diesel(table_name = reminder_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReminderEvent {
    pub id: i32,
    pub user_id: i32,
    pub date: String,       // user-local calendar date, "YYYY-MM-DD"
    pub start_time: String, // "HH:MM", user-local
    pub end_time: String,   // "HH:MM", user-local
    pub message: String,
    pub audio_url: Option<String>,
    pub processed: bool, // true once audio has been synthesized and uploaded
}

#[derive(Insertable)]
#[diesel(table_name = reminder_events)]
pub struct NewReminderEvent {
    pub user_id: i32,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub message: String,
    pub audio_url: Option<String>,
    pub processed: bool,
}

/// One alert entry in the published manifest. Times are absolute Unix seconds;
/// the playback device runs on a single global clock.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ManifestEvent {
    pub sequence: u32, // 1-based, dense over surviving events
    #[serde(rename = "alertStart")]
    pub alert_start: i64,
    #[serde(rename = "alertEnd")]
    pub alert_end: i64,
    pub audio_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestSettings {
    /// Next fetch as "HH:MM" in the device's global reference frame. Distinct
    /// from the user-entered local fetch_time.
    pub fetch_time: String,
    pub timezone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub user_id: i32,
    pub generated_at: i64,
    pub settings: ManifestSettings,
    pub event_count: usize,
    pub events: Vec<ManifestEvent>,
}
