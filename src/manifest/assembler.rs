use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::reminder_models::{Manifest, ManifestEvent, ManifestSettings, MANIFEST_VERSION};

/// An event that made it through the audio pipeline and is a candidate for the
/// manifest. Times are still the stored user-local "HH:MM" strings.
pub struct SurvivingEvent {
    pub event_id: i32,
    pub start_time: String,
    pub end_time: String,
    pub audio_url: String,
}

/// Resolves a local wall-clock time in `tz`. An ambiguous time (clocks rolled
/// back) takes the earlier instant; a nonexistent time (clocks sprung forward)
/// shifts one hour later into the valid range.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earlier, _) => Some(earlier),
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(t) => Some(t),
            LocalResult::Ambiguous(earlier, _) => Some(earlier),
            LocalResult::None => None,
        },
    }
}

fn local_timestamp(tz: &Tz, date: NaiveDate, hhmm: &str) -> Result<i64, String> {
    let time = NaiveTime::parse_from_str(hhmm, "%H:%M")
        .map_err(|e| format!("Invalid time '{}': {}", hhmm, e))?;
    let resolved = resolve_local(tz, date.and_time(time))
        .ok_or_else(|| format!("Local time '{}' does not exist on {}", hhmm, date))?;
    Ok(resolved.timestamp())
}

/// The user's local fetch time on local "tomorrow", rendered as "HH:MM" in the
/// device's global (UTC) reference frame. Wall clock is preserved across DST
/// transitions; see `resolve_local` for the edge handling.
pub fn next_fetch_utc(
    tz: &Tz,
    local_date: NaiveDate,
    fetch_time: &str,
) -> Result<String, String> {
    let time = NaiveTime::parse_from_str(fetch_time, "%H:%M")
        .map_err(|e| format!("Invalid fetch time '{}': {}", fetch_time, e))?;
    let tomorrow = local_date + Duration::days(1);
    let resolved = resolve_local(tz, tomorrow.and_time(time))
        .ok_or_else(|| format!("Fetch time '{}' does not exist on {}", fetch_time, tomorrow))?;
    Ok(resolved.with_timezone(&Utc).format("%H:%M").to_string())
}

/// Builds the versioned manifest from the pipeline's surviving events.
/// Events whose stored times fail to parse are dropped here with the same
/// isolation as a synthesis failure; sequence numbers are dense and 1-based
/// over what remains.
pub fn assemble(
    user_id: i32,
    tz: &Tz,
    local_date: NaiveDate,
    fetch_time: &str,
    timezone_name: &str,
    events: Vec<SurvivingEvent>,
    generated_at: DateTime<Utc>,
) -> Result<Manifest, String> {
    let mut manifest_events: Vec<ManifestEvent> = Vec::new();
    for event in events {
        let alert_start = match local_timestamp(tz, local_date, &event.start_time) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("Excluding event {} from manifest: {}", event.event_id, e);
                continue;
            }
        };
        let alert_end = match local_timestamp(tz, local_date, &event.end_time) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("Excluding event {} from manifest: {}", event.event_id, e);
                continue;
            }
        };
        manifest_events.push(ManifestEvent {
            sequence: manifest_events.len() as u32 + 1,
            alert_start,
            alert_end,
            audio_url: event.audio_url,
        });
    }

    let fetch_time_utc = next_fetch_utc(tz, local_date, fetch_time)?;

    Ok(Manifest {
        version: MANIFEST_VERSION,
        user_id,
        generated_at: generated_at.timestamp(),
        settings: ManifestSettings {
            fetch_time: fetch_time_utc,
            timezone: timezone_name.to_string(),
        },
        event_count: manifest_events.len(),
        events: manifest_events,
    })
}
