use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::spaces::ObjectStore;
use crate::api::speech::SpeechClient;
use crate::error::RunError;
use crate::manifest::{assembler, pipeline, publisher, timectx::TimeContext, trigger};
use crate::models::reminder_models::UserSettings;
use crate::repositories::reminder_repository::ReminderRepository;

/// At most this many alerts go into one day's manifest.
pub const DAILY_EVENT_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct RunDetail {
    pub user: i32,
    pub manifest: String,
    pub utc_fetch: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub processed: usize,
    pub details: Vec<RunDetail>,
}

/// One full invocation over every user, strictly sequential. Only a failed
/// settings read is fatal; each user's problems stay that user's problems.
/// `forced_user` bypasses the hour gate for exactly that user.
pub async fn run_invocation(
    repo: &ReminderRepository,
    speech: &dyn SpeechClient,
    store: &dyn ObjectStore,
    forced_user: Option<i32>,
    now: DateTime<Utc>,
) -> Result<RunReport, RunError> {
    let settings = repo.list_user_settings()?;
    let mut details = Vec::new();
    for user in settings {
        let is_forced = forced_user == Some(user.user_id);
        match run_user(repo, speech, store, &user, is_forced, now).await {
            Ok(Some(detail)) => details.push(detail),
            Ok(None) => {}
            Err(e) => tracing::error!("Run failed for user {}: {}", user.user_id, e),
        }
    }
    Ok(RunReport {
        processed: details.len(),
        details,
    })
}

/// One user's run. `Ok(None)` is a skip: incomplete settings, bad time zone,
/// hour mismatch, nothing scheduled today, or nothing surviving the pipeline.
/// An error here is surfaced per-user by the caller, never across users.
async fn run_user(
    repo: &ReminderRepository,
    speech: &dyn SpeechClient,
    store: &dyn ObjectStore,
    user: &UserSettings,
    is_forced: bool,
    now: DateTime<Utc>,
) -> Result<Option<RunDetail>, String> {
    let user_id = user.user_id;
    let (fetch_time, timezone) = match (&user.fetch_time, &user.timezone) {
        (Some(fetch_time), Some(timezone)) => (fetch_time, timezone),
        _ => {
            tracing::debug!("Skipping user {}: incomplete settings", user_id);
            return Ok(None);
        }
    };

    let ctx = match TimeContext::resolve(timezone, now) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!("Skipping user {}: {}", user_id, e);
            return Ok(None);
        }
    };
    let fetch_hour = match trigger::parse_fetch_hour(fetch_time) {
        Ok(hour) => hour,
        Err(e) => {
            tracing::warn!("Skipping user {}: {}", user_id, e);
            return Ok(None);
        }
    };
    if !trigger::should_run(ctx.local_hour(), fetch_hour, is_forced) {
        tracing::debug!(
            "Skipping user {}: local hour {} != fetch hour {}",
            user_id,
            ctx.local_hour(),
            fetch_hour
        );
        return Ok(None);
    }

    let local_date = ctx.local_date_string();
    let events = repo
        .list_events_for_date(user_id, &local_date, DAILY_EVENT_LIMIT)
        .map_err(|e| format!("Failed to load events: {}", e))?;
    if events.is_empty() {
        // Leave any previously published manifest in place.
        tracing::info!("No events for user {} on {}, nothing to publish", user_id, local_date);
        return Ok(None);
    }

    let mut surviving: Vec<assembler::SurvivingEvent> = Vec::new();
    for event in &events {
        let sequence = surviving.len() + 1;
        match pipeline::prepare_event_audio(speech, store, event, sequence).await {
            Ok(outcome) => {
                if let pipeline::AudioOutcome::Rendered(url) = &outcome {
                    // Best-effort: the manifest uses the fresh URL either way.
                    if let Err(e) = repo.mark_event_rendered(event.id, url) {
                        tracing::warn!(
                            "Failed to persist rendered audio for event {}: {}",
                            event.id,
                            e
                        );
                    }
                }
                surviving.push(assembler::SurvivingEvent {
                    event_id: event.id,
                    start_time: event.start_time.clone(),
                    end_time: event.end_time.clone(),
                    audio_url: outcome.url().to_string(),
                });
            }
            Err(e) => tracing::warn!("Excluding event from manifest: {}", e),
        }
    }

    let manifest = assembler::assemble(
        user_id,
        &ctx.tz,
        ctx.local_date(),
        fetch_time,
        timezone,
        surviving,
        now,
    )?;
    if manifest.events.is_empty() {
        tracing::warn!("All events failed for user {}, keeping previous manifest", user_id);
        return Ok(None);
    }

    let manifest_url = publisher::publish(store, &manifest)
        .await
        .map_err(|e| format!("Failed to publish manifest: {}", e))?;
    tracing::info!(
        "Published manifest for user {} with {} events, next fetch {} UTC",
        user_id,
        manifest.event_count,
        manifest.settings.fetch_time
    );

    Ok(Some(RunDetail {
        user: user_id,
        manifest: manifest_url,
        utc_fetch: manifest.settings.fetch_time,
    }))
}
