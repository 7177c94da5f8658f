use crate::api::spaces::ObjectStore;
use crate::api::speech::SpeechClient;
use crate::models::reminder_models::ReminderEvent;

/// Where an event's audio came from this run.
pub enum AudioOutcome {
    /// Already rendered on a previous run; the stored URL is reused untouched
    /// and no collaborator is invoked.
    Cached(String),
    /// Synthesized and uploaded during this run. The caller still has to
    /// persist the URL and the processed flag (best-effort).
    Rendered(String),
}

impl AudioOutcome {
    pub fn url(&self) -> &str {
        match self {
            AudioOutcome::Cached(url) | AudioOutcome::Rendered(url) => url,
        }
    }
}

/// One attempt at ensuring an event has reachable audio. `sequence` is the
/// event's 1-based position among the events kept so far in this run; it names
/// the uploaded object. Any failure excludes just this event from the manifest.
pub async fn prepare_event_audio(
    speech: &dyn SpeechClient,
    store: &dyn ObjectStore,
    event: &ReminderEvent,
    sequence: usize,
) -> Result<AudioOutcome, String> {
    if event.processed {
        // The processed flag is the idempotence marker: never re-synthesize.
        return match &event.audio_url {
            Some(url) => Ok(AudioOutcome::Cached(url.clone())),
            None => Err(format!(
                "Event {} is marked processed but has no audio URL",
                event.id
            )),
        };
    }

    let audio = speech
        .synthesize(&event.message)
        .await
        .map_err(|e| format!("Synthesis failed for event {}: {}", event.id, e))?;

    let key = format!("{}_{:02}.mp3", event.user_id, sequence);
    store
        .put_object(
            &key,
            audio,
            "audio/mpeg",
            None,
        )
        .await
        .map_err(|e| format!("Upload failed for event {}: {}", event.id, e))?;

    Ok(AudioOutcome::Rendered(store.public_url(&key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::spaces::MockObjectStore;
    use crate::api::speech::{MockSpeechClient, SynthesisError};
    use mockall::predicate::eq;

    fn event(id: i32, processed: bool, audio_url: Option<&str>) -> ReminderEvent {
        ReminderEvent {
            id,
            user_id: 9,
            date: "2025-06-15".to_string(),
            start_time: "07:00".to_string(),
            end_time: "07:05".to_string(),
            message: "Take your medication".to_string(),
            audio_url: audio_url.map(|s| s.to_string()),
            processed,
        }
    }

    #[tokio::test]
    async fn processed_event_is_reused_without_collaborator_calls() {
        // No expectations set: any synthesize or put_object call panics.
        let speech = MockSpeechClient::new();
        let store = MockObjectStore::new();

        let outcome = prepare_event_audio(
            &speech,
            &store,
            &event(1, true, Some("https://cdn.example/9_01.mp3")),
            1,
        )
        .await
        .unwrap();
        assert_eq!(outcome.url(), "https://cdn.example/9_01.mp3");
        assert!(matches!(outcome, AudioOutcome::Cached(_)));
    }

    #[tokio::test]
    async fn pending_event_is_synthesized_and_uploaded_under_sequence_key() {
        let mut speech = MockSpeechClient::new();
        speech
            .expect_synthesize()
            .with(eq("Take your medication"))
            .times(1)
            .returning(|_| Ok(vec![1, 2, 3]));

        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|key, body, content_type, cache_control| {
                key == "9_02.mp3"
                    && body == &[1, 2, 3]
                    && content_type == "audio/mpeg"
                    && cache_control.is_none()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        store
            .expect_public_url()
            .with(eq("9_02.mp3"))
            .returning(|key| format!("https://cdn.example/{}", key));

        let outcome = prepare_event_audio(&speech, &store, &event(2, false, None), 2)
            .await
            .unwrap();
        assert_eq!(outcome.url(), "https://cdn.example/9_02.mp3");
        assert!(matches!(outcome, AudioOutcome::Rendered(_)));
    }

    #[tokio::test]
    async fn synthesis_failure_excludes_the_event() {
        let mut speech = MockSpeechClient::new();
        speech
            .expect_synthesize()
            .returning(|_| Err(SynthesisError::Service("quota exceeded".to_string())));
        let store = MockObjectStore::new(); // upload must never be attempted

        let result = prepare_event_audio(&speech, &store, &event(3, false, None), 1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn upload_failure_excludes_the_event() {
        let mut speech = MockSpeechClient::new();
        speech.expect_synthesize().returning(|_| Ok(vec![0u8; 4]));
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .returning(|_, _, _, _| Err(crate::api::spaces::StorageError::Service("503".into())));

        let result = prepare_event_audio(&speech, &store, &event(4, false, None), 1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn processed_event_without_url_is_excluded_not_rerendered() {
        let speech = MockSpeechClient::new();
        let store = MockObjectStore::new();
        let result = prepare_event_audio(&speech, &store, &event(5, true, None), 1).await;
        assert!(result.is_err());
    }
}
