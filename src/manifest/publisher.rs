use crate::api::spaces::{ObjectStore, StorageError};
use crate::models::reminder_models::Manifest;

/// Devices poll frequently; keep the edge cache short so a fresh manifest is
/// observed within a minute.
const MANIFEST_CACHE_CONTROL: &str = "max-age=60";

pub fn manifest_key(user_id: i32) -> String {
    format!("{}_status.json", user_id)
}

/// Serializes the manifest and overwrites the user's well-known object.
/// Returns the public URL the device fetches. No historical versions are kept.
pub async fn publish(store: &dyn ObjectStore, manifest: &Manifest) -> Result<String, StorageError> {
    let key = manifest_key(manifest.user_id);
    let body = serde_json::to_vec_pretty(manifest)
        .map_err(|e| StorageError::Request(format!("Failed to serialize manifest: {}", e)))?;
    store
        .put_object(
            &key,
            body,
            "application/json",
            Some(MANIFEST_CACHE_CONTROL.to_string()),
        )
        .await?;
    Ok(store.public_url(&key))
}
