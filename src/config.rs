use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),
}

/// All required settings, read once at startup. Nothing external is touched
/// before this has validated (a half-configured process used to crash inside
/// the first client call instead of logging a usable diagnostic).
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub azure_speech_key: String,
    pub azure_speech_region: String,
    pub azure_speech_voice: String,
    pub spaces_key: String,
    pub spaces_secret: String,
    pub spaces_region: String,
    pub spaces_bucket: String,
    /// Base URL devices fetch objects from, e.g.
    /// `https://mybucket.ams3.digitaloceanspaces.com`. Configured explicitly
    /// instead of being inferred from bucket + endpoint strings.
    pub spaces_public_base_url: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingSetting(name))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            azure_speech_key: required("AZURE_SPEECH_KEY")?,
            azure_speech_region: required("AZURE_SPEECH_REGION")?,
            azure_speech_voice: std::env::var("AZURE_SPEECH_VOICE")
                .unwrap_or_else(|_| "en-US-JennyNeural".to_string()),
            spaces_key: required("SPACES_KEY")?,
            spaces_secret: required("SPACES_SECRET")?,
            spaces_region: required("SPACES_REGION")?,
            spaces_bucket: required("SPACES_BUCKET")?,
            spaces_public_base_url: required("SPACES_PUBLIC_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
        })
    }
}
