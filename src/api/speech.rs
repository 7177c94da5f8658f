use reqwest::Client;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Failed to reach speech service: {0}")]
    Request(String),
    #[error("Speech service error: {0}")]
    Service(String),
}

/// Text-to-speech collaborator. One attempt per call, no retries; the caller
/// decides what a failure means for the event being rendered.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpeechClient: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// Azure Cognitive Services TTS over the plain REST endpoint.
pub struct AzureSpeechClient {
    key: String,
    region: String,
    voice: String,
}

impl AzureSpeechClient {
    pub fn new(config: &Config) -> Self {
        Self {
            key: config.azure_speech_key.clone(),
            region: config.azure_speech_region.clone(),
            voice: config.azure_speech_voice.clone(),
        }
    }

    fn ssml_body(&self, text: &str) -> String {
        // Minimal escaping; reminder messages are short free text.
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        format!(
            "<speak version='1.0' xml:lang='en-US'>\
             <voice xml:lang='en-US' name='{}'>{}</voice>\
             </speak>",
            self.voice, escaped
        )
    }
}

#[async_trait::async_trait]
impl SpeechClient for AzureSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let client = Client::new();
        let url = format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        );

        let response = client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", "audio-16khz-64kbitrate-mono-mp3")
            .header("User-Agent", "daychime")
            .body(self.ssml_body(text))
            .send()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SynthesisError::Service(error_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> AzureSpeechClient {
        AzureSpeechClient {
            key: "k".to_string(),
            region: "westeurope".to_string(),
            voice: "en-US-JennyNeural".to_string(),
        }
    }

    #[test]
    fn ssml_escapes_markup_characters() {
        let body = test_client().ssml_body("eggs & <milk>");
        assert!(body.contains("eggs &amp; &lt;milk&gt;"));
        assert!(body.contains("name='en-US-JennyNeural'"));
    }
}
