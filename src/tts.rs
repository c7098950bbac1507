use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    pub success: bool,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Base64 audio payload.
    #[serde(default)]
    pub audio: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("speech request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("speech endpoint returned HTTP {0}")]
    Status(u16),
    #[error("speech endpoint returned an unreadable body: {0}")]
    Malformed(String),
}

/// Boundary to whatever turns text into audio.
pub trait SpeechSynthesizer {
    fn synthesize(&self, request: &TtsRequest) -> Result<TtsResponse, TtsError>;
}

/// POSTs `{text, voiceId, modelId}` as JSON to the configured endpoint.
pub struct HttpSynthesizer {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSynthesizer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TtsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpSynthesizer {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SpeechSynthesizer for HttpSynthesizer {
    fn synthesize(&self, request: &TtsRequest) -> Result<TtsResponse, TtsError> {
        debug!(
            "event=tts_request endpoint={} voice={} chars={}",
            self.endpoint,
            request.voice_id,
            request.text.chars().count()
        );
        let response = self.client.post(&self.endpoint).json(request).send()?;
        let status = response.status();
        let body = response.text()?;
        parse_response(status.as_u16(), &body)
    }
}

/// The endpoint reports degraded mode in the body, sometimes with an error
/// status, so the body wins whenever it parses.
pub fn parse_response(status: u16, body: &str) -> Result<TtsResponse, TtsError> {
    match serde_json::from_str::<TtsResponse>(body) {
        Ok(parsed) => Ok(parsed),
        Err(err) if (200..300).contains(&status) => {
            warn!("event=tts_response status={} error=malformed_body", status);
            Err(TtsError::Malformed(err.to_string()))
        }
        Err(_) => Err(TtsError::Status(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case() {
        let req = TtsRequest {
            text: "hi".into(),
            voice_id: "v1".into(),
            model_id: "m1".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["voiceId"], "v1");
        assert_eq!(json["modelId"], "m1");
    }

    #[test]
    fn error_status_with_fallback_body_is_a_response() {
        let parsed = parse_response(500, r#"{"success":false,"fallback":true}"#).unwrap();
        assert!(!parsed.success);
        assert!(parsed.fallback);
    }

    #[test]
    fn unreadable_bodies() {
        assert!(matches!(parse_response(502, "<html>"), Err(TtsError::Status(502))));
        assert!(matches!(parse_response(200, "nope"), Err(TtsError::Malformed(_))));
    }

    #[test]
    fn success_payload_fields() {
        let parsed = parse_response(
            200,
            r#"{"success":true,"contentType":"audio/mpeg","audio":"SUQz"}"#,
        )
        .unwrap();
        assert_eq!(parsed.content_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(parsed.audio.as_deref(), Some("SUQz"));
    }
}
