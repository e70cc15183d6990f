use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer};

/// Speech synthesis request following `OpenAI` TTS API format
///
/// Optional fields fall back to their defaults when omitted or sent as
/// `null`.
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    /// Model identifier (accepted for compatibility, e.g. "tts-1")
    #[serde(default = "default_model", deserialize_with = "model_or_default")]
    pub model: String,
    /// Text to synthesize into speech
    pub input: String,
    /// Voice name; cloned when present in the voice map
    #[serde(default = "default_voice", deserialize_with = "voice_or_default")]
    pub voice: String,
    /// Output audio format
    #[serde(default, deserialize_with = "format_or_default")]
    pub response_format: AudioFormat,
    /// Speech speed multiplier (0.25 to 4.0)
    #[serde(default = "default_speed", deserialize_with = "speed_or_default")]
    pub speed: f64,
}

fn default_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "alloy".to_string()
}

const fn default_speed() -> f64 {
    1.0
}

fn model_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_model))
}

fn voice_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_voice))
}

fn format_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AudioFormat, D::Error> {
    Ok(Option::<AudioFormat>::deserialize(deserializer)?.unwrap_or_default())
}

fn speed_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_speed))
}

/// Audio format requested by the client
///
/// Only selects response headers; the bridge never transcodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Opus,
    Aac,
    Flac,
    Ogg,
    Pcm,
}

impl AudioFormat {
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Pcm => "audio/pcm",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Pcm => "pcm",
        }
    }
}

/// Decoded audio ready to be returned to the client
#[derive(Debug)]
pub struct SpeechResponse {
    /// Raw audio bytes
    pub audio: Vec<u8>,
    /// Format the client asked for
    pub format: AudioFormat,
}

impl IntoResponse for SpeechResponse {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=speech.{}", self.format.extension());

        (
            [
                (http::header::CONTENT_TYPE, self.format.content_type().to_string()),
                (http::header::CONTENT_DISPOSITION, disposition),
            ],
            self.audio,
        )
            .into_response()
    }
}
