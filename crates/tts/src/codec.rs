use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

/// Standard alphabet, padding optional on input
const AUDIO_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Audio payload could not be turned into bytes
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 audio data: {0}")]
    InvalidEncoding(String),
}

/// Decode base64 audio, optionally wrapped in a `data:<mime>;base64,` URL
///
/// Everything after the first comma of a data URL is the payload. Line
/// breaks and other ASCII whitespace inside the payload are ignored. No
/// check is made that the bytes are actually audio.
pub fn decode(base64_audio: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = strip_data_url(base64_audio.trim())?;

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let audio = AUDIO_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;

    tracing::debug!("Decoded {} bytes of audio data", audio.len());

    Ok(audio)
}

fn strip_data_url(input: &str) -> Result<&str, DecodeError> {
    if !input.starts_with("data:") {
        return Ok(input);
    }

    input
        .split_once(',')
        .map(|(_, payload)| payload)
        .ok_or_else(|| DecodeError::InvalidEncoding("data URL has no payload".to_string()))
}
