//! Inbound frame payload decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use engage_core::{FrameError, FrameInput};

/// Decodes a `data:<mime>;base64,<payload>` URL, or bare base64, into a frame.
///
/// # Errors
///
/// Returns [`FrameError::Decode`] if the payload is empty, not base64, or
/// not an image format the `image` crate can read.
pub fn decode_data_url(payload: &str, source: impl Into<String>) -> Result<FrameInput, FrameError> {
    let encoded = strip_data_url_header(payload.trim())?;
    if encoded.is_empty() {
        return Err(FrameError::Decode("empty payload".into()));
    }

    let bytes = if encoded.contains(char::is_whitespace) {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD.decode(compact)
    } else {
        STANDARD.decode(encoded)
    }
    .map_err(|e| FrameError::Decode(format!("invalid base64: {e}")))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| FrameError::Decode(format!("unreadable image: {e}")))?;
    Ok(FrameInput::new(source, image))
}

/// Returns the base64 part of `payload`.
fn strip_data_url_header(payload: &str) -> Result<&str, FrameError> {
    let Some(rest) = payload.strip_prefix("data:") else {
        return Ok(payload);
    };
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| FrameError::Decode("data URL has no payload separator".into()))?;
    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(FrameError::Decode("data URL is not base64-encoded".into()));
    }
    Ok(data)
}
