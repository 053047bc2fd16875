//! WebSocket message envelopes.
//!
//! Every message is a JSON object `{"event": <name>, "data": <payload>}`.

use engage_core::{Alert, FrameResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// An encoded frame (data URL or bare base64).
    Frame(String),
    /// Resume analyzing frames.
    StartAnalysis,
    /// Ignore frames until the next `start_analysis`.
    StopAnalysis,
}

/// Why a client message was not understood.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message is not a JSON envelope: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame event without string data")]
    MissingFrameData,
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Option<Value>,
}

impl ClientEvent {
    /// Parses one text message.
    ///
    /// A message that is not JSON but looks like a data URL is taken as a frame.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed envelopes and unknown events.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let trimmed = text.trim_start();
        if trimmed.starts_with("data:") {
            return Ok(Self::Frame(trimmed.to_string()));
        }
        let envelope: Envelope = serde_json::from_str(text)?;
        match envelope.event.as_str() {
            "frame" => match envelope.data {
                Some(Value::String(payload)) => Ok(Self::Frame(payload)),
                _ => Err(ProtocolError::MissingFrameData),
            },
            "start_analysis" => Ok(Self::StartAnalysis),
            "stop_analysis" => Ok(Self::StopAnalysis),
            _ => Err(ProtocolError::UnknownEvent(envelope.event)),
        }
    }
}

/// Payload of the greeting sent on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connected {
    pub message: String,
}

/// A message to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Greeting sent once per session.
    Connected(Connected),
    /// The result for one processed frame.
    EmotionData(FrameResult),
    /// An attention alert derived from the frame result.
    Alert(Alert),
}

impl ServerEvent {
    /// The greeting.
    #[must_use]
    pub fn connected() -> Self {
        Self::Connected(Connected {
            message: "Connected".into(),
        })
    }

    /// Serializes to the JSON text sent on the socket.
    ///
    /// Non-finite floats are written as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error only if `serde_json` rejects the payload, which the
    /// event types never trigger.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
