//! Attention alerts derived from a single frame result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::FrameResult;

/// Alert severity, as rendered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Info,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Info => "info",
        })
    }
}

/// A user-facing attention alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Milliseconds since the Unix epoch at which the frame was emitted.
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    /// Timestamp of the frame the alert was derived from.
    pub timestamp: f64,
}

impl Alert {
    fn new(kind: AlertKind, message: String, timestamp: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let id = (timestamp * 1000.0).max(0.0) as u64;
        Self {
            id,
            kind,
            message,
            timestamp,
        }
    }
}

/// Returns the highest-priority alert for `result`, if any.
///
/// Face-count problems come first, then the horizontal axis, the vertical
/// axis and finally the combined direction.
#[must_use]
pub fn derive_alert(result: &FrameResult) -> Option<Alert> {
    let pose = &result.head_pose;
    let (kind, message) = match result.face_count {
        0 => (AlertKind::Error, "No face detected".to_string()),
        n if n > 1 => (AlertKind::Error, "Multiple faces detected".to_string()),
        _ if !pose.horizontal.is_straight() => {
            (AlertKind::Info, format!("Head turned {}", pose.horizontal))
        }
        _ if !pose.vertical.is_straight() => {
            (AlertKind::Info, format!("Head tilted {}", pose.vertical))
        }
        _ if !pose.direction.is_straight() => (AlertKind::Info, format!("Look {}", pose.direction)),
        _ => return None,
    };
    Some(Alert::new(kind, message, result.timestamp))
}
