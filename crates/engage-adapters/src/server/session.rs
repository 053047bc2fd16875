//! Per-connection session state.

use engage_core::{derive_alert, FrameError, FramePipeline, FrameResult};
use tracing::{debug, info, warn};

use super::protocol::{ClientEvent, ServerEvent};
use crate::decode::decode_data_url;

/// What to do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Decode and analyze this payload.
    Analyze(String),
    /// Nothing to do.
    Ignore,
}

/// State of one client connection.
///
/// The only state is the analysis gate; it starts open and is never shared
/// with other sessions.
#[derive(Debug)]
pub struct Session {
    id: u64,
    analyzing: bool,
    alerts: bool,
    frames: u64,
}

impl Session {
    /// A new session with the gate open.
    #[must_use]
    pub const fn new(id: u64, alerts: bool) -> Self {
        Self {
            id,
            analyzing: true,
            alerts,
            frames: 0,
        }
    }

    /// Session id, unique per server.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether inbound frames are analyzed.
    #[must_use]
    pub const fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    /// Frame source label for this session's next frame.
    #[must_use]
    pub fn frame_source(&self) -> String {
        format!("session-{}/frame-{}", self.id, self.frames)
    }

    /// Handles one text message.
    pub fn on_text(&mut self, text: &str) -> SessionAction {
        match ClientEvent::parse(text) {
            Ok(ClientEvent::Frame(payload)) if self.analyzing => SessionAction::Analyze(payload),
            Ok(ClientEvent::Frame(_)) => {
                debug!(session = self.id, "analysis stopped, ignoring frame");
                SessionAction::Ignore
            }
            Ok(ClientEvent::StartAnalysis) => {
                info!(session = self.id, "analysis started");
                self.analyzing = true;
                SessionAction::Ignore
            }
            Ok(ClientEvent::StopAnalysis) => {
                info!(session = self.id, "analysis stopped");
                self.analyzing = false;
                SessionAction::Ignore
            }
            Err(e) => {
                warn!(session = self.id, "ignoring message: {e}");
                SessionAction::Ignore
            }
        }
    }

    /// Messages to send for a processed frame: the result, then any alert.
    pub fn on_result(&mut self, result: FrameResult) -> Vec<ServerEvent> {
        self.frames += 1;
        let alert = if self.alerts {
            derive_alert(&result)
        } else {
            None
        };
        let mut events = vec![ServerEvent::EmotionData(result)];
        events.extend(alert.map(ServerEvent::Alert));
        events
    }

    /// Counts a frame that produced no result.
    pub fn on_dropped(&mut self, error: &FrameError) {
        self.frames += 1;
        if error.is_defect() {
            warn!(session = self.id, "dropping frame, landmark provider defect: {error}");
        } else {
            warn!(session = self.id, "dropping frame: {error}");
        }
    }
}

/// Decodes and analyzes one payload. Blocking; run off the async runtime.
///
/// # Errors
///
/// Returns the reason the frame has to be dropped.
pub fn process_frame(
    pipeline: &FramePipeline,
    source: String,
    payload: &str,
) -> Result<FrameResult, FrameError> {
    let frame = decode_data_url(payload, source)?;
    pipeline.process(&frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_core::{EmotionVector, HeadPoseResult};

    fn result(face_count: usize) -> FrameResult {
        FrameResult {
            face_count,
            head_pose: HeadPoseResult::default(),
            emotions: EmotionVector::neutral(),
            timestamp: 1.0,
        }
    }

    #[test]
    fn test_gate_starts_open_and_toggles() {
        let mut session = Session::new(1, true);
        let frame = r#"{"event":"frame","data":"data:image/png;base64,AAAA"}"#;
        assert!(matches!(session.on_text(frame), SessionAction::Analyze(_)));

        assert_eq!(session.on_text(r#"{"event":"stop_analysis"}"#), SessionAction::Ignore);
        assert!(!session.is_analyzing());
        assert_eq!(session.on_text(frame), SessionAction::Ignore);

        session.on_text(r#"{"event":"start_analysis"}"#);
        assert!(matches!(session.on_text(frame), SessionAction::Analyze(_)));
    }

    #[test]
    fn test_garbage_is_ignored() {
        let mut session = Session::new(1, true);
        assert_eq!(session.on_text("{not json"), SessionAction::Ignore);
        assert_eq!(session.on_text(r#"{"event":"reset"}"#), SessionAction::Ignore);
        assert!(session.is_analyzing());
    }

    #[test]
    fn test_result_then_alert() {
        let mut session = Session::new(7, true);
        let events = session.on_result(result(0));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ServerEvent::EmotionData(_)));
        assert!(matches!(&events[1], ServerEvent::Alert(a) if a.message == "No face detected"));
        assert_eq!(session.frame_source(), "session-7/frame-1");

        assert_eq!(session.on_result(result(1)).len(), 1);
    }

    #[test]
    fn test_alerts_disabled() {
        let mut session = Session::new(1, false);
        assert_eq!(session.on_result(result(0)).len(), 1);
    }
}
