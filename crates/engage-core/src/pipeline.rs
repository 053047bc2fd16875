//! Per-frame orchestration: landmarks, head pose, emotion, gestures, fusion.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::analysis::{
    fuse, ClassificationOutcome, GestureAnalyzer, GestureConfig, HeadPoseAnalyzer, HeadPoseConfig,
};
use crate::domain::{
    FaceLandmarks, FrameInput, FrameResult, GestureScores, HandLandmarks, HeadPoseResult,
};
use crate::error::FrameError;
use crate::ports::{EmotionClassifier, LandmarkProvider};

/// Seconds since the Unix epoch, with sub-second precision.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn unix_timestamp() -> f64 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
}

/// Turns one decoded frame into one [`FrameResult`].
///
/// Holds no per-frame state, so a single pipeline can be shared between
/// sessions and threads.
#[derive(Clone)]
pub struct FramePipeline {
    landmarks: Arc<dyn LandmarkProvider>,
    classifier: Arc<dyn EmotionClassifier>,
    head_pose: HeadPoseAnalyzer,
    gesture: GestureAnalyzer,
}

impl FramePipeline {
    /// Creates a pipeline with default analyzer thresholds.
    #[must_use]
    pub fn new(landmarks: Arc<dyn LandmarkProvider>, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            landmarks,
            classifier,
            head_pose: HeadPoseAnalyzer::default(),
            gesture: GestureAnalyzer::default(),
        }
    }

    /// Replaces the head-pose thresholds.
    #[must_use]
    pub fn with_head_pose_config(mut self, config: HeadPoseConfig) -> Self {
        self.head_pose = HeadPoseAnalyzer::new(config);
        self
    }

    /// Replaces the gesture thresholds.
    #[must_use]
    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.gesture = GestureAnalyzer::new(config);
        self
    }

    /// Processes `frame`, stamping the result with the time it is emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if landmark detection fails or returns a set that
    /// does not cover the landmark schema. The frame should be dropped.
    pub fn process(&self, frame: &FrameInput) -> Result<FrameResult, FrameError> {
        self.process_with(frame, unix_timestamp)
    }

    /// Processes `frame`, stamping the result with `timestamp`.
    ///
    /// # Errors
    ///
    /// See [`FramePipeline::process`].
    pub fn process_at(&self, frame: &FrameInput, timestamp: f64) -> Result<FrameResult, FrameError> {
        self.process_with(frame, || timestamp)
    }

    /// Runs the analysis, then reads `clock` once the result is complete.
    fn process_with(
        &self,
        frame: &FrameInput,
        clock: impl FnOnce() -> f64,
    ) -> Result<FrameResult, FrameError> {
        let faces = self
            .landmarks
            .detect_faces(&frame.image)
            .map_err(|e| FrameError::Detection(format!("{}: {e:#}", self.landmarks.name())))?;
        let hands = self
            .landmarks
            .detect_hands(&frame.image)
            .map_err(|e| FrameError::Detection(format!("{}: {e:#}", self.landmarks.name())))?;

        debug!(
            source = %frame.source,
            faces = faces.len(),
            hands = hands.len(),
            "landmarks detected"
        );

        let Some(first) = faces.first() else {
            // Gestures need face anchors, so hands are ignored here.
            return Ok(FrameResult::empty(clock()));
        };

        let face = FaceLandmarks::new(first)?;
        let head_pose: HeadPoseResult = self.head_pose.analyze(&face, frame.width, frame.height);

        let outcome = match self.classifier.classify(&frame.image) {
            Ok(label) => ClassificationOutcome::Classified(label),
            Err(e) => {
                warn!(
                    source = %frame.source,
                    classifier = self.classifier.name(),
                    "emotion classification failed, using neutral: {e:#}"
                );
                ClassificationOutcome::Failed
            }
        };

        let gestures = if hands.is_empty() {
            GestureScores::default()
        } else {
            let hands = hands
                .iter()
                .map(HandLandmarks::new)
                .collect::<Result<Vec<_>, _>>()?;
            self.gesture.analyze(&face, &hands)
        };

        let emotions = fuse(outcome, gestures);
        Ok(FrameResult {
            face_count: faces.len(),
            head_pose,
            emotions,
            timestamp: clock(),
        })
    }
}
