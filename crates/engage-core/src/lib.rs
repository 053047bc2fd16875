//! Engage Core - per-frame engagement signal derivation
//!
//! This crate contains the domain types, the ports behind which landmark
//! extraction and emotion classification live, the heuristic analyzers
//! (head pose, hand gestures, signal fusion) and the [`FramePipeline`] that
//! ties them together for one decoded frame.

pub mod analysis;
pub mod domain;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use analysis::{
    derive_alert, fuse, Alert, AlertKind, ClassificationOutcome, GestureAnalyzer, GestureConfig,
    HeadPoseAnalyzer, HeadPoseConfig,
};
pub use domain::{
    Direction, EmotionLabel, EmotionVector, FaceLandmarks, FrameInput, FrameReport, FrameResult,
    GestureScores, HandLandmarks, HeadPoseResult, HorizontalDirection, LandmarkPoint, LandmarkSet,
    VerticalDirection,
};
pub use error::{FrameError, LandmarkKind};
pub use pipeline::{unix_timestamp, FramePipeline};
pub use ports::{
    EmotionClassifier, FrameSource, LandmarkProvider, ProgressEvent, ProgressSink, ResultOutput,
};
