//! Heuristic per-frame analysis: head pose, hand gestures, signal fusion
//! and attention alerts.

mod alerts;
mod fusion;
pub mod geometry;
mod gesture;
mod head_pose;

pub use alerts::{derive_alert, Alert, AlertKind};
pub use fusion::{fuse, ClassificationOutcome};
pub use gesture::{hand_center, GestureAnalyzer, GestureConfig, HandGesture};
pub use head_pose::{HeadPoseAnalyzer, HeadPoseConfig, PoseSignals};
