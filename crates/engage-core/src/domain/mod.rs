//! Core domain types for per-frame engagement analysis.

mod emotion;
mod frame;
mod landmarks;
mod pose;

pub use emotion::{EmotionLabel, EmotionVector, GestureScores, UnknownEmotionError};
pub use frame::{FrameInput, FrameReport, FrameResult};
pub use landmarks::{
    face_index, hand_index, FaceLandmarks, HandLandmarks, LandmarkPoint, LandmarkSet,
};
pub use pose::{Direction, HeadPoseResult, HorizontalDirection, VerticalDirection};
