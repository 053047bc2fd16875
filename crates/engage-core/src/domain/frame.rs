//! Frame input and per-frame output records.

use std::ops::Deref;

use image::GenericImageView;
use serde::{Deserialize, Serialize};

use super::{EmotionVector, HeadPoseResult};

/// One decoded color frame.
#[derive(Debug, Clone)]
pub struct FrameInput {
    /// Where the frame came from (socket session, file path, ...).
    pub source: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl FrameInput {
    /// Wraps a decoded image, reading its dimensions.
    #[must_use]
    pub fn new(source: impl Into<String>, image: image::DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            source: source.into(),
            width,
            height,
            image,
        }
    }
}

impl Deref for FrameInput {
    type Target = image::DynamicImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

/// The externally observable result for one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResult {
    /// Number of faces the landmark provider found.
    pub face_count: usize,
    /// Head pose of the first face, straight when there is none.
    pub head_pose: HeadPoseResult,
    /// Fused emotion/attention vector.
    pub emotions: EmotionVector,
    /// Wall-clock emission time in seconds since the Unix epoch.
    pub timestamp: f64,
}

impl FrameResult {
    /// The result for a frame with no face and no hands.
    #[must_use]
    pub fn empty(timestamp: f64) -> Self {
        Self {
            face_count: 0,
            head_pose: HeadPoseResult::default(),
            emotions: EmotionVector::neutral(),
            timestamp,
        }
    }
}

/// A frame result tagged with its source, as written by offline analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Source the frame was read from.
    pub source: String,
    /// The frame's result.
    #[serde(flatten)]
    pub result: FrameResult,
}
