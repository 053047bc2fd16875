//! Head-pose direction from face landmark geometry.
//!
//! Works in pixel space so that eye distance, cheek reach and face height are
//! compared with the image's real aspect ratio:
//! - horizontal: nose offset from the eye midpoint, blended with cheek asymmetry
//! - vertical: nose offset from the forehead/chin midpoint
//! - combined: the non-straight axis, or the larger normalized deviation when both are

use tracing::trace;

use super::geometry::to_pixel_space;
use crate::domain::{
    Direction, FaceLandmarks, HeadPoseResult, HorizontalDirection, VerticalDirection,
};

/// Thresholds for head-pose classification.
#[derive(Debug, Clone)]
pub struct HeadPoseConfig {
    /// Combined horizontal ratio beyond which the head counts as turned.
    pub horizontal_threshold: f32,
    /// Cheek asymmetry ratio that alone counts as turned.
    pub cheek_threshold: f32,
    /// Weight of the cheek ratio in the combined horizontal signal.
    pub cheek_weight: f32,
    /// Nose offset, as a fraction of face height, beyond which the head counts as tilted.
    pub vertical_ratio: f32,
}

impl Default for HeadPoseConfig {
    fn default() -> Self {
        Self {
            horizontal_threshold: 0.25,
            cheek_threshold: 0.3,
            cheek_weight: 0.5,
            vertical_ratio: 0.15,
        }
    }
}

/// Raw geometric signals measured on one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSignals {
    /// Nose offset from the eye midpoint over half the eye distance.
    pub horizontal_ratio: f32,
    /// Right-minus-left cheek reach over the larger reach (at least 1px).
    pub cheek_ratio: f32,
    /// `horizontal_ratio` plus the weighted cheek ratio.
    pub combined_horizontal: f32,
    /// Nose offset below the forehead/chin midpoint, in pixels.
    pub nose_offset_y: f32,
    /// Forehead-to-chin height, in pixels.
    pub face_height: f32,
}

/// Head-pose analyzer.
#[derive(Debug, Clone, Default)]
pub struct HeadPoseAnalyzer {
    config: HeadPoseConfig,
}

impl HeadPoseAnalyzer {
    /// Creates an analyzer with the given thresholds.
    #[must_use]
    pub const fn new(config: HeadPoseConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer's thresholds.
    #[must_use]
    pub const fn config(&self) -> &HeadPoseConfig {
        &self.config
    }

    /// Classifies the head pose of `face` in a `width`x`height` image.
    #[must_use]
    pub fn analyze(&self, face: &FaceLandmarks<'_>, width: u32, height: u32) -> HeadPoseResult {
        let signals = self.measure(face, width, height);
        let pose = self.classify(&signals);
        trace!(?signals, ?pose, "head pose");
        pose
    }

    /// Measures the geometric signals on `face`.
    #[must_use]
    pub fn measure(&self, face: &FaceLandmarks<'_>, width: u32, height: u32) -> PoseSignals {
        let px = |p| to_pixel_space(p, width, height);
        let nose = px(face.nose_tip());
        let left_eye = px(face.left_eye());
        let right_eye = px(face.right_eye());
        let chin = px(face.chin());
        let forehead = px(face.forehead());
        let left_cheek = px(face.left_cheek());
        let right_cheek = px(face.right_cheek());

        let eye_center = left_eye.midpoint(right_eye);
        let nose_to_center = nose.x - eye_center.x;
        let eye_distance = left_eye.distance_to(right_eye);
        let horizontal_ratio = if eye_distance > 0.0 {
            nose_to_center / (eye_distance / 2.0)
        } else {
            0.0
        };

        let left_reach = left_cheek.distance_to(nose);
        let right_reach = right_cheek.distance_to(nose);
        let cheek_ratio = (right_reach - left_reach) / left_reach.max(right_reach).max(1.0);
        let combined_horizontal = cheek_ratio.mul_add(self.config.cheek_weight, horizontal_ratio);

        let face_height = (forehead.y - chin.y).abs();
        let face_mid_y = (forehead.y + chin.y) / 2.0;

        PoseSignals {
            horizontal_ratio,
            cheek_ratio,
            combined_horizontal,
            nose_offset_y: nose.y - face_mid_y,
            face_height,
        }
    }

    /// Turns measured signals into discrete directions.
    #[must_use]
    pub fn classify(&self, s: &PoseSignals) -> HeadPoseResult {
        let cfg = &self.config;

        let horizontal = if s.combined_horizontal > cfg.horizontal_threshold
            || s.cheek_ratio > cfg.cheek_threshold
        {
            HorizontalDirection::Right
        } else if s.combined_horizontal < -cfg.horizontal_threshold
            || s.cheek_ratio < -cfg.cheek_threshold
        {
            HorizontalDirection::Left
        } else {
            HorizontalDirection::Straight
        };

        let vertical_threshold = s.face_height * cfg.vertical_ratio;
        let vertical = if s.nose_offset_y > vertical_threshold {
            VerticalDirection::Down
        } else if s.nose_offset_y < -vertical_threshold {
            VerticalDirection::Up
        } else {
            VerticalDirection::Straight
        };

        let direction = match (horizontal.is_straight(), vertical.is_straight()) {
            (true, true) => Direction::Straight,
            (false, true) => horizontal.into(),
            (true, false) => vertical.into(),
            (false, false) => {
                // Mixes a width ratio with a height ratio; kept as a coarse tie-break.
                let vertical_deviation = s.nose_offset_y / (s.face_height / 2.0);
                if s.combined_horizontal.abs() > vertical_deviation.abs() {
                    horizontal.into()
                } else {
                    vertical.into()
                }
            }
        };

        HeadPoseResult {
            direction,
            horizontal,
            vertical,
        }
    }
}
