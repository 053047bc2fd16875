//! Landmark points, landmark sets and the semantic index schemas.

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, LandmarkKind};

/// Semantic indices into a face-mesh landmark set.
pub mod face_index {
    /// Nose tip.
    pub const NOSE_TIP: usize = 1;
    /// Forehead center.
    pub const FOREHEAD: usize = 9;
    /// Upper-lip center, used as the mouth anchor.
    pub const UPPER_LIP: usize = 13;
    /// Eye corner on the image-left side.
    pub const LEFT_EYE: usize = 33;
    /// Chin.
    pub const CHIN: usize = 175;
    /// Cheek edge on the image-left side.
    pub const LEFT_CHEEK: usize = 234;
    /// Eye corner on the image-right side.
    pub const RIGHT_EYE: usize = 263;
    /// Cheek edge on the image-right side.
    pub const RIGHT_CHEEK: usize = 454;

    /// Full face-mesh size.
    pub const MESH_POINTS: usize = 468;
    /// Smallest set that covers every index above.
    pub const REQUIRED_POINTS: usize = RIGHT_CHEEK + 1;
}

/// Semantic indices into a hand landmark set.
pub mod hand_index {
    /// Thumb tip.
    pub const THUMB_TIP: usize = 4;
    /// Index fingertip.
    pub const INDEX_TIP: usize = 8;
    /// Middle fingertip.
    pub const MIDDLE_TIP: usize = 12;

    /// Hand schema size.
    pub const REQUIRED_POINTS: usize = 21;
}

/// A landmark in normalized image coordinates (`[0,1]` relative to width/height).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal position, 0 = left edge.
    pub x: f32,
    /// Vertical position, 0 = top edge.
    pub y: f32,
    /// Relative depth, when the provider reports one.
    #[serde(default)]
    pub z: f32,
}

impl LandmarkPoint {
    /// Creates a 2-D point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Creates a point with depth.
    #[must_use]
    pub const fn with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmark points as returned by a provider for one face or one hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<LandmarkPoint>,
}

impl LandmarkSet {
    /// Wraps provider output.
    #[must_use]
    pub const fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    /// Number of points in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the point at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<LandmarkPoint> {
        self.points.get(index).copied()
    }

    /// All points in schema order.
    #[must_use]
    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    fn require(&self, kind: LandmarkKind, required: usize) -> Result<(), FrameError> {
        if self.points.len() < required {
            return Err(FrameError::MalformedLandmarks {
                kind,
                required,
                found: self.points.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<LandmarkPoint>> for LandmarkSet {
    fn from(points: Vec<LandmarkPoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<LandmarkPoint> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = LandmarkPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A face landmark set known to cover the face-mesh schema.
#[derive(Debug, Clone, Copy)]
pub struct FaceLandmarks<'a> {
    set: &'a LandmarkSet,
}

impl<'a> FaceLandmarks<'a> {
    /// Checks `set` against the face schema.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedLandmarks`] if the set is too short.
    pub fn new(set: &'a LandmarkSet) -> Result<Self, FrameError> {
        set.require(LandmarkKind::Face, face_index::REQUIRED_POINTS)?;
        Ok(Self { set })
    }

    fn at(&self, index: usize) -> LandmarkPoint {
        self.set.points[index]
    }

    /// Nose tip.
    #[must_use]
    pub fn nose_tip(&self) -> LandmarkPoint {
        self.at(face_index::NOSE_TIP)
    }

    /// Upper-lip center.
    #[must_use]
    pub fn mouth(&self) -> LandmarkPoint {
        self.at(face_index::UPPER_LIP)
    }

    /// Forehead center.
    #[must_use]
    pub fn forehead(&self) -> LandmarkPoint {
        self.at(face_index::FOREHEAD)
    }

    /// Chin.
    #[must_use]
    pub fn chin(&self) -> LandmarkPoint {
        self.at(face_index::CHIN)
    }

    /// Image-left eye.
    #[must_use]
    pub fn left_eye(&self) -> LandmarkPoint {
        self.at(face_index::LEFT_EYE)
    }

    /// Image-right eye.
    #[must_use]
    pub fn right_eye(&self) -> LandmarkPoint {
        self.at(face_index::RIGHT_EYE)
    }

    /// Image-left cheek.
    #[must_use]
    pub fn left_cheek(&self) -> LandmarkPoint {
        self.at(face_index::LEFT_CHEEK)
    }

    /// Image-right cheek.
    #[must_use]
    pub fn right_cheek(&self) -> LandmarkPoint {
        self.at(face_index::RIGHT_CHEEK)
    }
}

/// A hand landmark set known to cover the hand schema.
#[derive(Debug, Clone, Copy)]
pub struct HandLandmarks<'a> {
    set: &'a LandmarkSet,
}

impl<'a> HandLandmarks<'a> {
    /// Checks `set` against the hand schema.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedLandmarks`] if the set is too short.
    pub fn new(set: &'a LandmarkSet) -> Result<Self, FrameError> {
        set.require(LandmarkKind::Hand, hand_index::REQUIRED_POINTS)?;
        Ok(Self { set })
    }

    /// Thumb tip.
    #[must_use]
    pub fn thumb_tip(&self) -> LandmarkPoint {
        self.set.points[hand_index::THUMB_TIP]
    }

    /// Index fingertip.
    #[must_use]
    pub fn index_tip(&self) -> LandmarkPoint {
        self.set.points[hand_index::INDEX_TIP]
    }

    /// Middle fingertip.
    #[must_use]
    pub fn middle_tip(&self) -> LandmarkPoint {
        self.set.points[hand_index::MIDDLE_TIP]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled(len: usize) -> LandmarkSet {
        (0..len)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let v = i as f32 / 1000.0;
                LandmarkPoint::new(v, v)
            })
            .collect()
    }

    #[test]
    fn test_face_accessors_follow_schema() {
        let set = filled(face_index::MESH_POINTS);
        let face = FaceLandmarks::new(&set).unwrap();
        assert_eq!(face.nose_tip(), set.get(1).unwrap());
        assert_eq!(face.chin(), set.get(175).unwrap());
        assert_eq!(face.right_cheek(), set.get(454).unwrap());
    }

    #[test]
    fn test_short_face_set_rejected() {
        let set = filled(177);
        let err = FaceLandmarks::new(&set).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedLandmarks {
                kind: LandmarkKind::Face,
                required: 455,
                found: 177,
            }
        ));
    }

    #[test]
    fn test_hand_schema() {
        let set = filled(21);
        let hand = HandLandmarks::new(&set).unwrap();
        assert_eq!(hand.thumb_tip(), set.get(4).unwrap());
        assert_eq!(hand.index_tip(), set.get(8).unwrap());
        assert_eq!(hand.middle_tip(), set.get(12).unwrap());

        assert!(HandLandmarks::new(&filled(20)).is_err());
    }

    #[test]
    fn test_point_deserializes_without_depth() {
        let p: LandmarkPoint = serde_json::from_str(r#"{"x":0.25,"y":0.5}"#).unwrap();
        assert_eq!(p, LandmarkPoint::new(0.25, 0.5));
    }
}
