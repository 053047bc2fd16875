//! Landmark and frame builders.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use engage_core::domain::{face_index, hand_index};
use engage_core::{FrameInput, LandmarkPoint, LandmarkSet};
use image::{DynamicImage, Rgb, RgbImage};

/// Builds face-mesh landmark sets in normalized coordinates.
///
/// Starts from a frontal, level face centered in the frame. Points the
/// analyzers do not read sit on the nose tip.
#[derive(Debug, Clone)]
pub struct FaceBuilder {
    points: Vec<LandmarkPoint>,
}

/// Index pairs that swap sides when a face is mirrored.
const MIRROR_PAIRS: [(usize, usize); 2] = [
    (face_index::LEFT_EYE, face_index::RIGHT_EYE),
    (face_index::LEFT_CHEEK, face_index::RIGHT_CHEEK),
];

impl FaceBuilder {
    /// A frontal face looking straight at the camera.
    #[must_use]
    pub fn frontal() -> Self {
        let nose = LandmarkPoint::new(0.5, 0.5);
        let mut points = vec![nose; face_index::MESH_POINTS];
        points[face_index::LEFT_EYE] = LandmarkPoint::new(0.45, 0.43);
        points[face_index::RIGHT_EYE] = LandmarkPoint::new(0.55, 0.43);
        points[face_index::FOREHEAD] = LandmarkPoint::new(0.5, 0.32);
        points[face_index::CHIN] = LandmarkPoint::new(0.5, 0.68);
        points[face_index::LEFT_CHEEK] = LandmarkPoint::new(0.38, 0.52);
        points[face_index::RIGHT_CHEEK] = LandmarkPoint::new(0.62, 0.52);
        points[face_index::UPPER_LIP] = LandmarkPoint::new(0.5, 0.58);
        Self { points }
    }

    /// Sets one landmark.
    #[must_use]
    pub fn point(mut self, index: usize, x: f32, y: f32) -> Self {
        if index >= self.points.len() {
            self.points.resize(index + 1, LandmarkPoint::default());
        }
        self.points[index] = LandmarkPoint::new(x, y);
        self
    }

    /// Sets the nose tip.
    #[must_use]
    pub fn nose(self, x: f32, y: f32) -> Self {
        self.point(face_index::NOSE_TIP, x, y)
    }

    /// Sets the upper-lip center.
    #[must_use]
    pub fn mouth(self, x: f32, y: f32) -> Self {
        self.point(face_index::UPPER_LIP, x, y)
    }

    /// Sets the forehead center.
    #[must_use]
    pub fn forehead(self, x: f32, y: f32) -> Self {
        self.point(face_index::FOREHEAD, x, y)
    }

    /// Sets the chin.
    #[must_use]
    pub fn chin(self, x: f32, y: f32) -> Self {
        self.point(face_index::CHIN, x, y)
    }

    /// Sets both cheeks.
    #[must_use]
    pub fn cheeks(self, left: (f32, f32), right: (f32, f32)) -> Self {
        self.point(face_index::LEFT_CHEEK, left.0, left.1)
            .point(face_index::RIGHT_CHEEK, right.0, right.1)
    }

    /// Sets both eyes.
    #[must_use]
    pub fn eyes(self, left: (f32, f32), right: (f32, f32)) -> Self {
        self.point(face_index::LEFT_EYE, left.0, left.1)
            .point(face_index::RIGHT_EYE, right.0, right.1)
    }

    /// Moves the nose and both cheeks horizontally, keeping cheek reach balanced.
    #[must_use]
    pub fn turn(mut self, dx: f32) -> Self {
        for idx in [face_index::NOSE_TIP, face_index::LEFT_CHEEK, face_index::RIGHT_CHEEK] {
            self.points[idx].x += dx;
        }
        self
    }

    /// Moves the nose vertically.
    #[must_use]
    pub fn tilt(mut self, dy: f32) -> Self {
        self.points[face_index::NOSE_TIP].y += dy;
        self
    }

    /// Reflects the face about the frame's vertical center line.
    ///
    /// Left/right landmark pairs swap indices so the mirrored set still puts
    /// the "left" eye and cheek on the image-left side.
    #[must_use]
    pub fn mirrored(mut self) -> Self {
        for p in &mut self.points {
            p.x = 1.0 - p.x;
        }
        for (a, b) in MIRROR_PAIRS {
            self.points.swap(a, b);
        }
        self
    }

    /// Keeps only the first `len` points, to produce malformed sets.
    #[must_use]
    pub fn truncated(mut self, len: usize) -> Self {
        self.points.truncate(len);
        self
    }

    /// Builds the landmark set.
    #[must_use]
    pub fn build(self) -> LandmarkSet {
        LandmarkSet::new(self.points)
    }
}

/// Builds 21-point hand landmark sets.
#[derive(Debug, Clone)]
pub struct HandBuilder {
    points: Vec<LandmarkPoint>,
}

impl HandBuilder {
    /// A hand whose thumb, index and middle tips all sit at `(x, y)`.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        let wrist = LandmarkPoint::new(x, (y + 0.2).min(1.0));
        let mut points = vec![wrist; hand_index::REQUIRED_POINTS];
        for idx in [hand_index::THUMB_TIP, hand_index::INDEX_TIP, hand_index::MIDDLE_TIP] {
            points[idx] = LandmarkPoint::new(x, y);
        }
        Self { points }
    }

    /// Places the three tips separately.
    #[must_use]
    pub fn tips(mut self, thumb: (f32, f32), index: (f32, f32), middle: (f32, f32)) -> Self {
        self.points[hand_index::THUMB_TIP] = LandmarkPoint::new(thumb.0, thumb.1);
        self.points[hand_index::INDEX_TIP] = LandmarkPoint::new(index.0, index.1);
        self.points[hand_index::MIDDLE_TIP] = LandmarkPoint::new(middle.0, middle.1);
        self
    }

    /// Keeps only the first `len` points, to produce malformed sets.
    #[must_use]
    pub fn truncated(mut self, len: usize) -> Self {
        self.points.truncate(len);
        self
    }

    /// Builds the landmark set.
    #[must_use]
    pub fn build(self) -> LandmarkSet {
        LandmarkSet::new(self.points)
    }
}

/// Synthetic frames and encoded payloads.
pub struct SyntheticFrameBuilder;

impl SyntheticFrameBuilder {
    /// A uniform gray frame.
    #[must_use]
    pub fn gray(width: u32, height: u32, value: u8) -> FrameInput {
        FrameInput::new("synthetic://gray", Self::gray_image(width, height, value))
    }

    /// A black frame tagged with `source`.
    #[must_use]
    pub fn blank(source: &str, width: u32, height: u32) -> FrameInput {
        FrameInput::new(source, DynamicImage::new_rgb8(width, height))
    }

    /// A uniform gray image.
    #[must_use]
    pub fn gray_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    /// PNG bytes of a uniform gray image.
    #[must_use]
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing PNG into memory only fails on allocation failure.
        let _ = Self::gray_image(width, height, 128)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png);
        bytes
    }

    /// A `data:image/png;base64,...` URL, as a browser client would send.
    #[must_use]
    pub fn png_data_url(width: u32, height: u32) -> String {
        format!(
            "data:image/png;base64,{}",
            STANDARD.encode(Self::png_bytes(width, height))
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use engage_core::{FaceLandmarks, HandLandmarks};

    #[test]
    fn test_frontal_face_is_well_formed() {
        let set = FaceBuilder::frontal().build();
        assert_eq!(set.len(), face_index::MESH_POINTS);
        assert!(FaceLandmarks::new(&set).is_ok());
    }

    #[test]
    fn test_mirror_swaps_sides() {
        let set = FaceBuilder::frontal().turn(0.05).mirrored().build();
        let face = FaceLandmarks::new(&set).unwrap();
        assert!((face.nose_tip().x - 0.45).abs() < 1e-6);
        assert!(face.left_eye().x < face.right_eye().x);
        assert!(face.left_cheek().x < face.right_cheek().x);
    }

    #[test]
    fn test_truncated_sets_fail_validation() {
        assert!(FaceLandmarks::new(&FaceBuilder::frontal().truncated(200).build()).is_err());
        assert!(HandLandmarks::new(&HandBuilder::at(0.5, 0.5).truncated(10).build()).is_err());
    }

    #[test]
    fn test_png_data_url() {
        let url = SyntheticFrameBuilder::png_data_url(4, 3);
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
