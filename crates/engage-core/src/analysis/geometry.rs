//! Point geometry shared by the analyzers.

use crate::domain::LandmarkPoint;

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    /// Euclidean distance to `other`, in pixels.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Euclidean distance between two landmarks in normalized space (x/y only).
#[must_use]
pub fn distance(a: LandmarkPoint, b: LandmarkPoint) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Scales a normalized landmark to pixel coordinates.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn to_pixel_space(point: LandmarkPoint, width: u32, height: u32) -> PixelPoint {
    PixelPoint {
        x: point.x * width as f32,
        y: point.y * height as f32,
    }
}

/// Mean of a set of landmarks in x and y.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[LandmarkPoint]) -> LandmarkPoint {
    if points.is_empty() {
        return LandmarkPoint::default();
    }
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    LandmarkPoint::new(sx / n, sy / n)
}
