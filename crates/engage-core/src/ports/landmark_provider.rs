//! Landmark provider port.

use crate::domain::LandmarkSet;

/// Port for face-mesh and hand landmark extraction.
///
/// Implementations are long-lived and shared between sessions, so they must
/// be safe to call concurrently.
pub trait LandmarkProvider: Send + Sync {
    /// Returns the name of this provider, for logging.
    fn name(&self) -> &'static str;

    /// Detects faces and returns one face-mesh landmark set per face.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails. Finding no face is not an error.
    fn detect_faces(&self, image: &image::DynamicImage) -> anyhow::Result<Vec<LandmarkSet>>;

    /// Detects hands and returns one hand landmark set per hand.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails. Finding no hand is not an error.
    fn detect_hands(&self, image: &image::DynamicImage) -> anyhow::Result<Vec<LandmarkSet>>;
}
