//! Emotion classifier port.

use crate::domain::EmotionLabel;

/// Port for dominant-emotion classification of a whole frame.
pub trait EmotionClassifier: Send + Sync {
    /// Returns the name of this classifier, for logging.
    fn name(&self) -> &'static str;

    /// Classifies the dominant emotion in `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if no label can be produced. Callers fall back to
    /// neutral.
    fn classify(&self, image: &image::DynamicImage) -> anyhow::Result<EmotionLabel>;
}
