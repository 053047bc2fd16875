//! Candle-backed implementations of the landmark and emotion ports.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, trace};

use super::device::select_device;
use super::emotion_net::EmotionNet;
use super::face_detector::BlazeFace;
use super::hand_net::HandNet;
use super::loader::LazyModel;
use crate::domain::{EmotionLabel, LandmarkSet};
use crate::ports::{EmotionClassifier, LandmarkProvider};

/// Configuration for [`BlazeFaceProvider`].
#[derive(Debug, Clone)]
pub struct BlazeFaceConfig {
    /// Weights file; without one the provider reports no faces.
    pub model_path: Option<PathBuf>,
    /// Minimum detection score.
    pub min_confidence: f32,
}

impl Default for BlazeFaceConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            min_confidence: 0.5,
        }
    }
}

/// Configuration for [`HandLandmarker`].
#[derive(Debug, Clone)]
pub struct HandLandmarkConfig {
    /// Weights file; without one no hands are reported.
    pub model_path: Option<PathBuf>,
    /// Minimum hand presence score.
    pub min_presence: f32,
}

impl Default for HandLandmarkConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            min_presence: 0.5,
        }
    }
}

/// Hand landmarks from [`HandNet`].
pub struct HandLandmarker {
    config: HandLandmarkConfig,
    model: Option<LazyModel<HandNet>>,
}

impl HandLandmarker {
    /// Creates a landmarker; weights load on first use.
    #[must_use]
    pub fn new(config: HandLandmarkConfig) -> Self {
        let model = config
            .model_path
            .clone()
            .map(|path| LazyModel::new(path, select_device(), HandNet::load));
        Self { config, model }
    }

    /// True if a weights file was configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Loads the weights now instead of on the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured weights cannot be loaded.
    pub fn preload(&self) -> Result<()> {
        if let Some(model) = &self.model {
            model.get().context("failed to load hand model")?;
        }
        Ok(())
    }

    /// Hands found in `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&self, image: &image::DynamicImage) -> Result<Vec<LandmarkSet>> {
        let Some(model) = &self.model else {
            trace!("no hand model configured");
            return Ok(Vec::new());
        };
        let hand = model.get()?.detect(image, self.config.min_presence)?;
        debug!(hands = usize::from(hand.is_some()), "hand detections");
        Ok(hand.into_iter().collect())
    }
}

/// Face landmarks from the BlazeFace detector, with hands from an optional
/// [`HandLandmarker`].
///
/// Each detection becomes a face-mesh sized set with the analyzed indices
/// filled in. Without a hand landmarker no hands are reported.
pub struct BlazeFaceProvider {
    config: BlazeFaceConfig,
    model: Option<LazyModel<BlazeFace>>,
    hands: Option<HandLandmarker>,
}

impl BlazeFaceProvider {
    /// Creates a provider; weights load on first use.
    #[must_use]
    pub fn new(config: BlazeFaceConfig) -> Self {
        let model = config
            .model_path
            .clone()
            .map(|path| LazyModel::new(path, select_device(), BlazeFace::load));
        Self {
            config,
            model,
            hands: None,
        }
    }

    /// Reports hands from `hands`.
    #[must_use]
    pub fn with_hands(mut self, hands: HandLandmarker) -> Self {
        self.hands = Some(hands);
        self
    }

    /// True if a weights file was configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// True if a configured hand landmarker is attached.
    #[must_use]
    pub fn detects_hands(&self) -> bool {
        self.hands.as_ref().is_some_and(HandLandmarker::is_configured)
    }

    /// Loads the face weights now instead of on the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured weights cannot be loaded.
    pub fn preload(&self) -> Result<()> {
        if let Some(model) = &self.model {
            model.get().context("failed to load face detector")?;
        }
        Ok(())
    }
}

impl LandmarkProvider for BlazeFaceProvider {
    fn name(&self) -> &'static str {
        "blazeface"
    }

    fn detect_faces(&self, image: &image::DynamicImage) -> Result<Vec<LandmarkSet>> {
        let Some(model) = &self.model else {
            trace!("no face model configured");
            return Ok(Vec::new());
        };
        let faces = model.get()?.detect(image, self.config.min_confidence)?;
        debug!(faces = faces.len(), "blazeface detections");
        Ok(faces.iter().map(|f| f.to_landmarks()).collect())
    }

    fn detect_hands(&self, image: &image::DynamicImage) -> Result<Vec<LandmarkSet>> {
        match &self.hands {
            Some(hands) => hands.detect(image),
            None => Ok(Vec::new()),
        }
    }
}

/// Configuration for [`CandleEmotionClassifier`].
#[derive(Debug, Clone, Default)]
pub struct EmotionClassifierConfig {
    /// Weights file; without one every classification fails.
    pub model_path: Option<PathBuf>,
}

/// Dominant-emotion classification with [`EmotionNet`].
pub struct CandleEmotionClassifier {
    model: Option<LazyModel<EmotionNet>>,
}

impl CandleEmotionClassifier {
    /// Creates a classifier; weights load on first use.
    #[must_use]
    pub fn new(config: EmotionClassifierConfig) -> Self {
        Self {
            model: config
                .model_path
                .map(|path| LazyModel::new(path, select_device(), EmotionNet::load)),
        }
    }

    /// True if a weights file was configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Loads the weights now instead of on the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured weights cannot be loaded.
    pub fn preload(&self) -> Result<()> {
        if let Some(model) = &self.model {
            model.get().context("failed to load emotion classifier")?;
        }
        Ok(())
    }
}

impl EmotionClassifier for CandleEmotionClassifier {
    fn name(&self) -> &'static str {
        "emotion-cnn"
    }

    fn classify(&self, image: &image::DynamicImage) -> Result<EmotionLabel> {
        let model = self
            .model
            .as_ref()
            .context("no emotion model configured")?;
        let (label, confidence) = model.get()?.predict(image)?;
        trace!(%label, confidence, "emotion");
        Ok(label)
    }
}
