//! Model selection and pipeline assembly shared by `serve` and `analyze`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use engage_adapters::ModelStore;
use engage_core::inference::{
    BlazeFaceConfig, BlazeFaceProvider, CandleEmotionClassifier, EmotionClassifierConfig,
    HandLandmarkConfig, HandLandmarker,
};
use engage_core::FramePipeline;
use tracing::{debug, info};

use super::parse_unit;
use crate::config::AppConfig;

/// Hardcoded default values.
mod defaults {
    pub const MIN_FACE_CONFIDENCE: f32 = 0.5;
}

/// Model selection flags.
#[derive(Args, Clone, Debug, Default)]
pub struct ModelArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Disable face detection (every frame reports no face)
    #[arg(long)]
    pub no_face: bool,

    /// Disable emotion classification (faces read as neutral)
    #[arg(long)]
    pub no_emotion: bool,

    /// Disable hand landmarks (gesture scores stay at zero)
    #[arg(long)]
    pub no_hands: bool,

    /// Minimum face detection score (0.0-1.0)
    #[arg(long, value_parser = parse_unit)]
    pub min_face_confidence: Option<f32>,
}

impl ModelArgs {
    /// Apply configuration file values; CLI flags win.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if !self.no_face {
            if let Some(enabled) = config.models.face {
                self.no_face = !enabled;
            }
        }
        if !self.no_emotion {
            if let Some(enabled) = config.models.emotion {
                self.no_emotion = !enabled;
            }
        }
        if !self.no_hands {
            if let Some(enabled) = config.models.hands {
                self.no_hands = !enabled;
            }
        }
        self.min_face_confidence = self
            .min_face_confidence
            .or(config.models.min_face_confidence);
        if self.models_dir.is_none() {
            self.models_dir.clone_from(&config.models.dir);
        }
        self
    }

    /// The model store these flags point at.
    #[must_use]
    pub fn store(&self) -> ModelStore {
        ModelStore::from_override(self.models_dir.clone())
    }

    fn min_face_confidence(&self) -> f32 {
        self.min_face_confidence
            .unwrap_or(defaults::MIN_FACE_CONFIDENCE)
    }

    /// Resolves `name`'s weights, or `None` when disabled or not installed.
    fn weights(&self, store: &ModelStore, name: &str, disabled: bool) -> Option<PathBuf> {
        if disabled {
            debug!("{name} model disabled");
            return None;
        }
        let path = store.installed_path(name);
        if path.is_none() {
            info!(
                "{name} model not found in {}. Run `engage models fetch`.",
                store.dir().display()
            );
        }
        path
    }

    /// Builds the frame pipeline, loading whatever weights are available.
    ///
    /// # Errors
    ///
    /// Returns an error if an installed weights file cannot be loaded.
    pub fn build_pipeline(&self, config: &AppConfig) -> Result<FramePipeline> {
        let store = self.store();
        debug!("Using models directory: {}", store.dir().display());

        let hands = HandLandmarker::new(HandLandmarkConfig {
            model_path: self.weights(&store, "hands", self.no_hands),
            ..HandLandmarkConfig::default()
        });
        hands.preload().context("hand model")?;

        let landmarks = BlazeFaceProvider::new(BlazeFaceConfig {
            model_path: self.weights(&store, "blazeface", self.no_face),
            min_confidence: self.min_face_confidence(),
        })
        .with_hands(hands);
        landmarks.preload().context("face model")?;

        let classifier = CandleEmotionClassifier::new(EmotionClassifierConfig {
            model_path: self.weights(&store, "emotion", self.no_emotion),
        });
        classifier.preload().context("emotion model")?;

        info!(
            face = landmarks.is_configured(),
            emotion = classifier.is_configured(),
            hands = landmarks.detects_hands(),
            "pipeline ready"
        );

        Ok(
            FramePipeline::new(Arc::new(landmarks), Arc::new(classifier))
                .with_head_pose_config(config.head_pose_config())
                .with_gesture_config(config.gesture_config()),
        )
    }
}
