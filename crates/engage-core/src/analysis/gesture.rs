//! Hand-to-face gesture scoring.
//!
//! A hand whose fingertip center sits near the mouth reads as "thinking", one
//! near the forehead as "confused". Scores accumulate over all hands in the
//! frame and saturate at 1.0. All distances are in normalized coordinates.

use tracing::trace;

use super::geometry::{centroid, distance};
use crate::domain::{FaceLandmarks, GestureScores, HandLandmarks, LandmarkPoint};

/// Gesture thresholds.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Maximum hand-to-mouth distance for "thinking".
    pub mouth_radius: f32,
    /// How far above the mouth the hand center may sit.
    pub mouth_rise: f32,
    /// Maximum hand-to-forehead distance for "confused".
    pub forehead_radius: f32,
    /// How far below the forehead the hand center may sit.
    pub forehead_below: f32,
    /// How far above the forehead the hand center may sit.
    pub forehead_above: f32,
    /// Score added per matching hand.
    pub increment: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            mouth_radius: 0.15,
            mouth_rise: 0.1,
            forehead_radius: 0.2,
            forehead_below: 0.1,
            forehead_above: 0.15,
            increment: 0.8,
        }
    }
}

/// Which gesture a single hand matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandGesture {
    /// Hand at the mouth.
    Thinking,
    /// Hand at the forehead.
    Confused,
    /// Neither.
    None,
}

/// Gesture analyzer.
#[derive(Debug, Clone, Default)]
pub struct GestureAnalyzer {
    config: GestureConfig,
}

impl GestureAnalyzer {
    /// Creates an analyzer with the given thresholds.
    #[must_use]
    pub const fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer's thresholds.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Scores all `hands` against `face`.
    #[must_use]
    pub fn analyze(&self, face: &FaceLandmarks<'_>, hands: &[HandLandmarks<'_>]) -> GestureScores {
        let mut scores = GestureScores::default();
        for hand in hands {
            match self.classify_hand(face, hand) {
                HandGesture::Thinking => {
                    scores.thinking = (scores.thinking + self.config.increment).min(1.0);
                }
                HandGesture::Confused => {
                    scores.confused = (scores.confused + self.config.increment).min(1.0);
                }
                HandGesture::None => {}
            }
        }
        trace!(hands = hands.len(), ?scores, "gesture scores");
        scores
    }

    /// Decides which gesture one hand makes. Mouth wins over forehead.
    #[must_use]
    pub fn classify_hand(&self, face: &FaceLandmarks<'_>, hand: &HandLandmarks<'_>) -> HandGesture {
        let cfg = &self.config;
        let center = hand_center(hand);
        let mouth = face.mouth();
        let forehead = face.forehead();

        if distance(center, mouth) < cfg.mouth_radius && center.y > mouth.y - cfg.mouth_rise {
            HandGesture::Thinking
        } else if distance(center, forehead) < cfg.forehead_radius
            && center.y < forehead.y + cfg.forehead_below
            && center.y > forehead.y - cfg.forehead_above
        {
            HandGesture::Confused
        } else {
            HandGesture::None
        }
    }
}

/// Mean of the index, middle and thumb tips.
#[must_use]
pub fn hand_center(hand: &HandLandmarks<'_>) -> LandmarkPoint {
    centroid(&[hand.index_tip(), hand.middle_tip(), hand.thumb_tip()])
}
