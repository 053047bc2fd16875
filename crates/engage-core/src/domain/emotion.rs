//! Emotion labels, gesture scores and the fused emotion vector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dominant-emotion vocabulary reported by a classifier.
///
/// Variant order matches the output order of FER-style classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    /// Anger.
    Angry,
    /// Disgust.
    Disgust,
    /// Fear.
    Fear,
    /// Happiness.
    Happy,
    /// Sadness.
    Sad,
    /// Surprise.
    Surprise,
    /// No dominant emotion.
    Neutral,
}

impl EmotionLabel {
    /// All labels in classifier output order.
    pub const ALL: [Self; 7] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
        Self::Neutral,
    ];

    /// Lowercase label name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label text no classifier vocabulary entry matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion label '{0}'")]
pub struct UnknownEmotionError(pub String);

impl FromStr for EmotionLabel {
    type Err = UnknownEmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "angry" | "anger" => Ok(Self::Angry),
            "disgust" | "disgusted" => Ok(Self::Disgust),
            "fear" | "fearful" => Ok(Self::Fear),
            "happy" | "happiness" => Ok(Self::Happy),
            "sad" | "sadness" => Ok(Self::Sad),
            "surprise" | "surprised" => Ok(Self::Surprise),
            "neutral" => Ok(Self::Neutral),
            _ => Err(UnknownEmotionError(s.to_string())),
        }
    }
}

/// Hand-gesture activations for one frame, each in `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureScores {
    /// Hand near the mouth.
    pub thinking: f32,
    /// Hand near the forehead.
    pub confused: f32,
}

/// Emotion/attention activations emitted per frame.
///
/// `happy`, `neutral`, `sad` and `fearful` form a one-hot group; `thinking`
/// and `confused` carry the gesture scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    pub happy: f32,
    pub neutral: f32,
    pub sad: f32,
    pub fearful: f32,
    pub thinking: f32,
    pub confused: f32,
}

impl EmotionVector {
    /// The baseline: neutral, no gestures.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            happy: 0.0,
            neutral: 1.0,
            sad: 0.0,
            fearful: 0.0,
            thinking: 0.0,
            confused: 0.0,
        }
    }

    /// One-hot affect group for a classifier label, no gestures.
    ///
    /// Labels outside the emitted group (angry, disgust, surprise) count as
    /// neutral so the group always sums to one.
    #[must_use]
    pub const fn one_hot(label: EmotionLabel) -> Self {
        let mut v = Self {
            happy: 0.0,
            neutral: 0.0,
            sad: 0.0,
            fearful: 0.0,
            thinking: 0.0,
            confused: 0.0,
        };
        match label {
            EmotionLabel::Happy => v.happy = 1.0,
            EmotionLabel::Sad => v.sad = 1.0,
            EmotionLabel::Fear => v.fearful = 1.0,
            EmotionLabel::Neutral
            | EmotionLabel::Angry
            | EmotionLabel::Disgust
            | EmotionLabel::Surprise => v.neutral = 1.0,
        }
        v
    }

    /// Replaces the gesture fields.
    #[must_use]
    pub const fn with_gestures(mut self, gestures: GestureScores) -> Self {
        self.thinking = gestures.thinking;
        self.confused = gestures.confused;
        self
    }

    /// Sum of the one-hot affect group.
    #[must_use]
    pub fn affect_sum(&self) -> f32 {
        self.happy + self.neutral + self.sad + self.fearful
    }
}

impl Default for EmotionVector {
    fn default() -> Self {
        Self::neutral()
    }
}
