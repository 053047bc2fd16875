//! Fusion of the classifier outcome and gesture scores into one emotion vector.

use crate::domain::{EmotionLabel, EmotionVector, GestureScores};

/// What the emotion classifier produced for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// No face was detected, so the classifier was not run.
    NoFace,
    /// The classifier returned a dominant label.
    Classified(EmotionLabel),
    /// The classifier ran and failed.
    Failed,
}

/// Builds the frame's emotion vector.
///
/// The affect group is one-hot on the classified label and falls back to
/// neutral without a face or on classifier failure. Gesture scores are
/// overlaid unconditionally.
#[must_use]
pub const fn fuse(outcome: ClassificationOutcome, gestures: GestureScores) -> EmotionVector {
    let base = match outcome {
        ClassificationOutcome::Classified(label) => EmotionVector::one_hot(label),
        ClassificationOutcome::NoFace | ClassificationOutcome::Failed => EmotionVector::neutral(),
    };
    base.with_gestures(gestures)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_no_face_is_neutral_baseline() {
        assert_eq!(
            fuse(ClassificationOutcome::NoFace, GestureScores::default()),
            EmotionVector::neutral()
        );
    }

    #[test]
    fn test_failure_keeps_gestures() {
        let gestures = GestureScores {
            thinking: 0.8,
            confused: 1.0,
        };
        let v = fuse(ClassificationOutcome::Failed, gestures);
        assert_eq!(v.neutral, 1.0);
        assert_eq!(v.affect_sum(), 1.0);
        assert_eq!(v.thinking, 0.8);
        assert_eq!(v.confused, 1.0);
    }

    #[test]
    fn test_classified_is_one_hot() {
        let v = fuse(
            ClassificationOutcome::Classified(EmotionLabel::Happy),
            GestureScores::default(),
        );
        assert_eq!(v.happy, 1.0);
        assert_eq!(v.neutral, 0.0);
        assert_eq!(v.affect_sum(), 1.0);
    }

    #[test]
    fn test_every_outcome_sums_to_one() {
        let outcomes = EmotionLabel::ALL
            .into_iter()
            .map(ClassificationOutcome::Classified)
            .chain([ClassificationOutcome::NoFace, ClassificationOutcome::Failed]);
        for outcome in outcomes {
            let v = fuse(outcome, GestureScores { thinking: 0.8, confused: 0.0 });
            assert_eq!(v.affect_sum(), 1.0, "{outcome:?}");
        }
    }
}
