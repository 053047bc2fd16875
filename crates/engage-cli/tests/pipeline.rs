//! End-to-end pipeline behavior with mocked landmark and emotion models.

#![allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::missing_panics_doc
)]

use std::sync::Arc;

use engage_core::{
    Direction, EmotionLabel, EmotionVector, FramePipeline, FrameResult, HeadPoseResult,
    HorizontalDirection, LandmarkSet, VerticalDirection,
};
use engage_test_support::{
    FaceBuilder, HandBuilder, MockEmotionClassifier, MockLandmarkProvider, SyntheticFrameBuilder,
};

fn run(
    faces: Vec<LandmarkSet>,
    hands: Vec<LandmarkSet>,
    classifier: MockEmotionClassifier,
    width: u32,
    height: u32,
) -> FrameResult {
    let pipeline = FramePipeline::new(
        Arc::new(MockLandmarkProvider::new(faces, hands)),
        Arc::new(classifier),
    );
    pipeline
        .process_at(&SyntheticFrameBuilder::blank("frame", width, height), 100.0)
        .unwrap()
}

fn neutral_face(faces: Vec<LandmarkSet>, w: u32, h: u32) -> FrameResult {
    run(
        faces,
        vec![],
        MockEmotionClassifier::returning(EmotionLabel::Neutral),
        w,
        h,
    )
}

#[test]
fn test_no_face_no_hands() {
    let result = run(
        vec![],
        vec![],
        MockEmotionClassifier::returning(EmotionLabel::Happy),
        320,
        240,
    );
    assert_eq!(result.face_count, 0);
    assert_eq!(result.head_pose, HeadPoseResult::default());
    assert_eq!(result.emotions, EmotionVector::neutral());
    assert_eq!(result.timestamp, 100.0);
}

#[test]
fn test_small_nose_offset_reads_straight() {
    // 600px wide frame: eyes 60px apart, nose 5px left of their center.
    let face = FaceBuilder::frontal().turn(-5.0 / 600.0).build();
    let result = neutral_face(vec![face], 600, 600);
    assert_eq!(result.head_pose.horizontal, HorizontalDirection::Straight);
    assert_eq!(result.head_pose.direction, Direction::Straight);
}

#[test]
fn test_turns() {
    let left = neutral_face(vec![FaceBuilder::frontal().turn(-0.05).build()], 640, 480);
    assert_eq!(left.head_pose.horizontal, HorizontalDirection::Left);
    assert_eq!(left.head_pose.vertical, VerticalDirection::Straight);
    assert_eq!(left.head_pose.direction, Direction::Left);

    let right = neutral_face(vec![FaceBuilder::frontal().turn(0.05).build()], 640, 480);
    assert_eq!(right.head_pose.direction, Direction::Right);
}

#[test]
fn test_tilts() {
    let down = neutral_face(vec![FaceBuilder::frontal().tilt(0.1).build()], 640, 480);
    assert_eq!(down.head_pose.vertical, VerticalDirection::Down);
    assert_eq!(down.head_pose.direction, Direction::Down);

    let up = neutral_face(vec![FaceBuilder::frontal().tilt(-0.1).build()], 640, 480);
    assert_eq!(up.head_pose.vertical, VerticalDirection::Up);
    assert_eq!(up.head_pose.direction, Direction::Up);
}

#[test]
fn test_mirrored_turn_flips_direction() {
    let turned = FaceBuilder::frontal().turn(-0.06);
    let original = neutral_face(vec![turned.clone().build()], 640, 480);
    let mirrored = neutral_face(vec![turned.mirrored().build()], 640, 480);
    assert_eq!(original.head_pose.horizontal, HorizontalDirection::Left);
    assert_eq!(mirrored.head_pose.horizontal, HorizontalDirection::Right);
}

#[test]
fn test_hand_at_mouth_is_thinking() {
    // Frontal mouth sits at (0.5, 0.58).
    let result = run(
        vec![FaceBuilder::frontal().build()],
        vec![HandBuilder::at(0.5, 0.53).build()],
        MockEmotionClassifier::returning(EmotionLabel::Happy),
        640,
        480,
    );
    assert!((result.emotions.thinking - 0.8).abs() < 1e-6);
    assert_eq!(result.emotions.confused, 0.0);
    assert_eq!(result.emotions.happy, 1.0);
}

#[test]
fn test_classifier_failure_keeps_gestures() {
    // Frontal forehead sits at (0.5, 0.32).
    let result = run(
        vec![FaceBuilder::frontal().build()],
        vec![HandBuilder::at(0.52, 0.3).build()],
        MockEmotionClassifier::failing("no face found"),
        640,
        480,
    );
    assert_eq!(result.emotions.neutral, 1.0);
    assert_eq!(result.emotions.happy, 0.0);
    assert_eq!(result.emotions.sad, 0.0);
    assert_eq!(result.emotions.fearful, 0.0);
    assert!((result.emotions.confused - 0.8).abs() < 1e-6);
    assert_eq!(result.emotions.thinking, 0.0);
}

#[test]
fn test_gesture_scores_saturate() {
    let hands = vec![HandBuilder::at(0.5, 0.56).build(); 3];
    let result = run(
        vec![FaceBuilder::frontal().build()],
        hands,
        MockEmotionClassifier::returning(EmotionLabel::Sad),
        640,
        480,
    );
    assert_eq!(result.emotions.thinking, 1.0);
    assert_eq!(result.emotions.sad, 1.0);
    assert_eq!(result.emotions.neutral, 0.0);
}

#[test]
fn test_unmapped_labels_read_neutral() {
    for label in [EmotionLabel::Angry, EmotionLabel::Disgust, EmotionLabel::Surprise] {
        let result = run(
            vec![FaceBuilder::frontal().build()],
            vec![],
            MockEmotionClassifier::returning(label),
            64,
            64,
        );
        assert_eq!(result.emotions.neutral, 1.0, "{label:?}");
        assert_eq!(result.emotions.affect_sum(), 1.0);
    }
}

#[test]
fn test_fear_maps_to_fearful() {
    let result = run(
        vec![FaceBuilder::frontal().build()],
        vec![],
        MockEmotionClassifier::returning(EmotionLabel::Fear),
        64,
        64,
    );
    assert_eq!(result.emotions.fearful, 1.0);
    assert_eq!(result.emotions.neutral, 0.0);
}

#[test]
fn test_first_face_drives_pose() {
    let result = neutral_face(
        vec![
            FaceBuilder::frontal().turn(0.05).build(),
            FaceBuilder::frontal().turn(-0.05).build(),
        ],
        640,
        480,
    );
    assert_eq!(result.face_count, 2);
    assert_eq!(result.head_pose.horizontal, HorizontalDirection::Right);
}

#[test]
fn test_json_shape() {
    let result = neutral_face(vec![FaceBuilder::frontal().build()], 64, 64);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["faceCount"], 1);
    assert_eq!(value["headPose"]["direction"], "straight");
    assert_eq!(value["emotions"]["neutral"], 1.0);
    assert_eq!(value["timestamp"], 100.0);
}
