//! Test support utilities for engage.
//!
//! Provides landmark builders, synthetic frames and mocks of every core port
//! so the analysis pipeline can be exercised without model weights.
//!
//! # Example
//!
//! ```
//! use engage_test_support::{FaceBuilder, HandBuilder, MockLandmarkProvider};
//!
//! let face = FaceBuilder::frontal().turn(0.03).build();
//! let hand = HandBuilder::at(0.5, 0.55).build();
//! let provider = MockLandmarkProvider::new(vec![face], vec![hand]);
//! ```

mod builders;
mod mocks;

pub use builders::{FaceBuilder, HandBuilder, SyntheticFrameBuilder};
pub use mocks::{
    MockEmotionClassifier, MockFrameSource, MockLandmarkProvider, MockProgressSink,
    MockResultOutput,
};
