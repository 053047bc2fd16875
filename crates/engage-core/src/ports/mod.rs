//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the analysis core and the
//! model backends, frame sources and result sinks that plug into it.

mod emotion_classifier;
mod frame_source;
mod landmark_provider;
mod progress;
mod result_output;

pub use emotion_classifier::EmotionClassifier;
pub use frame_source::FrameSource;
pub use landmark_provider::LandmarkProvider;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
