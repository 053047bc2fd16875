//! Candle inference backends for the landmark and emotion ports.
//!
//! - BlazeFace face detection, mapped onto the face-mesh landmark schema
//! - a small CNN for seven-way expression classification
//! - an optional whole-frame hand landmark regressor

mod device;
mod emotion_net;
mod face_detector;
mod hand_net;
mod loader;
mod providers;
mod utils;

pub use device::select_device;
pub use emotion_net::EmotionNet;
pub use face_detector::{BlazeFace, FaceBox};
pub use hand_net::HandNet;
pub use loader::{load_safetensors, LazyModel};
pub use providers::{
    BlazeFaceConfig, BlazeFaceProvider, CandleEmotionClassifier, EmotionClassifierConfig,
    HandLandmarkConfig, HandLandmarker,
};
pub use utils::{argmax, sigmoid, softmax};
