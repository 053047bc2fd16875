//! Engage Adapters - the outer edges of the engagement monitor.
//!
//! This crate provides:
//! - data-URL frame decoding
//! - a filesystem frame source for offline analysis
//! - model weight download and caching
//! - the WebSocket frame server

pub mod decode;
pub mod fs;
pub mod models;
pub mod server;

pub use decode::decode_data_url;
pub use fs::FsFrameSource;
pub use models::{ModelInfo, ModelStore, MODELS};
pub use server::{router, serve, ServerConfig};
