//! Configuration file support for engage.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/engage/config.toml` (lowest priority)
//! - Project-local: `.engage.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use engage_core::{GestureConfig, HeadPoseConfig};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// WebSocket server settings.
    pub server: ServerSection,
    /// Head-pose thresholds.
    pub head_pose: HeadPoseSection,
    /// Gesture thresholds.
    pub gesture: GestureSection,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Server configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Send alert events.
    pub alerts: Option<bool>,
}

/// Head-pose configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct HeadPoseSection {
    pub horizontal_threshold: Option<f32>,
    pub cheek_threshold: Option<f32>,
    pub cheek_weight: Option<f32>,
    pub vertical_ratio: Option<f32>,
}

/// Gesture configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GestureSection {
    pub mouth_radius: Option<f32>,
    pub mouth_rise: Option<f32>,
    pub forehead_radius: Option<f32>,
    pub forehead_below: Option<f32>,
    pub forehead_above: Option<f32>,
    pub increment: Option<f32>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
    /// Enable/disable face detection.
    pub face: Option<bool>,
    /// Enable/disable emotion classification.
    pub emotion: Option<bool>,
    /// Enable/disable hand landmarks.
    pub hands: Option<bool>,
    /// Minimum face detection score.
    pub min_face_confidence: Option<f32>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/engage/config.toml`
    /// 2. Project-local: `.engage.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Head-pose thresholds with defaults filled in.
    pub fn head_pose_config(&self) -> HeadPoseConfig {
        let d = HeadPoseConfig::default();
        let s = &self.head_pose;
        HeadPoseConfig {
            horizontal_threshold: s.horizontal_threshold.unwrap_or(d.horizontal_threshold),
            cheek_threshold: s.cheek_threshold.unwrap_or(d.cheek_threshold),
            cheek_weight: s.cheek_weight.unwrap_or(d.cheek_weight),
            vertical_ratio: s.vertical_ratio.unwrap_or(d.vertical_ratio),
        }
    }

    /// Gesture thresholds with defaults filled in.
    pub fn gesture_config(&self) -> GestureConfig {
        let d = GestureConfig::default();
        let s = &self.gesture;
        GestureConfig {
            mouth_radius: s.mouth_radius.unwrap_or(d.mouth_radius),
            mouth_rise: s.mouth_rise.unwrap_or(d.mouth_rise),
            forehead_radius: s.forehead_radius.unwrap_or(d.forehead_radius),
            forehead_below: s.forehead_below.unwrap_or(d.forehead_below),
            forehead_above: s.forehead_above.unwrap_or(d.forehead_above),
            increment: s.increment.unwrap_or(d.increment),
        }
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        let unit = [
            ("head_pose.horizontal_threshold", self.head_pose.horizontal_threshold),
            ("head_pose.cheek_threshold", self.head_pose.cheek_threshold),
            ("head_pose.cheek_weight", self.head_pose.cheek_weight),
            ("head_pose.vertical_ratio", self.head_pose.vertical_ratio),
            ("gesture.mouth_radius", self.gesture.mouth_radius),
            ("gesture.mouth_rise", self.gesture.mouth_rise),
            ("gesture.forehead_radius", self.gesture.forehead_radius),
            ("gesture.forehead_below", self.gesture.forehead_below),
            ("gesture.forehead_above", self.gesture.forehead_above),
            ("gesture.increment", self.gesture.increment),
            ("models.min_face_confidence", self.models.min_face_confidence),
        ];
        for (key, value) in unit {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("{key} must be 0.0-1.0, got {v}"));
                }
            }
        }

        if self.server.port == Some(0) {
            return Err("server.port must not be 0".to_string());
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Server
        self.server.host = other.server.host.or_else(|| self.server.host.take());
        self.server.port = other.server.port.or(self.server.port);
        self.server.alerts = other.server.alerts.or(self.server.alerts);

        // Head pose
        let (hp, o) = (&mut self.head_pose, other.head_pose);
        hp.horizontal_threshold = o.horizontal_threshold.or(hp.horizontal_threshold);
        hp.cheek_threshold = o.cheek_threshold.or(hp.cheek_threshold);
        hp.cheek_weight = o.cheek_weight.or(hp.cheek_weight);
        hp.vertical_ratio = o.vertical_ratio.or(hp.vertical_ratio);

        // Gesture
        let (g, o) = (&mut self.gesture, other.gesture);
        g.mouth_radius = o.mouth_radius.or(g.mouth_radius);
        g.mouth_rise = o.mouth_rise.or(g.mouth_rise);
        g.forehead_radius = o.forehead_radius.or(g.forehead_radius);
        g.forehead_below = o.forehead_below.or(g.forehead_below);
        g.forehead_above = o.forehead_above.or(g.forehead_above);
        g.increment = o.increment.or(g.increment);

        // Models
        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());
        self.models.face = other.models.face.or(self.models.face);
        self.models.emotion = other.models.emotion.or(self.models.emotion);
        self.models.hands = other.models.hands.or(self.models.hands);
        self.models.min_face_confidence = other
            .models
            .min_face_confidence
            .or(self.models.min_face_confidence);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("engage").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.engage.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".engage.toml"))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
