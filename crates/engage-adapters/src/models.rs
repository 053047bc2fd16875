//! Model weight registry, download and cache.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Checksum value meaning "not pinned yet, skip verification".
const UNPINNED: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A downloadable weights file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Registry name.
    pub name: &'static str,
    /// What the model is used for.
    pub purpose: &'static str,
    /// Release asset URL.
    pub url: &'static str,
    /// Expected SHA-256, lowercase hex.
    pub sha256: &'static str,
    /// File name inside the models directory.
    pub filename: &'static str,
}

/// Known models.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "blazeface",
        purpose: "face detection",
        url: "https://github.com/engage-monitor/engage/releases/download/models-v1/blazeface.safetensors",
        sha256: UNPINNED,
        filename: "blazeface.safetensors",
    },
    ModelInfo {
        name: "emotion",
        purpose: "expression classification",
        url: "https://github.com/engage-monitor/engage/releases/download/models-v1/emotion_cnn.safetensors",
        sha256: UNPINNED,
        filename: "emotion_cnn.safetensors",
    },
    ModelInfo {
        name: "hands",
        purpose: "hand landmarks",
        url: "https://github.com/engage-monitor/engage/releases/download/models-v1/hand_landmarks.safetensors",
        sha256: UNPINNED,
        filename: "hand_landmarks.safetensors",
    },
];

/// Looks up a model by registry name.
#[must_use]
pub fn find_model(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// Install state of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub model: &'static ModelInfo,
    pub path: PathBuf,
    pub installed: bool,
}

/// Progress callback for downloads: `(model name, bytes)`.
pub type ProgressCallback<'a> = &'a dyn Fn(&str, u64);

/// A directory holding model weights.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at the platform data directory: `$XDG_DATA_HOME/engage/models`
    /// or `~/.local/share/engage/models`.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("engage")
                .join("models"),
        )
    }

    /// Store at `dir` if given, else the default location.
    #[must_use]
    pub fn from_override(dir: Option<PathBuf>) -> Self {
        dir.map_or_else(Self::default_location, Self::new)
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `name`'s weights live, whether or not they are installed.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        find_model(name).map(|m| self.dir.join(m.filename))
    }

    /// Path to `name`'s weights if the file exists.
    #[must_use]
    pub fn installed_path(&self, name: &str) -> Option<PathBuf> {
        self.path(name).filter(|p| p.is_file())
    }

    /// Install state of every known model.
    #[must_use]
    pub fn list(&self) -> Vec<ModelStatus> {
        MODELS
            .iter()
            .map(|model| {
                let path = self.dir.join(model.filename);
                ModelStatus {
                    model,
                    installed: path.is_file(),
                    path,
                }
            })
            .collect()
    }

    /// Downloads every model that is missing, or all of them with `force`.
    ///
    /// Returns the names of the models that were downloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, a download fails,
    /// or a checksum does not match.
    pub fn fetch_all(&self, force: bool, progress: Option<ProgressCallback<'_>>) -> Result<Vec<&'static str>> {
        let mut fetched = Vec::new();
        for model in MODELS {
            if self.fetch(model, force, progress)? {
                fetched.push(model.name);
            }
        }
        Ok(fetched)
    }

    /// Downloads one model. Returns false if it was already installed.
    ///
    /// # Errors
    ///
    /// See [`ModelStore::fetch_all`].
    pub fn fetch(&self, model: &ModelInfo, force: bool, progress: Option<ProgressCallback<'_>>) -> Result<bool> {
        let target = self.dir.join(model.filename);
        if target.is_file() && !force {
            debug!("{} already installed at {}", model.name, target.display());
            return Ok(false);
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        info!("downloading {} from {}", model.name, model.url);
        let response = reqwest::blocking::get(model.url)
            .with_context(|| format!("failed to download {}", model.name))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("download of {} failed: HTTP {status}", model.name);
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read {} download", model.name))?;
        if let Some(report) = progress {
            report(model.name, bytes.len() as u64);
        }

        verify_checksum(model, &bytes)?;

        // Write next to the target and rename so a partial file is never picked up.
        let partial = target.with_extension("part");
        fs::write(&partial, &bytes)
            .with_context(|| format!("failed to write {}", partial.display()))?;
        fs::rename(&partial, &target)
            .with_context(|| format!("failed to move weights into {}", target.display()))?;

        info!("installed {} ({} bytes)", model.name, bytes.len());
        Ok(true)
    }
}

/// Checks `bytes` against the model's pinned SHA-256.
///
/// # Errors
///
/// Returns an error on mismatch.
pub fn verify_checksum(model: &ModelInfo, bytes: &[u8]) -> Result<()> {
    if model.sha256 == UNPINNED {
        debug!("no pinned checksum for {}", model.name);
        return Ok(());
    }
    let actual = format!("{:x}", Sha256::digest(bytes));
    if !actual.eq_ignore_ascii_case(model.sha256) {
        anyhow::bail!(
            "checksum mismatch for {}: expected {}, got {actual}",
            model.name,
            model.sha256
        );
    }
    Ok(())
}
