//! Filesystem frame source for offline analysis.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engage_core::{FrameInput, FrameSource};
use tracing::{debug, warn};

/// Extensions read as still frames.
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// Reads image files as frames, in path order.
pub struct FsFrameSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsFrameSource {
    /// Creates a source over files and directories.
    ///
    /// Directories contribute their image files; subdirectories only when
    /// `recursive` is set.
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Every frame file the source will yield.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in &self.paths {
            if path.is_dir() {
                let mut found = Vec::new();
                self.walk(path, &mut found);
                found.sort();
                files.extend(found);
            } else if path.is_file() {
                if is_frame_file(path) {
                    files.push(path.clone());
                } else {
                    warn!("skipping unsupported file {}", path.display());
                }
            } else {
                warn!("no such file or directory: {}", path.display());
            }
        }
        files
    }

    fn walk(&self, dir: &Path, out: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read directory {}: {e}", dir.display());
                return;
            }
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                if self.recursive {
                    self.walk(&path, out);
                }
            } else if is_frame_file(&path) {
                out.push(path);
            }
        }
    }
}

impl FrameSource for FsFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = Result<FrameInput>> + Send + '_> {
        let files = self.files();
        debug!("{} frame files", files.len());
        Box::new(files.into_iter().map(|path| load_frame(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.files().len())
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

fn load_frame(path: &Path) -> Result<FrameInput> {
    let image = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(FrameInput::new(path.to_string_lossy(), image))
}
