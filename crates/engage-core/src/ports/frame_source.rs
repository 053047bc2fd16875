//! Frame source port for offline analysis.

use crate::domain::FrameInput;

/// Port for reading frames from a finite source.
pub trait FrameSource: Send + Sync {
    /// Returns an iterator over frames from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a frame fails to load.
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<FrameInput>> + Send + '_>;

    /// Returns the total number of frames, if known.
    fn count_hint(&self) -> Option<usize>;
}
