//! Progress reporting port for UI integration.

use crate::domain::FrameReport;

/// Events emitted while a batch of frames is analyzed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Analysis started for a frame.
    Started {
        /// Frame source.
        source: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total frames in batch, if known.
        total: Option<usize>,
    },
    /// A frame produced a result.
    Completed {
        /// The frame's report.
        report: FrameReport,
    },
    /// A frame was dropped without a result.
    Dropped {
        /// Frame source.
        source: String,
        /// Why the frame was dropped.
        reason: String,
    },
    /// All frames have been processed.
    Finished {
        /// Frames that produced a result.
        processed: usize,
        /// Frames dropped.
        dropped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
