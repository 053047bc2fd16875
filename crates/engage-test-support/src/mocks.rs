//! Mock implementations of core port traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use engage_core::{
    EmotionClassifier, EmotionLabel, FrameInput, FrameReport, FrameSource, LandmarkProvider,
    LandmarkSet, ProgressEvent, ProgressSink, ResultOutput,
};

/// Mock landmark provider returning fixed landmark sets.
///
/// Counts calls so tests can check that each frame triggers exactly one
/// face and one hand detection.
pub struct MockLandmarkProvider {
    faces: Vec<LandmarkSet>,
    hands: Vec<LandmarkSet>,
    failure: Option<String>,
    face_calls: AtomicUsize,
    hand_calls: AtomicUsize,
}

impl MockLandmarkProvider {
    /// A provider that always returns `faces` and `hands`.
    #[must_use]
    pub const fn new(faces: Vec<LandmarkSet>, hands: Vec<LandmarkSet>) -> Self {
        Self {
            faces,
            hands,
            failure: None,
            face_calls: AtomicUsize::new(0),
            hand_calls: AtomicUsize::new(0),
        }
    }

    /// A provider that finds nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// A provider whose face detection always fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::empty()
        }
    }

    /// Number of `detect_faces` calls.
    #[must_use]
    pub fn face_calls(&self) -> usize {
        self.face_calls.load(Ordering::SeqCst)
    }

    /// Number of `detect_hands` calls.
    #[must_use]
    pub fn hand_calls(&self) -> usize {
        self.hand_calls.load(Ordering::SeqCst)
    }
}

impl LandmarkProvider for MockLandmarkProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn detect_faces(&self, _image: &image::DynamicImage) -> anyhow::Result<Vec<LandmarkSet>> {
        self.face_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        Ok(self.faces.clone())
    }

    fn detect_hands(&self, _image: &image::DynamicImage) -> anyhow::Result<Vec<LandmarkSet>> {
        self.hand_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hands.clone())
    }
}

/// Mock emotion classifier with a fixed outcome.
pub struct MockEmotionClassifier {
    outcome: Result<EmotionLabel, String>,
    calls: AtomicUsize,
}

impl MockEmotionClassifier {
    /// Always classifies as `label`.
    #[must_use]
    pub const fn returning(label: EmotionLabel) -> Self {
        Self {
            outcome: Ok(label),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `classify` calls.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmotionClassifier for MockEmotionClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn classify(&self, _image: &image::DynamicImage) -> anyhow::Result<EmotionLabel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Mock frame source yielding prepared frames and load failures.
pub struct MockFrameSource {
    frames: Vec<Result<FrameInput, String>>,
}

impl MockFrameSource {
    /// A source over `frames`.
    #[must_use]
    pub fn new(frames: Vec<FrameInput>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
        }
    }

    /// Appends an item that fails to load with `message`.
    #[must_use]
    pub fn with_failure(mut self, message: &str) -> Self {
        self.frames.push(Err(message.to_string()));
        self
    }
}

impl FrameSource for MockFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<FrameInput>> + Send + '_> {
        Box::new(
            self.frames
                .iter()
                .map(|f| f.clone().map_err(|e| anyhow::anyhow!(e))),
        )
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}

/// Mock result output capturing reports.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<FrameReport>>>,
    flush_count: AtomicUsize,
}

impl MockResultOutput {
    /// Creates an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: AtomicUsize::new(0),
        }
    }

    /// All reports written so far.
    #[must_use]
    pub fn reports(&self) -> Vec<FrameReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `flush()` calls.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flush_count.load(Ordering::SeqCst)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &FrameReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.flush_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock progress sink capturing events.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Number of `Dropped` events.
    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Dropped { .. }))
            .count()
    }

    /// `(processed, dropped)` from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, dropped } => Some((*processed, *dropped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
