//! Analyze command - run the frame pipeline over image files.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use engage_adapters::FsFrameSource;
use engage_core::{
    FramePipeline, FrameReport, FrameSource, ProgressEvent, ProgressSink, ResultOutput,
};
use tracing::{debug, info, warn};

use super::pipeline::ModelArgs;
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Arguments for the analyze command.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Image files or directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub models: ModelArgs,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: AppConfig,
}

impl AnalyzeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| OutputFormat::from_str(s, true).ok());
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args.models = args.models.with_config(config);
        args.config = config.clone();
        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Result of running the analyze command.
#[derive(Debug)]
pub struct AnalyzeSummary {
    /// Frames that produced a result.
    pub processed: usize,
    /// Frames dropped.
    pub dropped: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the analyze command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &AnalyzeArgs) -> Result<AnalyzeSummary> {
    info!("Running analyze command on {} paths", args.paths.len());

    let pipeline = args.models.build_pipeline(&args.config)?;
    let source = FsFrameSource::new(args.paths.clone(), args.recursive);

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(
        source.count_hint().map(|t| t as u64),
        args.quiet,
        show_progress,
    );
    let output = JsonOutput::stdout();

    let format = args.format();
    let batch = process_frames(
        &source,
        &pipeline,
        &output,
        &progress,
        format == OutputFormat::Jsonl,
    )?;

    if format == OutputFormat::Json {
        output.write_array(&batch.reports, args.pretty)?;
        output.flush()?;
    }

    Ok(batch.summary())
}

/// What [`process_frames`] did.
#[derive(Debug, Default)]
pub struct Batch {
    pub processed: usize,
    pub dropped: usize,
    /// Reports held back for array output; empty when streaming.
    pub reports: Vec<FrameReport>,
}

impl Batch {
    fn summary(&self) -> AnalyzeSummary {
        AnalyzeSummary {
            processed: self.processed,
            dropped: self.dropped,
            exit_code: if self.dropped > 0 {
                ExitCode::FramesDropped
            } else {
                ExitCode::Success
            },
        }
    }
}

/// Runs every frame of `source` through `pipeline`.
///
/// With `stream` set each report goes to `output` as soon as it exists;
/// otherwise reports are collected in the returned [`Batch`]. Frames that
/// fail to load or to process are dropped and reported to `progress`.
///
/// # Errors
///
/// Returns an error only if writing to `output` fails.
pub fn process_frames(
    source: &dyn FrameSource,
    pipeline: &FramePipeline,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
    stream: bool,
) -> Result<Batch> {
    let total = source.count_hint();
    let mut batch = Batch::default();

    for (index, item) in source.frames().enumerate() {
        let frame = match item {
            Ok(frame) => frame,
            Err(e) => {
                // The load error names the file.
                progress.on_event(ProgressEvent::Dropped {
                    source: format!("frame {index}"),
                    reason: format!("{e:#}"),
                });
                batch.dropped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            source: frame.source.clone(),
            index,
            total,
        });

        let result = match pipeline.process(&frame) {
            Ok(result) => result,
            Err(e) => {
                warn!(source = %frame.source, "dropping frame: {e}");
                progress.on_event(ProgressEvent::Dropped {
                    source: frame.source,
                    reason: e.to_string(),
                });
                batch.dropped += 1;
                continue;
            }
        };

        debug!(source = %frame.source, faces = result.face_count, "frame analyzed");
        let report = FrameReport {
            source: frame.source,
            result,
        };
        progress.on_event(ProgressEvent::Completed {
            report: report.clone(),
        });

        if stream {
            output.write(&report)?;
        } else {
            batch.reports.push(report);
        }
        batch.processed += 1;
    }

    if stream {
        output.flush()?;
    }

    progress.on_event(ProgressEvent::Finished {
        processed: batch.processed,
        dropped: batch.dropped,
    });

    Ok(batch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::sync::Arc;

    use engage_core::EmotionLabel;
    use engage_test_support::{
        FaceBuilder, HandBuilder, MockEmotionClassifier, MockFrameSource, MockLandmarkProvider,
        MockProgressSink, MockResultOutput, SyntheticFrameBuilder,
    };

    use super::*;

    fn pipeline(provider: MockLandmarkProvider, label: EmotionLabel) -> FramePipeline {
        FramePipeline::new(
            Arc::new(provider),
            Arc::new(MockEmotionClassifier::returning(label)),
        )
    }

    fn frames(n: usize) -> MockFrameSource {
        MockFrameSource::new(
            (0..n)
                .map(|i| SyntheticFrameBuilder::blank(&format!("f{i}.png"), 64, 64))
                .collect(),
        )
    }

    #[test]
    fn test_streams_every_frame() {
        let p = pipeline(
            MockLandmarkProvider::new(
                vec![FaceBuilder::frontal().build()],
                vec![HandBuilder::at(0.5, 0.58).build()],
            ),
            EmotionLabel::Happy,
        );
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let batch = process_frames(&frames(3), &p, &output, &progress, true).unwrap();

        assert_eq!(batch.processed, 3);
        assert_eq!(batch.dropped, 0);
        assert!(batch.reports.is_empty());
        let reports = output.reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].source, "f0.png");
        assert_eq!(reports[2].result.emotions.happy, 1.0);
        assert!(reports[2].result.emotions.thinking > 0.0);
        assert_eq!(output.flush_count(), 1);
        assert_eq!(progress.completed_count(), 3);
        assert_eq!(progress.finished_counts(), Some((3, 0)));
        assert_eq!(batch.summary().exit_code, ExitCode::Success);
    }

    #[test]
    fn test_collects_when_not_streaming() {
        let p = pipeline(MockLandmarkProvider::empty(), EmotionLabel::Sad);
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let batch = process_frames(&frames(2), &p, &output, &progress, false).unwrap();

        assert!(output.reports().is_empty());
        assert_eq!(batch.reports.len(), 2);
        assert_eq!(batch.reports[1].result.face_count, 0);
        assert_eq!(batch.reports[1].result.emotions.neutral, 1.0);
    }

    #[test]
    fn test_load_failure_is_dropped() {
        let p = pipeline(MockLandmarkProvider::empty(), EmotionLabel::Neutral);
        let source = frames(1).with_failure("failed to open broken.png");
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let batch = process_frames(&source, &p, &output, &progress, true).unwrap();

        assert_eq!(batch.processed, 1);
        assert_eq!(batch.dropped, 1);
        assert_eq!(progress.dropped_count(), 1);
        assert_eq!(progress.finished_counts(), Some((1, 1)));
        assert_eq!(batch.summary().exit_code, ExitCode::FramesDropped);
    }

    #[test]
    fn test_detection_failure_is_dropped() {
        let p = pipeline(MockLandmarkProvider::failing("gpu lost"), EmotionLabel::Neutral);
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let batch = process_frames(&frames(2), &p, &output, &progress, true).unwrap();

        assert_eq!(batch.processed, 0);
        assert_eq!(batch.dropped, 2);
        assert!(output.reports().is_empty());
        let reasons: Vec<_> = progress
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Dropped { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        assert!(reasons.iter().all(|r| r.contains("gpu lost")));
    }

    #[test]
    fn test_malformed_face_is_dropped() {
        let p = pipeline(
            MockLandmarkProvider::new(vec![FaceBuilder::frontal().truncated(100).build()], vec![]),
            EmotionLabel::Neutral,
        );
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let batch = process_frames(&frames(1), &p, &output, &progress, true).unwrap();
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn test_with_config_format() {
        let config: AppConfig = toml::from_str(
            r"
[general]
recursive = true

[output]
format = 'json'
pretty = true
",
        )
        .unwrap();
        let args = AnalyzeArgs {
            paths: vec![PathBuf::from(".")],
            recursive: false,
            progress: false,
            quiet: true,
            format: None,
            pretty: false,
            models: ModelArgs::default(),
            config: AppConfig::default(),
        };
        let args = AnalyzeArgs::with_config(args, &config);
        assert!(args.recursive);
        assert!(args.pretty);
        assert_eq!(args.format(), OutputFormat::Json);
    }

    #[test]
    fn test_cli_format_wins() {
        let config: AppConfig = toml::from_str("[output]\nformat = 'json'\n").unwrap();
        let args = AnalyzeArgs {
            paths: vec![PathBuf::from(".")],
            recursive: false,
            progress: false,
            quiet: true,
            format: Some(OutputFormat::Jsonl),
            pretty: false,
            models: ModelArgs::default(),
            config: AppConfig::default(),
        };
        assert_eq!(
            AnalyzeArgs::with_config(args, &config).format(),
            OutputFormat::Jsonl
        );
    }
}
