//! Progress bar adapter using indicatif.

use engage_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress reporting on stderr.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of frames, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show a bar; otherwise only dropped frames are reported
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = show_bar.then(|| {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });

        Self { bar, quiet }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started {
                source,
                index,
                total,
            } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(source);
                }
            }
            ProgressEvent::Completed { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::Dropped { source, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                    bar.suspend(|| eprintln!("WARN: Dropping {source}: {reason}"));
                } else {
                    eprintln!("WARN: Dropping {source}: {reason}");
                }
            }
            ProgressEvent::Finished { processed, dropped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {processed} processed, {dropped} dropped"
                    ));
                }
            }
        }
    }
}
