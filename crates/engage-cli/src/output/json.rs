//! JSON output adapter.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use engage_core::{FrameReport, ResultOutput};

/// JSON Lines output adapter.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn writer(&self) -> Result<MutexGuard<'_, Box<dyn Write + Send>>> {
        self.writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))
    }

    /// Writes a batch of reports as a JSON array.
    pub fn write_array(&self, reports: &[FrameReport], pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(reports)?
        } else {
            serde_json::to_string(reports)?
        };
        writeln!(self.writer()?, "{json}")?;
        Ok(())
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, report: &FrameReport) -> Result<()> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer()?, "{json}")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer()?.flush()?;
        Ok(())
    }
}
