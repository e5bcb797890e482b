//! Observation sinks.
//!
//! The scheduler hands every scored sample to an [`ObservationSink`]. A UI
//! badge, a telemetry pipe, and a log file all plug in here.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use trustcall_common::error::{TrustcallError, TrustcallResult};
use trustcall_signal_model::observation::ScoredObservation;
use trustcall_signal_model::stream::{StreamHeader, StreamId};

/// Receiver of scored observations.
pub trait ObservationSink {
    /// Deliver one scored sample.
    fn emit(&mut self, observation: &ScoredObservation) -> TrustcallResult<()>;

    /// Show or hide a stream's output (disabled configuration hides it).
    fn set_visible(&mut self, _stream: &StreamId, _visible: bool) {}
}

/// Collects everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub observations: Vec<ScoredObservation>,
    pub visibility: Vec<(StreamId, bool)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations for one stream, in emission order.
    pub fn for_stream<'a>(
        &'a self,
        stream: &'a StreamId,
    ) -> impl Iterator<Item = &'a ScoredObservation> + 'a {
        self.observations
            .iter()
            .filter(move |o| &o.stream_id == stream)
    }
}

impl ObservationSink for MemorySink {
    fn emit(&mut self, observation: &ScoredObservation) -> TrustcallResult<()> {
        self.observations.push(observation.clone());
        Ok(())
    }

    fn set_visible(&mut self, stream: &StreamId, visible: bool) {
        self.visibility.push((stream.clone(), visible));
    }
}

/// Writes observations to a JSONL file in append-only mode.
pub struct JsonlObservationWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    lines_written: u64,
}

impl JsonlObservationWriter {
    /// Flush after this many observations.
    const FLUSH_EVERY: u64 = 100;

    /// Create a new writer, writing the header as the first line.
    pub fn new(path: impl AsRef<Path>, header: &StreamHeader) -> TrustcallResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        // Header line is prefixed with '#' so readers can skip it.
        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| TrustcallError::sink(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            lines_written: 0,
        })
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> TrustcallResult<()> {
        self.writer
            .flush()
            .map_err(|e| TrustcallError::sink(format!("Failed to flush observations: {e}")))?;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationSink for JsonlObservationWriter {
    fn emit(&mut self, observation: &ScoredObservation) -> TrustcallResult<()> {
        let json = serde_json::to_string(observation)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| TrustcallError::sink(format!("Failed to write observation: {e}")))?;
        self.lines_written += 1;

        if self.lines_written % Self::FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }
}

impl Drop for JsonlObservationWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Fans one observation out to several sinks.
#[derive(Default)]
pub struct TeeSink<'a> {
    sinks: Vec<&'a mut dyn ObservationSink>,
}

impl<'a> TeeSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: &'a mut dyn ObservationSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ObservationSink for TeeSink<'_> {
    /// Every sink receives the observation; the first failure is returned.
    fn emit(&mut self, observation: &ScoredObservation) -> TrustcallResult<()> {
        let mut first_err = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.emit(observation) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn set_visible(&mut self, stream: &StreamId, visible: bool) {
        for sink in self.sinks.iter_mut() {
            sink.set_visible(stream, visible);
        }
    }
}
