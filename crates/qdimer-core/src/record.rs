//! The append-only results log.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, LineWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::histogram::{BitOrder, OutcomeHistogram};
use crate::state::StateVariant;

/// One row of the results log: a single state measured for one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Backend the circuit ran on.
    pub backend: String,
    /// Whether the noise parameter set was used.
    pub noise: bool,
    /// Whether the decoherence parameter set was used.
    pub decoherence: bool,
    /// Shots requested (and received).
    pub shots: u64,
    /// Initial state.
    pub state: StateVariant,
    /// Measured outcomes.
    pub histogram: OutcomeHistogram,
}

impl RunRecord {
    /// Render the record as a log row with buckets in `order`.
    pub fn to_row(&self, order: BitOrder) -> String {
        let [a, b, c, d] = self.histogram.ordered(order);
        format!(
            "{}, {}, {}, {}, {}, {a}, {b}, {c}, {d}",
            self.backend, self.noise, self.decoherence, self.shots, self.state
        )
    }
}

/// Header line for a log with buckets in `order`.
pub fn header(order: BitOrder) -> String {
    let [a, b, c, d] = order.labels();
    format!("backend, noise, decoherence, shots, state, {a}, {b}, {c}, {d}")
}

/// Comma-separated results file opened for appending.
///
/// The header is written only when the file starts out empty. An existing
/// file must carry the header for the same bucket order. Every row is
/// flushed as soon as it is written.
#[derive(Debug)]
pub struct CsvLog {
    path: PathBuf,
    writer: LineWriter<File>,
    order: BitOrder,
    rows_written: usize,
}

impl CsvLog {
    /// Open (or create) the log at `path`.
    pub fn open(path: impl AsRef<Path>, order: BitOrder) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let is_empty = file.metadata()?.len() == 0;

        let expected = header(order);
        if !is_empty {
            let mut found = String::new();
            BufReader::new(File::open(&path)?).read_line(&mut found)?;
            let found = found.trim_end_matches(['\r', '\n']);
            if found != expected {
                return Err(CoreError::LogHeaderMismatch {
                    path: path.display().to_string(),
                    found: found.to_string(),
                    expected,
                });
            }
        }

        let mut writer = LineWriter::new(file);
        if is_empty {
            writeln!(writer, "{expected}")?;
            writer.flush()?;
        }

        Ok(Self {
            path,
            writer,
            order,
            rows_written: 0,
        })
    }

    /// Append one record.
    pub fn append(&mut self, record: &RunRecord) -> CoreResult<()> {
        writeln!(self.writer, "{}", record.to_row(self.order))?;
        self.writer.flush()?;
        self.rows_written += 1;
        info!(
            path = %self.path.display(),
            state = %record.state,
            shots = record.shots,
            "recorded"
        );
        Ok(())
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bucket order of this log.
    pub fn order(&self) -> BitOrder {
        self.order
    }

    /// Rows appended through this handle.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}
