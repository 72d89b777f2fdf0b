use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Text encoding of the output files. No byte-order mark is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Ascii,
    Utf8,
    Utf16,
    Utf32,
}

/// Letter case used for random string generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterCase {
    Lower,
    Upper,
    Mixed,
}

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where output files are written.
    pub out_dir: PathBuf,
    /// Seed for the run's random source; identical seeds reproduce runs.
    pub seed: u64,
    /// Rows buffered in the output cache before a flush.
    pub flush_threshold: usize,
    /// Force an underlying I/O flush every this many written rows.
    pub sync_every: u64,
    /// Field terminator inserted between column values.
    pub field_terminator: String,
    /// Row terminator appended after each record.
    pub row_terminator: String,
    /// Output file extension, without the leading dot.
    pub file_extension: String,
    pub encoding: TextEncoding,
    pub letter_case: LetterCase,
    /// Consume value lists one-to-one by row ordinal while capacity
    /// allows, guaranteeing each entry is used at most once.
    pub unique_list_values: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            seed: 0,
            flush_threshold: 100_000,
            sync_every: 10_000,
            field_terminator: ",".to_string(),
            row_terminator: "\r\n".to_string(),
            file_extension: "csv".to_string(),
            encoding: TextEncoding::Utf8,
            letter_case: LetterCase::Mixed,
            unique_list_values: true,
        }
    }
}

#[derive(Debug, Default)]
struct ProgressInner {
    set_values_built: AtomicU64,
    rows_generated: AtomicU64,
    files_opened: AtomicU64,
}

/// Liveness counters for long-running steps.
///
/// There is no cancellation contract; callers poll these from another
/// thread to observe progress while a run blocks.
#[derive(Debug, Clone, Default)]
pub struct Progress(Arc<ProgressInner>);

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_values_built(&self) -> u64 {
        self.0.set_values_built.load(Ordering::Relaxed)
    }

    pub fn rows_generated(&self) -> u64 {
        self.0.rows_generated.load(Ordering::Relaxed)
    }

    pub fn files_opened(&self) -> u64 {
        self.0.files_opened.load(Ordering::Relaxed)
    }

    pub(crate) fn record_set_value(&self) {
        self.0.set_values_built.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_row(&self) {
        self.0.rows_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_file(&self) {
        self.0.files_opened.fetch_add(1, Ordering::Relaxed);
    }
}

/// Report for a completed generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub table: String,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub files_written: u32,
    pub cache_flushes: u64,
    /// Second-pass cells left unresolved; the run continued.
    pub resolution_errors: u64,
    /// Columns whose selectivity set was built in relaxed mode.
    pub relaxed_columns: Vec<String>,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(table: String, rows_requested: u64) -> Self {
        Self {
            table,
            rows_requested,
            rows_generated: 0,
            files_written: 0,
            cache_flushes: 0,
            resolution_errors: 0,
            relaxed_columns: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }
}
