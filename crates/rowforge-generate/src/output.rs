//! Bounded output cache and rolling file writer.
//!
//! Rows accumulate in a bounded buffer and are flushed to the active
//! output file as delimited text. When a file's row quota is reached the
//! writer rolls to the next file between rows; a row is never split
//! across files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use rowforge_core::TableSchema;

use crate::errors::GenerationError;
use crate::model::{GenerateOptions, Progress, TextEncoding};

/// Counters returned by the terminal flush.
#[derive(Debug, Clone, Copy)]
pub struct OutputStats {
    pub files_written: u32,
    pub cache_flushes: u64,
    pub bytes_written: u64,
}

pub struct OutputCache {
    header: Option<String>,
    field_terminator: String,
    row_terminator: String,
    encoding: TextEncoding,
    out_dir: PathBuf,
    file_stem: String,
    extension: String,
    rows_per_file: u64,
    total_rows: u64,
    total_files: u32,
    flush_threshold: usize,
    sync_every: u64,
    progress: Progress,
    buffer: Vec<Vec<String>>,
    writer: Option<BufWriter<File>>,
    files_opened: u32,
    rows_in_file: u64,
    rows_written: u64,
    flushes: u64,
    bytes_written: u64,
}

impl OutputCache {
    pub fn new(schema: &TableSchema, options: &GenerateOptions, progress: Progress) -> Self {
        let header = schema.print_column_names.then(|| {
            schema
                .columns
                .iter()
                .map(|column| column.name.as_str())
                .collect::<Vec<_>>()
                .join(&options.field_terminator)
        });

        Self {
            header,
            field_terminator: options.field_terminator.clone(),
            row_terminator: options.row_terminator.clone(),
            encoding: options.encoding,
            out_dir: options.out_dir.clone(),
            file_stem: schema.name.clone(),
            extension: options.file_extension.clone(),
            rows_per_file: schema.rows_per_file(),
            total_rows: schema.rows,
            total_files: schema.files,
            flush_threshold: options.flush_threshold.max(1),
            sync_every: options.sync_every.max(1),
            progress,
            buffer: Vec::with_capacity(options.flush_threshold.max(1)),
            writer: None,
            files_opened: 0,
            rows_in_file: 0,
            rows_written: 0,
            flushes: 0,
            bytes_written: 0,
        }
    }

    /// Buffer one resolved row, flushing first the moment the cache is
    /// full so the threshold is never exceeded.
    pub fn append(&mut self, row: Vec<String>) -> Result<(), GenerationError> {
        self.buffer.push(row);
        if self.buffer.len() >= self.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Serialize and write every buffered row, rolling files between rows
    /// as quotas fill.
    pub fn flush(&mut self) -> Result<(), GenerationError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.flushes += 1;

        let rows = std::mem::take(&mut self.buffer);
        for row in &rows {
            if self.writer.is_none() {
                self.open_next_file()?;
            }
            let line = format!("{}{}", row.join(&self.field_terminator), self.row_terminator);
            self.write_text(&line)?;

            self.rows_written += 1;
            self.rows_in_file += 1;

            if self.rows_written % self.sync_every == 0
                && let Some(writer) = self.writer.as_mut()
            {
                writer.flush()?;
            }

            // Rollover between rows: the last file absorbs the remainder.
            if self.rows_in_file >= self.rows_per_file
                && self.files_opened < self.total_files
                && self.rows_written < self.total_rows
            {
                self.close_current_file()?;
            }
        }

        debug!(
            rows_written = self.rows_written,
            flushes = self.flushes,
            "output cache flushed"
        );
        Ok(())
    }

    /// Terminal flush: drain the buffer, close the active file, report
    /// totals.
    pub fn finish(mut self) -> Result<OutputStats, GenerationError> {
        self.flush()?;
        self.close_current_file()?;
        Ok(OutputStats {
            files_written: self.files_opened,
            cache_flushes: self.flushes,
            bytes_written: self.bytes_written,
        })
    }

    fn open_next_file(&mut self) -> Result<(), GenerationError> {
        let path = self.next_file_path();
        let file = File::create(&path)?;
        self.writer = Some(BufWriter::new(file));
        self.files_opened += 1;
        self.rows_in_file = 0;
        self.progress.record_file();
        info!(file = %path.display(), "output file opened");

        if let Some(header) = self.header.clone() {
            let line = format!("{}{}", header, self.row_terminator);
            self.write_text(&line)?;
        }
        Ok(())
    }

    fn close_current_file(&mut self) -> Result<(), GenerationError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn next_file_path(&self) -> PathBuf {
        let name = if self.total_files == 1 {
            format!("{}.{}", self.file_stem, self.extension)
        } else {
            format!("{}_{}.{}", self.file_stem, self.files_opened + 1, self.extension)
        };
        self.out_dir.join(name)
    }

    fn write_text(&mut self, text: &str) -> Result<(), GenerationError> {
        let bytes = encode(text, self.encoding);
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(&bytes)?;
            self.bytes_written += bytes.len() as u64;
        }
        Ok(())
    }
}

/// Encode a chunk of output text. No byte-order mark is emitted for any
/// encoding; UTF-16 and UTF-32 are little-endian.
fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Ascii => text
            .chars()
            .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
            .collect(),
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Utf16 => text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect(),
        TextEncoding::Utf32 => text
            .chars()
            .flat_map(|ch| (ch as u32).to_le_bytes())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_replaces_non_ascii_characters() {
        assert_eq!(encode("a\u{e9}b", TextEncoding::Ascii), b"a?b".to_vec());
    }

    #[test]
    fn utf16_is_little_endian_without_bom() {
        assert_eq!(
            encode("AB", TextEncoding::Utf16),
            vec![0x41, 0x00, 0x42, 0x00]
        );
    }

    #[test]
    fn utf32_is_little_endian_without_bom() {
        assert_eq!(
            encode("A", TextEncoding::Utf32),
            vec![0x41, 0x00, 0x00, 0x00]
        );
    }
}
