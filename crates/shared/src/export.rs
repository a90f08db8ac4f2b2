//! CSV encoding helpers for streamed exports.
//!
//! Each streamed chunk is encoded by one `ChunkWriter`, so a batch of rows
//! shares a single `csv::Writer` and buffer.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Content type sent with every CSV export.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Error type for CSV encoding.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("Failed to encode CSV row: {0}")]
    Encode(#[from] csv::Error),
    #[error("Failed to flush CSV row: {0}")]
    Flush(String),
}

/// Encodes rows into one in-memory chunk.
///
/// Rows end with `\n`. A field is wrapped in double quotes only when it
/// contains a comma, a double quote, CR or LF; embedded quotes are doubled.
pub struct ChunkWriter {
    writer: csv::Writer<Vec<u8>>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        Self { writer }
    }

    pub fn write_row<I, T>(&mut self, fields: I) -> Result<(), CsvError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(fields)?;
        Ok(())
    }

    /// Flush and return the encoded bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>, CsvError> {
        self.writer
            .into_inner()
            .map_err(|e| CsvError::Flush(e.error().to_string()))
    }
}

impl Default for ChunkWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the suggested download filename: `<resource>_<YYYY-MM-DD>_<HH-mm-ss>.csv`.
pub fn export_filename(resource: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.csv", resource, now.format("%Y-%m-%d_%H-%M-%S"))
}
