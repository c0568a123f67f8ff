//! Result export
//!
//! CSV for the result table (one "Detected Text" column) and a
//! pretty-printed JSON dump of the full run report for diagnostics.
//!
//! CSV output is UTF-8 with a byte-order mark; spreadsheet tools key off
//! the BOM to render Bengali script correctly.

use std::path::Path;

use crate::error::PipelineError;
use crate::pipeline::PipelineReport;

/// UTF-8 byte-order mark
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// CSV column header
const CSV_HEADER: &str = "Detected Text";

/// Render collected texts as BOM-prefixed CSV bytes
///
/// # Errors
///
/// Returns `PipelineError::Csv` if a record cannot be written.
pub fn csv_bytes(texts: &[String]) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::with_capacity(UTF8_BOM.len() + texts.len() * 16);
    buf.extend_from_slice(UTF8_BOM);

    let mut writer = csv::Writer::from_writer(buf);
    writer.write_record([CSV_HEADER])?;
    for text in texts {
        writer.write_record([text])?;
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

/// Write collected texts to a CSV file
pub fn write_csv(path: &Path, texts: &[String]) -> Result<(), PipelineError> {
    std::fs::write(path, csv_bytes(texts)?)?;
    Ok(())
}

/// Write the full run report as pretty-printed JSON
pub fn write_json_report(path: &Path, report: &PipelineReport) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
