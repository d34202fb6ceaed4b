//! CSV export of decoded history records
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::export::fields::{Column, COLUMNS};
use crate::models::DecodedRecord;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { records: usize, columns: usize },
    NoValidRecords,
}

/// Columns with at least one non-empty value across `records`, in export order
pub fn non_empty_columns(records: &[&DecodedRecord]) -> Vec<Column> {
    COLUMNS
        .iter()
        .copied()
        .filter(|column| records.iter().any(|record| !column.value(record).is_empty()))
        .collect()
}

/// Write records with a valid checksum as CSV
///
/// Columns that are empty for every exported record are left out. Nothing is
/// written when no record has a valid checksum.
pub fn write_records<W: io::Write>(
    records: &[DecodedRecord],
    writer: W,
) -> Result<ExportOutcome, ExportError> {
    let valid: Vec<&DecodedRecord> = records.iter().filter(|r| r.crc_valid).collect();
    if valid.is_empty() {
        return Ok(ExportOutcome::NoValidRecords);
    }

    let columns = non_empty_columns(&valid);

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.iter().map(|column| column.header()))?;
    for record in &valid {
        wtr.write_record(columns.iter().map(|column| column.value(record)))?;
    }
    wtr.flush()?;

    Ok(ExportOutcome::Written {
        records: valid.len(),
        columns: columns.len(),
    })
}

/// Export records to a CSV file at `path`
///
/// The file is only created when there is at least one valid record.
pub fn export_records_to_csv(
    records: &[DecodedRecord],
    path: &Path,
) -> Result<ExportOutcome, ExportError> {
    if !records.iter().any(|r| r.crc_valid) {
        warn!("No valid records to export to {}", path.display());
        return Ok(ExportOutcome::NoValidRecords);
    }

    let file = std::fs::File::create(path)?;
    let outcome = write_records(records, io::BufWriter::new(file))?;
    if let ExportOutcome::Written { records, columns } = outcome {
        info!(
            "Exported {} records to {} with {} columns",
            records,
            path.display(),
            columns
        );
    }
    Ok(outcome)
}

/// [`export_records_to_csv`] on the blocking thread pool
pub async fn spawn_csv_export(
    records: Arc<Vec<DecodedRecord>>,
    path: PathBuf,
) -> Result<ExportOutcome, ExportError> {
    tokio::task::spawn_blocking(move || export_records_to_csv(&records, &path)).await?
}
