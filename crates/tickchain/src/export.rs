//! CSV export of session records.
//!
//! One header row followed by one row per tick:
//!
//! ```text
//! tick_index,time_utc,final_align,band,stamp,tick_ms,dt_ms,a_stress
//! 1,2024-01-01T00:00:00Z,+0.020000000,C,a964bc2b...,1000.0,1000.0,0.0
//! ```
//!
//! No field ever contains a comma, quote, or newline, so rows are written
//! without quoting.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tickchain_types::{StoredRecord, TickRecord, format_filename_time};

use crate::error::{Error, Result};

/// Column names, in file order.
pub const COLUMNS: [&str; 8] = [
    "tick_index",
    "time_utc",
    "final_align",
    "band",
    "stamp",
    "tick_ms",
    "dt_ms",
    "a_stress",
];

/// Default export basename for CLI sessions.
pub const DEFAULT_BASENAME: &str = "stamps_tickchain_cli";

/// The header row, without a line terminator.
pub fn header() -> String {
    COLUMNS.join(",")
}

/// `<basename>_<YYYYMMDD_HHMMSSZ>.csv`
pub fn export_file_name(basename: &str, at: DateTime<Utc>) -> String {
    format!("{basename}_{}.csv", format_filename_time(at))
}

/// Formats a float as its shortest round-trip decimal, always with a
/// fractional part (`1000.0`, `0.01`, `-0.05`).
pub fn format_decimal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Formats one data row, without a line terminator.
pub fn format_row(record: &StoredRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        record.tick_index,
        record.time_utc,
        record.final_align,
        record.band,
        record.stamp,
        format_decimal(record.tick_ms),
        format_decimal(record.dt_ms),
        format_decimal(record.a_stress),
    )
}

/// Writes the header and all rows.
pub fn write_records<'a, W, I>(writer: &mut W, records: I) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a TickRecord>,
{
    writeln!(writer, "{}", header())?;

    let mut rows = 0;
    for record in records {
        writeln!(writer, "{}", format_row(&StoredRecord::from(record)))?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

/// Writes `records` to `<directory>/<basename>_<at>.csv` and returns the path.
///
/// Creates `directory` if needed. An empty record list is
/// [`Error::NothingToExport`] and touches nothing on disk.
pub fn export_records(
    directory: &Path,
    basename: &str,
    at: DateTime<Utc>,
    records: &[TickRecord],
) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(Error::NothingToExport);
    }

    fs::create_dir_all(directory).map_err(|e| Error::file(directory, e))?;

    let path = directory.join(export_file_name(basename, at));
    let file = fs::File::create(&path).map_err(|e| Error::file(&path, e))?;
    let mut writer = BufWriter::new(file);

    let rows = write_records(&mut writer, records).map_err(|e| Error::file(&path, e))?;

    tracing::info!(path = %path.display(), rows, "exported records");

    Ok(path)
}
