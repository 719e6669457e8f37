//! Reading exported files back and verifying them.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tickchain_crypto::ChainVerifier;
use tickchain_types::{Stamp, StoredRecord, TickIndex};

use crate::error::{Error, MalformedRecordError, Result};
use crate::export::{COLUMNS, header};

/// Parses one data row. `row` is only used for error reporting.
pub fn parse_row(
    row: usize,
    line: &str,
) -> std::result::Result<StoredRecord, MalformedRecordError> {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < COLUMNS.len() {
        return Err(MalformedRecordError::new(
            row,
            COLUMNS[fields.len()],
            format!(
                "missing field: expected {} columns, found {}",
                COLUMNS.len(),
                fields.len()
            ),
        ));
    }
    if fields.len() > COLUMNS.len() {
        return Err(MalformedRecordError::new(
            row,
            "row",
            format!("expected {} columns, found {}", COLUMNS.len(), fields.len()),
        ));
    }

    let index: u64 = fields[0].parse().map_err(|_| {
        MalformedRecordError::new(row, COLUMNS[0], format!("not an integer: {:?}", fields[0]))
    })?;
    if index == 0 {
        return Err(MalformedRecordError::new(row, COLUMNS[0], "tick_index starts at 1"));
    }

    let stamp = Stamp::from_hex(fields[4])
        .map_err(|e| MalformedRecordError::new(row, COLUMNS[4], e.to_string()))?;

    let decimal = |position: usize| -> std::result::Result<f64, MalformedRecordError> {
        fields[position].parse().map_err(|_| {
            MalformedRecordError::new(
                row,
                COLUMNS[position],
                format!("not a number: {:?}", fields[position]),
            )
        })
    };

    Ok(StoredRecord {
        tick_index: TickIndex::new(index),
        time_utc: fields[1].to_string(),
        final_align: fields[2].to_string(),
        band: fields[3].to_string(),
        stamp,
        tick_ms: decimal(5)?,
        dt_ms: decimal(6)?,
        a_stress: decimal(7)?,
    })
}

/// Checks the header row and yields the parsed data rows in order.
///
/// Blank lines are skipped and do not count as rows.
fn data_rows<R: BufRead>(reader: R) -> Result<impl Iterator<Item = Result<StoredRecord>>> {
    let mut lines = reader.lines();

    let first = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(MalformedRecordError::new(0, "header", "file is empty").into()),
        }
    };

    let expected = header();
    if strip_line_end(&first).trim_start_matches('\u{feff}') != expected {
        return Err(MalformedRecordError::new(
            0,
            "header",
            format!("expected {expected:?}, found {:?}", strip_line_end(&first)),
        )
        .into());
    }

    let mut row = 0;
    Ok(lines.filter_map(move |line| {
        let line = match line {
            Ok(line) => line,
            Err(e) => return Some(Err(e.into())),
        };
        let line = strip_line_end(&line);
        if line.trim().is_empty() {
            return None;
        }
        row += 1;
        Some(parse_row(row, line).map_err(Error::from))
    }))
}

/// Reads a header row and all data rows. Blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<StoredRecord>> {
    data_rows(reader)?.collect()
}

/// Replays the chain of an export while reading it.
///
/// Each row is parsed and checked before the next one is read, so the
/// error returned belongs to the first bad row: [`Error::Malformed`] if it
/// does not parse, [`Error::ChainIntegrity`] if its stamp does not match.
pub fn verify_records<R: BufRead>(reader: R) -> Result<usize> {
    let mut verifier = ChainVerifier::new();
    for record in data_rows(reader)? {
        verifier.check(&record?)?;
    }
    Ok(verifier.count())
}

/// Reads an exported file.
pub fn read_file(path: &Path) -> Result<Vec<StoredRecord>> {
    let file = fs::File::open(path).map_err(|e| Error::file(path, e))?;
    read_records(BufReader::new(file))
}

/// Verifies an exported file row by row.
///
/// Returns the number of records verified. See [`verify_records`].
pub fn verify_file(path: &Path) -> Result<usize> {
    let file = fs::File::open(path).map_err(|e| Error::file(path, e))?;

    match verify_records(BufReader::new(file)) {
        Ok(count) => {
            tracing::info!(path = %path.display(), count, "chain verified");
            Ok(count)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "verification failed");
            Err(e)
        }
    }
}

fn strip_line_end(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
