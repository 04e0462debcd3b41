// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sovereign PCL table reader — zero external parsing dependencies.
//!
//! PCL is the tab-separated matrix layout the marker surveys ship in:
//! the first row holds a placeholder cell followed by sample identifiers,
//! every later row holds a feature identifier followed by one abundance
//! value per sample. Handles both plain and gzip-compressed files (`.gz`
//! extension, via `flate2::read::GzDecoder`).
//!
//! Values below the caller's load cutoff are dropped at parse time, so a
//! sparse table never materializes its zeros.

use crate::error::{Error, Result};
use crate::table::FeatureTable;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Open a table file for buffered reading.
///
/// Detects gzip compression from the `.gz` file extension and
/// wraps the stream with [`flate2::read::GzDecoder`] when needed.
fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let ext = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");
    if ext.eq_ignore_ascii_case("gz") {
        let decoder = flate2::read::GzDecoder::new(file);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read one line into `buf`, returning bytes read. Wraps I/O errors
/// with path context.
fn read_line(reader: &mut dyn BufRead, buf: &mut String, path: &Path) -> Result<usize> {
    reader.read_line(buf).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Strip the line terminator, tolerating CRLF input.
fn trim_newline(buf: &str) -> &str {
    buf.trim_end_matches('\n').trim_end_matches('\r')
}

/// Parse a PCL table file, keeping values at or above `min_value`.
///
/// The first row is always the header; sample order and feature row order
/// are preserved in the returned table. Blank data lines are skipped. An
/// empty file yields an empty table.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, and
/// [`Error::Table`] for duplicate sample columns, a row whose value count
/// disagrees with the header, or a value that does not parse as a float.
pub fn read_table(path: &Path, min_value: f64) -> Result<FeatureTable> {
    let mut reader = open_reader(path)?;
    let mut buf = String::new();

    if read_line(reader.as_mut(), &mut buf, path)? == 0 {
        return FeatureTable::new(Vec::new());
    }
    let mut header = trim_newline(&buf).split('\t');
    header.next(); // placeholder cell above the feature column
    let samples: Vec<String> = header.map(str::to_string).collect();
    let mut table = FeatureTable::new(samples)?;

    let mut values: Vec<f64> = Vec::new();
    loop {
        buf.clear();
        if read_line(reader.as_mut(), &mut buf, path)? == 0 {
            break;
        }
        let line = trim_newline(&buf);
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let feature = fields.next().unwrap_or("");
        values.clear();
        for field in fields {
            let value: f64 = field.trim().parse().map_err(|_| {
                Error::Table(format!("row '{feature}': invalid value '{field}'"))
            })?;
            values.push(value);
        }
        table.push_row(feature, &values, min_value)?;
    }
    Ok(table)
}
