// SPDX-License-Identifier: AGPL-3.0-or-later
//! Codes file format — one identifying code per sample.
//!
//! Tab-separated with a `#SAMPLE\tCODE` header. Each line carries a sample
//! identifier followed by its code features in construction order; a null
//! code is written as the [`NA_TOKEN`] sentinel, and an empty (but valid)
//! code as a bare sample line. Rows are written sorted by sample so reruns
//! diff cleanly.

use crate::encode::SampleCodes;
use crate::error::{Error, Result};
use crate::io::NA_TOKEN;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Write codes to `path`, one sample per line, sorted by sample name.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created or written.
pub fn write_codes(codes: &SampleCodes, path: &Path) -> Result<()> {
    let mut entries: Vec<&(String, Option<Vec<String>>)> = codes.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::from("#SAMPLE\tCODE\n");
    for (sample, code) in entries {
        out.push_str(sample);
        match code {
            None => {
                out.push('\t');
                out.push_str(NA_TOKEN);
            }
            Some(features) => {
                for feature in features {
                    out.push('\t');
                    out.push_str(feature);
                }
            }
        }
        out.push('\n');
    }
    fs::write(path, out).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a codes file written by [`write_codes`].
///
/// Blank lines are skipped; a repeated sample keeps its first position with
/// the last code seen. Any field equal to [`NA_TOKEN`] marks the whole code
/// null.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, and
/// [`Error::Codes`] if the header line is missing.
pub fn read_codes(path: &Path) -> Result<SampleCodes> {
    let file = fs::File::open(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut codes = SampleCodes::default();
    let mut saw_header = false;
    for line in reader.lines() {
        let line = line.map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !saw_header {
            if !line.starts_with('#') {
                return Err(Error::Codes(format!(
                    "{}: missing #SAMPLE header",
                    path.display()
                )));
            }
            saw_header = true;
            continue;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let sample = fields.next().unwrap_or("").to_string();
        let features: Vec<String> = fields.map(str::to_string).collect();
        let code = if features.iter().any(|f| f == NA_TOKEN) {
            None
        } else {
            Some(features)
        };
        codes.insert(sample, code);
    }
    Ok(codes)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_codes() -> SampleCodes {
        let mut codes = SampleCodes::default();
        codes.push("pond_02", Some(vec!["asv_b".to_string(), "asv_a".to_string()]));
        codes.push("pond_01", None);
        codes.push("pond_03", Some(Vec::new()));
        codes
    }

    #[test]
    fn writes_sorted_with_sentinel() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("survey.codes.txt");
        write_codes(&sample_codes(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "#SAMPLE\tCODE\npond_01\t#N/A\npond_02\tasv_b\tasv_a\npond_03\n"
        );
    }

    #[test]
    fn round_trips_null_empty_and_ordered_codes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("survey.codes.txt");
        write_codes(&sample_codes(), &path).unwrap();
        let back = read_codes(&path).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.get("pond_01").unwrap(), &None);
        // construction order survives the round trip
        assert_eq!(
            back.get("pond_02").unwrap().as_deref(),
            Some(&["asv_b".to_string(), "asv_a".to_string()][..])
        );
        // bare line reads back as the empty, non-null code
        assert_eq!(back.get("pond_03").unwrap().as_deref(), Some(&[][..]));
        // file order is sample-sorted
        let names: Vec<&str> = back.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["pond_01", "pond_02", "pond_03"]);
    }

    #[test]
    fn sentinel_anywhere_makes_the_code_null() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("edited.codes.txt");
        std::fs::write(&path, "#SAMPLE\tCODE\npond_01\tasv_a\t#N/A\tasv_b\n").unwrap();
        let codes = read_codes(&path).unwrap();
        assert_eq!(codes.get("pond_01").unwrap(), &None);
    }

    #[test]
    fn repeated_sample_keeps_position_takes_last_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dup.codes.txt");
        std::fs::write(
            &path,
            "#SAMPLE\tCODE\npond_01\tasv_a\npond_02\tasv_b\npond_01\tasv_c\n",
        )
        .unwrap();
        let codes = read_codes(&path).unwrap();
        assert_eq!(codes.len(), 2);
        let names: Vec<&str> = codes.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["pond_01", "pond_02"]);
        assert_eq!(
            codes.get("pond_01").unwrap().as_deref(),
            Some(&["asv_c".to_string()][..])
        );
    }

    #[test]
    fn missing_header_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("raw.codes.txt");
        std::fs::write(&path, "pond_01\tasv_a\n").unwrap();
        let err = read_codes(&path).unwrap_err();
        assert!(err.to_string().contains("missing #SAMPLE header"));
    }
}
