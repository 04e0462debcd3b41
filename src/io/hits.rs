// SPDX-License-Identifier: AGPL-3.0-or-later
//! Hits report format — decode results with a confusion summary.
//!
//! The report opens with five comment lines, one per confusion bucket in
//! label order, then one tab-separated line per sample sorted by name. Each
//! sample line carries a status token: `no_code` (with the [`NA_TOKEN`]
//! sentinel), `no_matches`, or `matches` followed by the hit samples in
//! target-table order.

use crate::decode::{Confusion, SampleHits};
use crate::error::{Error, Result};
use crate::io::NA_TOKEN;
use std::fs;
use std::path::Path;

/// Write a decode report to `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created or written.
pub fn write_hits(hits: &SampleHits, path: &Path) -> Result<()> {
    let confusion = Confusion::classify(hits);
    let mut out = String::new();
    for (label, count) in confusion.summary() {
        out.push_str(&format!("# {label}: {count}\n"));
    }

    let mut entries: Vec<&(String, Option<Vec<String>>)> = hits.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    for (sample, hit_list) in entries {
        out.push_str(sample);
        match hit_list {
            None => {
                out.push_str("\tno_code\t");
                out.push_str(NA_TOKEN);
            }
            Some(matched) if matched.is_empty() => out.push_str("\tno_matches"),
            Some(matched) => {
                out.push_str("\tmatches");
                for hit in matched {
                    out.push('\t');
                    out.push_str(hit);
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
