// SPDX-License-Identifier: AGPL-3.0-or-later
//! Code matching — compare saved codes against a table population.
//!
//! Decoding answers "which samples in this table carry everything the code
//! names?". A code built from one survey can be checked against a later
//! survey of the same ponds; ideally each code still hits exactly its own
//! sample. Hits are classified into five confusion buckets for reporting.
//!
//! Matching is a subset test per (code, sample) pair over detect-level
//! presence sets. A code feature the target table has never seen is carried
//! by nobody, so such codes simply miss. The empty (but non-null) code is a
//! subset of everything and hits the whole population.

use crate::encode::SampleCodes;
use crate::table::{is_subset, FeatureTable, Threshold};

/// Decode results for every coded sample, in codes order.
///
/// Entries pair the sample name with its hit list: the names of all target
/// samples matching the code (target table order), or `None` when the code
/// itself was null.
#[derive(Debug, Clone, Default)]
pub struct SampleHits {
    entries: Vec<(String, Option<Vec<String>>)>,
}

impl SampleHits {
    /// Append one sample's hit list.
    pub fn push(&mut self, sample: impl Into<String>, hits: Option<Vec<String>>) {
        self.entries.push((sample.into(), hits));
    }

    /// Number of samples with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, Option<Vec<String>>)> {
        self.entries.iter()
    }

    /// Look up one sample's hit list by name.
    #[must_use]
    pub fn get(&self, sample: &str) -> Option<&Option<Vec<String>>> {
        self.entries
            .iter()
            .find(|(name, _)| name == sample)
            .map(|(_, hits)| hits)
    }
}

impl<'a> IntoIterator for &'a SampleHits {
    type Item = &'a (String, Option<Vec<String>>);
    type IntoIter = std::slice::Iter<'a, (String, Option<Vec<String>>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Match every code against a loaded table.
///
/// The table is thresholded at `abund_detect` before matching, so only
/// confidently present features can be hit. Hit lists follow the target
/// table's sample order; result entries follow the codes' order.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn decode_table(table: &FeatureTable, codes: &SampleCodes, abund_detect: f64) -> SampleHits {
    let detected = table.threshold(abund_detect, Threshold::AtLeast);
    let presence = detected.presence_sets();

    let mut results = SampleHits::default();
    for (sample, code) in codes {
        let Some(code) = code else {
            results.push(sample.clone(), None);
            continue;
        };
        let mut wanted: Vec<u32> = Vec::with_capacity(code.len());
        let mut known = true;
        for feature in code {
            match table.feature_id(feature) {
                Some(fid) => wanted.push(fid),
                None => {
                    known = false;
                    break;
                }
            }
        }
        let hits = if known {
            wanted.sort_unstable();
            wanted.dedup();
            (0..table.n_samples() as u32)
                .filter(|&sid| is_subset(&wanted, &presence[sid as usize]))
                .map(|sid| table.sample_name(sid).to_string())
                .collect()
        } else {
            Vec::new()
        };
        results.push(sample.clone(), Some(hits));
    }
    results
}

/// Confusion bucket counts over one decode result.
///
/// Buckets are mutually exclusive and cover every entry, so the counts sum
/// to the number of samples decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    /// Code hit exactly its own sample (`1|TP`).
    pub unique_hit: usize,
    /// Code hit its own sample plus others (`2|TP+FP`).
    pub ambiguous_hit: usize,
    /// Code hit only other samples (`3|FN+FP`).
    pub wrong_hit: usize,
    /// Code hit nothing (`4|FN`).
    pub no_hit: usize,
    /// No code to check (`5|NA`).
    pub no_code: usize,
}

impl Confusion {
    /// Classify every entry of a decode result.
    #[must_use]
    pub fn classify(hits: &SampleHits) -> Self {
        let mut counts = Self::default();
        for (sample, hit_list) in hits {
            let Some(hit_list) = hit_list else {
                counts.no_code += 1;
                continue;
            };
            let own = hit_list.iter().any(|hit| hit == sample);
            let other = hit_list.iter().any(|hit| hit != sample);
            match (own, other) {
                (true, false) => counts.unique_hit += 1,
                (true, true) => counts.ambiguous_hit += 1,
                (false, true) => counts.wrong_hit += 1,
                (false, false) => counts.no_hit += 1,
            }
        }
        counts
    }

    /// Sum over all buckets; equals the number of entries classified.
    #[must_use]
    pub fn total(&self) -> usize {
        self.unique_hit + self.ambiguous_hit + self.wrong_hit + self.no_hit + self.no_code
    }

    /// Buckets with their report labels, in label order.
    #[must_use]
    pub fn summary(&self) -> [(&'static str, usize); 5] {
        [
            ("1|TP", self.unique_hit),
            ("2|TP+FP", self.ambiguous_hit),
            ("3|FN+FP", self.wrong_hit),
            ("4|FN", self.no_hit),
            ("5|NA", self.no_code),
        ]
    }
}
