// SPDX-License-Identifier: AGPL-3.0-or-later
//! Feature tables — sample-by-feature abundance matrices and derived views.
//!
//! A table maps each sample to the abundance of each marker feature observed
//! in it (PCL orientation: rows are features, columns are samples). The code
//! builder and matcher never look at raw strings: samples and features are
//! interned to dense ids at load time (samples in header order, features in
//! first-seen row order) and every downstream collection is an id-ordered
//! vector. Hash maps exist only as lookup indexes and are never iterated, so
//! identical input always produces identical output.
//!
//! Presence sets are sorted id vectors; the set algebra the hitting-set
//! search needs (intersection, subset, Jaccard) is done with two-pointer
//! merges over those slices.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Which side of a threshold survives [`FeatureTable::threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Keep entries with value >= cutoff.
    AtLeast,
    /// Keep entries with value < cutoff.
    Below,
}

/// A sample-by-feature abundance matrix with interned identifiers.
///
/// Sample ids index the header order; feature ids index first-seen row
/// order. Each sample's entries are held in ascending feature-id order,
/// which doubles as the sample's presence set once values are dropped.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    samples: Vec<String>,
    features: Vec<String>,
    feature_ids: HashMap<String, u32>,
    /// Per-sample `(feature id, value)` entries, ascending by feature id.
    rows: Vec<Vec<(u32, f64)>>,
}

impl FeatureTable {
    /// Create an empty table for the given sample identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if a sample identifier repeats; duplicate
    /// columns would make sample/code bookkeeping ambiguous.
    pub fn new(samples: Vec<String>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(samples.len());
        for sample in &samples {
            if !seen.insert(sample.as_str()) {
                return Err(Error::Table(format!(
                    "duplicate sample '{sample}' in header"
                )));
            }
        }
        let rows = vec![Vec::new(); samples.len()];
        Ok(Self {
            samples,
            features: Vec::new(),
            feature_ids: HashMap::new(),
            rows,
        })
    }

    /// Build a table from in-memory rows, applying the load cutoff.
    ///
    /// Values below `min_value` are not stored, matching the file loader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] on duplicate sample identifiers or a row
    /// whose value count differs from the sample count.
    pub fn from_rows(samples: &[&str], rows: &[(&str, &[f64])], min_value: f64) -> Result<Self> {
        let mut table = Self::new(samples.iter().map(|s| (*s).to_string()).collect())?;
        for (feature, values) in rows {
            table.push_row(feature, values, min_value)?;
        }
        Ok(table)
    }

    /// Add one feature row, keeping only values at or above `min_value`.
    ///
    /// A repeated feature identifier overwrites stored values but keeps the
    /// feature's first-seen position; entries a repeat leaves below the
    /// cutoff are not removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if `values` does not have one entry per
    /// sample.
    pub fn push_row(&mut self, feature: &str, values: &[f64], min_value: f64) -> Result<()> {
        if values.len() != self.samples.len() {
            return Err(Error::Table(format!(
                "row '{feature}' has {} values, expected {}",
                values.len(),
                self.samples.len()
            )));
        }
        let fid = self.intern_feature(feature);
        for (sid, &value) in values.iter().enumerate() {
            if value >= min_value {
                match self.rows[sid].binary_search_by_key(&fid, |entry| entry.0) {
                    Ok(pos) => self.rows[sid][pos].1 = value,
                    Err(pos) => self.rows[sid].insert(pos, (fid, value)),
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn intern_feature(&mut self, feature: &str) -> u32 {
        if let Some(&fid) = self.feature_ids.get(feature) {
            return fid;
        }
        let fid = self.features.len() as u32;
        self.features.push(feature.to_string());
        self.feature_ids.insert(feature.to_string(), fid);
        fid
    }

    /// Number of samples (columns).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Number of distinct features seen so far.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Sample identifiers in header order.
    #[must_use]
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Feature identifiers in first-seen row order.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Name of the sample with id `sid`.
    #[must_use]
    pub fn sample_name(&self, sid: u32) -> &str {
        &self.samples[sid as usize]
    }

    /// Name of the feature with id `fid`.
    #[must_use]
    pub fn feature_name(&self, fid: u32) -> &str {
        &self.features[fid as usize]
    }

    /// Id of a feature by name, if present in this table's universe.
    #[must_use]
    pub fn feature_id(&self, feature: &str) -> Option<u32> {
        self.feature_ids.get(feature).copied()
    }

    /// One sample's `(feature id, value)` entries, ascending by feature id.
    #[must_use]
    pub fn row(&self, sid: u32) -> &[(u32, f64)] {
        &self.rows[sid as usize]
    }

    /// Stored value for a (sample, feature) pair, if any.
    #[must_use]
    pub fn value(&self, sid: u32, fid: u32) -> Option<f64> {
        let row = &self.rows[sid as usize];
        row.binary_search_by_key(&fid, |entry| entry.0)
            .ok()
            .map(|pos| row[pos].1)
    }

    /// Derive a new table keeping only entries on one side of `cutoff`.
    ///
    /// Every sample is preserved even if the filter empties it, and the
    /// feature universe (names and ids) is shared with the source so ids
    /// stay comparable across derived views. The source is untouched.
    #[must_use]
    pub fn threshold(&self, cutoff: f64, mode: Threshold) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|&&(_, value)| match mode {
                        Threshold::AtLeast => value >= cutoff,
                        Threshold::Below => value < cutoff,
                    })
                    .copied()
                    .collect()
            })
            .collect();
        Self {
            samples: self.samples.clone(),
            features: self.features.clone(),
            feature_ids: self.feature_ids.clone(),
            rows,
        }
    }

    /// Feature-indexed view of this table.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn flip(&self) -> FlippedTable {
        let mut entries = vec![Vec::new(); self.features.len()];
        for (sid, row) in self.rows.iter().enumerate() {
            for &(fid, value) in row {
                entries[fid as usize].push((sid as u32, value));
            }
        }
        FlippedTable { entries }
    }

    /// Per-sample presence sets (sorted feature ids, values dropped).
    #[must_use]
    pub fn presence_sets(&self) -> Vec<Vec<u32>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|&(fid, _)| fid).collect())
            .collect()
    }
}

/// Feature-to-sample view derived from a [`FeatureTable`].
///
/// Entry lists are ascending by sample id. The view is read-only; derive a
/// fresh one after the source table changes.
#[derive(Debug, Clone)]
pub struct FlippedTable {
    /// Per-feature `(sample id, value)` entries, ascending by sample id.
    entries: Vec<Vec<(u32, f64)>>,
}

impl FlippedTable {
    /// Number of features in the source table's universe.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.entries.len()
    }

    /// One feature's `(sample id, value)` entries, ascending by sample id.
    #[must_use]
    pub fn entry(&self, fid: u32) -> &[(u32, f64)] {
        &self.entries[fid as usize]
    }

    /// Number of samples possessing feature `fid`.
    #[must_use]
    pub fn prevalence(&self, fid: u32) -> usize {
        self.entries[fid as usize].len()
    }

    /// Per-feature presence sets (sorted sample ids, values dropped).
    #[must_use]
    pub fn presence_sets(&self) -> Vec<Vec<u32>> {
        self.entries
            .iter()
            .map(|entry| entry.iter().map(|&(sid, _)| sid).collect())
            .collect()
    }
}

// ── Sorted-set algebra ────────────────────────────────────────────

/// Intersection of two sorted id slices.
#[must_use]
pub fn intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Whether every id in `needle` occurs in `haystack` (both sorted).
///
/// The empty set is a subset of everything.
#[must_use]
pub fn is_subset(needle: &[u32], haystack: &[u32]) -> bool {
    let mut j = 0;
    for &id in needle {
        while j < haystack.len() && haystack[j] < id {
            j += 1;
        }
        if j == haystack.len() || haystack[j] != id {
            return false;
        }
        j += 1;
    }
    true
}

/// Jaccard similarity |A ∩ B| / |A ∪ B| of two sorted id slices.
///
/// Returns 0.0 when both sets are empty so the score is total.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn jaccard(a: &[u32], b: &[u32]) -> f64 {
    let mut shared = 0usize;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pond_table() -> FeatureTable {
        FeatureTable::from_rows(
            &["pond_01", "pond_02", "pond_03"],
            &[
                ("asv_a", &[1.0, 0.0, 2.0]),
                ("asv_b", &[0.5, 0.5, 0.0]),
                ("asv_c", &[0.0, 0.0, 3.0]),
            ],
            0.1,
        )
        .unwrap()
    }

    #[test]
    fn interns_in_first_seen_order() {
        let table = pond_table();
        assert_eq!(table.features(), &["asv_a", "asv_b", "asv_c"]);
        assert_eq!(table.feature_id("asv_c"), Some(2));
        assert_eq!(table.feature_id("asv_x"), None);
    }

    #[test]
    fn load_cutoff_drops_low_values() {
        let table = pond_table();
        // pond_02 has asv_a = 0.0, below the 0.1 load cutoff
        assert_eq!(table.value(1, 0), None);
        assert_eq!(table.value(1, 1), Some(0.5));
        assert_eq!(table.row(0), &[(0, 1.0), (1, 0.5)]);
    }

    #[test]
    fn repeated_row_overwrites_in_place() {
        let mut table = pond_table();
        table.push_row("asv_a", &[9.0, 9.0, 0.0], 0.1).unwrap();
        // value updated at the original position, id unchanged
        assert_eq!(table.feature_id("asv_a"), Some(0));
        assert_eq!(table.value(0, 0), Some(9.0));
        assert_eq!(table.value(1, 0), Some(9.0));
        // below-cutoff repeat does not erase the earlier value
        assert_eq!(table.value(2, 0), Some(2.0));
        assert_eq!(table.row(0), &[(0, 9.0), (1, 0.5)]);
    }

    #[test]
    fn row_length_mismatch_is_an_error() {
        let mut table = pond_table();
        let err = table.push_row("asv_d", &[1.0, 2.0], 0.0).unwrap_err();
        assert!(err.to_string().contains("asv_d"));
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn duplicate_sample_header_is_an_error() {
        let err = FeatureTable::new(vec!["p1".into(), "p2".into(), "p1".into()]).unwrap_err();
        assert!(err.to_string().contains("duplicate sample 'p1'"));
    }

    #[test]
    fn threshold_keeps_all_samples() {
        let table = pond_table();
        let detected = table.threshold(1.0, Threshold::AtLeast);
        assert_eq!(detected.n_samples(), 3);
        assert_eq!(detected.row(0), &[(0, 1.0)]);
        assert!(detected.row(1).is_empty()); // emptied, not removed
        assert_eq!(detected.row(2), &[(0, 2.0), (2, 3.0)]);
        // source untouched
        assert_eq!(table.row(0).len(), 2);

        let faint = table.threshold(1.0, Threshold::Below);
        assert_eq!(faint.row(0), &[(1, 0.5)]);
        assert!(faint.row(2).is_empty());
    }

    #[test]
    fn flip_is_bijective() {
        let table = pond_table();
        let flipped = table.flip();
        assert_eq!(flipped.n_features(), 3);
        assert_eq!(flipped.entry(0), &[(0, 1.0), (2, 2.0)]);
        assert_eq!(flipped.entry(1), &[(0, 0.5), (1, 0.5)]);
        assert_eq!(flipped.entry(2), &[(2, 3.0)]);
        assert_eq!(flipped.prevalence(1), 2);

        let total: usize = (0..3).map(|fid| flipped.entry(fid).len()).sum();
        let stored: usize = (0..3).map(|sid| table.row(sid).len()).sum();
        assert_eq!(total, stored);
    }

    #[test]
    fn presence_sets_drop_values() {
        let table = pond_table();
        assert_eq!(table.presence_sets(), vec![vec![0, 1], vec![1], vec![0, 2]]);
        assert_eq!(
            table.flip().presence_sets(),
            vec![vec![0, 2], vec![0, 1], vec![2]]
        );
    }

    #[test]
    fn intersect_and_subset() {
        assert_eq!(intersect(&[1, 3, 5, 7], &[2, 3, 6, 7]), vec![3, 7]);
        assert_eq!(intersect(&[], &[1, 2]), Vec::<u32>::new());
        assert!(is_subset(&[2, 5], &[1, 2, 3, 5]));
        assert!(!is_subset(&[2, 4], &[1, 2, 3, 5]));
        assert!(is_subset(&[], &[]));
        assert!(is_subset(&[], &[9]));
        assert!(!is_subset(&[9], &[]));
    }

    #[test]
    fn jaccard_scores() {
        // {a,b} vs {b,c}: one shared of three total
        assert!((jaccard(&[0, 1], &[1, 2]) - 1.0 / 3.0).abs() < 1e-12);
        assert!((jaccard(&[4, 5], &[4, 5]) - 1.0).abs() < 1e-12);
        assert!((jaccard(&[1], &[2]) - 0.0).abs() < 1e-12);
        assert!((jaccard(&[], &[]) - 0.0).abs() < 1e-12);
    }
}
