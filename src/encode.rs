// SPDX-License-Identifier: AGPL-3.0-or-later
//! Code construction — greedy minimal hitting sets per sample.
//!
//! A sample's code is a short list of its own features that, together, no
//! other sample carries. Finding the smallest such list is the minimum
//! hitting set problem, so the builder is greedy: it walks the sample's
//! ranked candidates from highest priority down and keeps each feature only
//! if it narrows the set of still-consistent other samples.
//!
//! # Algorithm
//!
//! 1. Start with `others` = every sample but the focal one, `code` empty.
//! 2. While candidates remain and (`others` is non-empty or `code` is
//!    shorter than the requested minimum):
//!    - Pop the highest-priority candidate and append it to `code`.
//!    - Intersect `others` with the carriers of that feature.
//!    - If the intersection did not shrink, drop the feature from `code`
//!      again. Once `others` is already empty the drop is skipped: extra
//!      features are there only to reach the minimum length.
//!    - With a similarity cutoff set, discard remaining candidates whose
//!      carrier set is Jaccard-similar to the one just examined (whether
//!      or not it was kept).
//! 3. The code stands if `others` ended empty; otherwise the sample gets
//!    the null code.
//!
//! Carrier sets come from the flipped view of the loaded table, so a
//! feature faintly present in another sample (below detect, above the load
//! cutoff) still blocks that feature from distinguishing the two.

use crate::config::CodeParams;
use crate::rank::rank_features;
use crate::table::{intersect, jaccard, FeatureTable, Threshold};

/// Codes for every sample of one table, in table sample order.
///
/// Entries pair the sample name with its code: feature names in
/// construction order, or `None` when the sample could not be separated.
#[derive(Debug, Clone, Default)]
pub struct SampleCodes {
    entries: Vec<(String, Option<Vec<String>>)>,
}

impl SampleCodes {
    /// Append one sample's code.
    pub fn push(&mut self, sample: impl Into<String>, code: Option<Vec<String>>) {
        self.entries.push((sample.into(), code));
    }

    /// Insert one sample's code, overwriting in place if the sample is
    /// already present (its original position is kept).
    pub fn insert(&mut self, sample: impl Into<String>, code: Option<Vec<String>>) {
        let sample = sample.into();
        match self.entries.iter_mut().find(|(name, _)| *name == sample) {
            Some(entry) => entry.1 = code,
            None => self.entries.push((sample, code)),
        }
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

    /// Look up one sample's code by name.
    #[must_use]
    pub fn get(&self, sample: &str) -> Option<&Option<Vec<String>>> {
        self.entries
            .iter()
            .find(|(name, _)| name == sample)
            .map(|(_, code)| code)
    }
}

impl<'a> IntoIterator for &'a SampleCodes {
    type Item = &'a (String, Option<Vec<String>>);
    type IntoIter = std::slice::Iter<'a, (String, Option<Vec<String>>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Build one sample's code from its ranked candidates.
///
/// `ranked` lists candidate feature ids from lowest to highest priority;
/// `feature_samples` gives, per feature id, the sorted sample ids carrying
/// it at the load (non-detect) level. Returns the code as feature ids in
/// construction order, or `None` if the remaining samples could not all be
/// excluded.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn build_code(
    focal: u32,
    ranked: &[u32],
    n_samples: usize,
    feature_samples: &[Vec<u32>],
    similarity_cutoff: Option<f64>,
    min_code_size: usize,
) -> Option<Vec<u32>> {
    let mut candidates = ranked.to_vec();
    let mut others: Vec<u32> = (0..n_samples as u32).filter(|&sid| sid != focal).collect();
    let mut code: Vec<u32> = Vec::new();

    while !candidates.is_empty() && (!others.is_empty() || code.len() < min_code_size) {
        let Some(feature) = candidates.pop() else {
            break;
        };
        code.push(feature);
        let carriers = &feature_samples[feature as usize];
        let old_count = others.len();
        others = intersect(&others, carriers);
        // a feature that excludes nobody is dead weight, unless we are
        // already past uniqueness and only padding to the minimum length
        if others.len() == old_count && old_count != 0 {
            code.pop();
        }
        if let Some(cutoff) = similarity_cutoff {
            candidates.retain(|c| jaccard(carriers, &feature_samples[*c as usize]) < cutoff);
        }
    }

    if others.is_empty() {
        Some(code)
    } else {
        None
    }
}

/// Build codes for every sample of a loaded table.
///
/// The table is expected at the load (non-detect) threshold; candidates
/// per sample come from a detect-level view derived here, while carrier
/// sets and ranking statistics keep the full loaded population.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn encode_table(table: &FeatureTable, params: &CodeParams) -> SampleCodes {
    let flipped = table.flip();
    let detected = table.threshold(params.abund_detect, Threshold::AtLeast);
    let ranked = rank_features(&detected, &flipped, params.abund_nondetect, params.ranking);
    let feature_samples = flipped.presence_sets();

    let mut codes = SampleCodes::default();
    for sid in 0..table.n_samples() as u32 {
        let code = build_code(
            sid,
            &ranked[sid as usize],
            table.n_samples(),
            &feature_samples,
            params.similarity_cutoff,
            params.min_code_size,
        );
        codes.push(
            table.sample_name(sid),
            code.map(|fids| {
                fids.into_iter()
                    .map(|fid| table.feature_name(fid).to_string())
                    .collect()
            }),
        );
    }
    codes
}
