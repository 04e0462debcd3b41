// SPDX-License-Identifier: AGPL-3.0-or-later
//! Feature ranking — per-sample priority order for code construction.
//!
//! The code builder consumes a sample's candidate features from the end of
//! a ranked list, so ranking places the most promising feature last. Two
//! strategies:
//!
//! - **Rarity** — order by global prevalence, most widespread first. A
//!   feature carried by few samples knocks out more of the population per
//!   step, so the rarest candidates are tried first.
//! - **Abundance gap** — order by the margin between the sample's own value
//!   and the highest value at or below it among the other samples (floored
//!   at the non-detect threshold). Wide gaps survive remeasurement noise,
//!   which matters when codes are decoded against later snapshots.
//!
//! Candidates come from the detect-thresholded table; prevalence and gap
//! statistics come from the flipped view of the full loaded table, where
//! features below the detect level still count as carried. Both sorts are
//! stable, so equally ranked features keep their input row order.

use crate::error::{Error, Result};
use crate::table::{FeatureTable, FlippedTable};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Strategy for prioritizing a sample's features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Rarest feature (lowest prevalence) gets highest priority.
    Rarity,
    /// Largest abundance gap gets highest priority.
    AbundanceGap,
}

impl FromStr for Ranking {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rarity" => Ok(Self::Rarity),
            "abundance_gap" => Ok(Self::AbundanceGap),
            other => Err(Error::InvalidInput(format!(
                "unknown ranking '{other}' (expected 'rarity' or 'abundance_gap')"
            ))),
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rarity => f.write_str("rarity"),
            Self::AbundanceGap => f.write_str("abundance_gap"),
        }
    }
}

/// Rank every sample's candidate features with the chosen strategy.
///
/// `detected` is the detect-thresholded table supplying each sample's
/// candidates; `flipped` is the flipped view of the loaded table supplying
/// population statistics. Returns, per sample id, the candidate feature ids
/// ordered from lowest to highest priority.
#[must_use]
pub fn rank_features(
    detected: &FeatureTable,
    flipped: &FlippedTable,
    abund_nondetect: f64,
    ranking: Ranking,
) -> Vec<Vec<u32>> {
    match ranking {
        Ranking::Rarity => rank_by_rarity(detected, flipped),
        Ranking::AbundanceGap => rank_by_abundance_gap(detected, flipped, abund_nondetect),
    }
}

/// Rarity ranking: stable sort by global prevalence, descending.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn rank_by_rarity(detected: &FeatureTable, flipped: &FlippedTable) -> Vec<Vec<u32>> {
    (0..detected.n_samples() as u32)
        .map(|sid| {
            let mut ranked: Vec<u32> = detected.row(sid).iter().map(|&(fid, _)| fid).collect();
            ranked.sort_by(|a, b| flipped.prevalence(*b).cmp(&flipped.prevalence(*a)));
            ranked
        })
        .collect()
}

/// Abundance-gap ranking: stable sort by gap, ascending.
///
/// The gap for a feature is the sample's value minus the largest value not
/// exceeding it among the other samples carrying the feature, with
/// `abund_nondetect` as the floor when no such sample exists.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn rank_by_abundance_gap(
    detected: &FeatureTable,
    flipped: &FlippedTable,
    abund_nondetect: f64,
) -> Vec<Vec<u32>> {
    (0..detected.n_samples() as u32)
        .map(|sid| {
            let mut gaps: Vec<(u32, f64)> = detected
                .row(sid)
                .iter()
                .map(|&(fid, focal)| {
                    let mut lesser = abund_nondetect;
                    for &(other, value) in flipped.entry(fid) {
                        if other != sid && value <= focal && value > lesser {
                            lesser = value;
                        }
                    }
                    (fid, focal - lesser)
                })
                .collect();
            gaps.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            gaps.into_iter().map(|(fid, _)| fid).collect()
        })
        .collect()
}
