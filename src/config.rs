// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run configuration — thresholds, knockout, code length, presets.
//!
//! All knobs live in [`CodeParams`]; the encode and decode paths never see
//! preset names or CLI strings. [`MetaMode`] bundles the parameter choices
//! that work well for metagenomic marker tables and resolves to a plain
//! [`CodeParams`] before anything runs.

use crate::error::{Error, Result};
use crate::rank::Ranking;
use std::fmt;
use std::str::FromStr;

/// Default detect/non-detect threshold: any stored value counts as present.
pub const ABUND_EPSILON: f64 = 1e-20;

/// Parameters controlling code construction and matching.
#[derive(Debug, Clone)]
pub struct CodeParams {
    /// Values at or above this are confidently present. Restricts the
    /// features a code may use (encode) or hit (decode).
    pub abund_detect: f64,
    /// Values below this are confidently absent. Applied when loading the
    /// table and as the abundance-gap floor.
    pub abund_nondetect: f64,
    /// If set, a chosen feature knocks out remaining candidates whose
    /// carrier sets have Jaccard similarity at or above this cutoff.
    pub similarity_cutoff: Option<f64>,
    /// Keep extending a code beyond uniqueness until it has this many
    /// features (when the sample's candidates allow).
    pub min_code_size: usize,
    /// Feature prioritization strategy.
    pub ranking: Ranking,
}

impl Default for CodeParams {
    fn default() -> Self {
        Self {
            abund_detect: ABUND_EPSILON,
            abund_nondetect: ABUND_EPSILON,
            similarity_cutoff: None,
            min_code_size: 1,
            ranking: Ranking::Rarity,
        }
    }
}

/// Preset bundles for metagenomic marker tables.
///
/// `relab` suits relative-abundance tables, `rpkm` suits reads per kilobase
/// per million. Both switch to abundance-gap ranking with a similarity
/// knockout and a seven-feature minimum, and relax the detect threshold
/// tenfold when decoding so remeasured features are not missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaMode {
    /// No preset; use explicitly supplied parameters.
    Off,
    /// Relative abundance data (detect 1e-3).
    Relab,
    /// RPKM data (detect 5.0).
    Rpkm,
}

impl MetaMode {
    /// Resolve the preset into concrete parameters.
    ///
    /// Returns `None` for [`MetaMode::Off`]; the caller keeps its explicit
    /// parameters. `decoding` is true when codes are being compared to a
    /// table rather than built from it.
    #[must_use]
    pub fn resolve(self, decoding: bool) -> Option<CodeParams> {
        let base_detect = match self {
            Self::Off => return None,
            Self::Relab => 1e-3,
            Self::Rpkm => 5.0,
        };
        let abund_nondetect = base_detect / 100.0;
        let abund_detect = if decoding {
            base_detect / 10.0
        } else {
            base_detect
        };
        Some(CodeParams {
            abund_detect,
            abund_nondetect,
            similarity_cutoff: Some(0.8),
            min_code_size: 7,
            ranking: Ranking::AbundanceGap,
        })
    }
}

impl FromStr for MetaMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(Self::Off),
            "relab" => Ok(Self::Relab),
            "rpkm" => Ok(Self::Rpkm),
            other => Err(Error::InvalidInput(format!(
                "unknown meta mode '{other}' (expected 'off', 'relab', or 'rpkm')"
            ))),
        }
    }
}

impl fmt::Display for MetaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Relab => f.write_str("relab"),
            Self::Rpkm => f.write_str("rpkm"),
        }
    }
}
