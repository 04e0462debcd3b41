// SPDX-License-Identifier: AGPL-3.0-or-later
//! Determinism tests: rerun identical inputs, expect identical codes, hit
//! lists, and byte-identical output files.
//!
//! Code construction breaks ranking ties by table row order, so the same
//! survey must produce the same codes on every run and on every machine.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;
use wetspring_otolith::config::{CodeParams, ABUND_EPSILON};
use wetspring_otolith::decode::decode_table;
use wetspring_otolith::encode::encode_table;
use wetspring_otolith::io::{codes, hits, pcl};
use wetspring_otolith::rank::{rank_features, Ranking};
use wetspring_otolith::table::FeatureTable;

// ═══════════════════════════════════════════════════════════════════
// Rerun determinism — same input, same output
// ═══════════════════════════════════════════════════════════════════

#[test]
fn encode_deterministic_across_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.pcl");
    File::create(&path)
        .unwrap()
        .write_all(generate_survey(12, 60, 42).as_bytes())
        .unwrap();

    let run = || {
        let table = pcl::read_table(&path, ABUND_EPSILON).unwrap();
        encode_table(&table, &CodeParams::default())
    };
    let run1 = run();
    let run2 = run();
    assert_eq!(run1.len(), run2.len());
    for (a, b) in run1.iter().zip(run2.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn ranking_deterministic_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rank.pcl");
    File::create(&path)
        .unwrap()
        .write_all(generate_survey(8, 40, 7).as_bytes())
        .unwrap();
    let table = pcl::read_table(&path, ABUND_EPSILON).unwrap();
    let flipped = table.flip();

    for ranking in [Ranking::Rarity, Ranking::AbundanceGap] {
        let run1 = rank_features(&table, &flipped, ABUND_EPSILON, ranking);
        let run2 = rank_features(&table, &flipped, ABUND_EPSILON, ranking);
        assert_eq!(run1, run2, "{ranking} ranking must be deterministic");
    }
}

#[test]
fn decode_deterministic_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.pcl");
    File::create(&path)
        .unwrap()
        .write_all(generate_survey(10, 50, 137).as_bytes())
        .unwrap();
    let table = pcl::read_table(&path, ABUND_EPSILON).unwrap();
    let built = encode_table(&table, &CodeParams::default());

    let run1 = decode_table(&table, &built, ABUND_EPSILON);
    let run2 = decode_table(&table, &built, ABUND_EPSILON);
    assert_eq!(run1.len(), run2.len());
    for (a, b) in run1.iter().zip(run2.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn knockout_and_padding_stay_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.pcl");
    File::create(&path)
        .unwrap()
        .write_all(generate_survey(10, 50, 99).as_bytes())
        .unwrap();
    let table = pcl::read_table(&path, ABUND_EPSILON).unwrap();
    let params = CodeParams {
        similarity_cutoff: Some(0.5),
        min_code_size: 3,
        ranking: Ranking::AbundanceGap,
        ..CodeParams::default()
    };

    let run1 = encode_table(&table, &params);
    let run2 = encode_table(&table, &params);
    for (a, b) in run1.iter().zip(run2.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn pipeline_outputs_byte_identical_across_reruns() {
    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("survey.pcl");
    File::create(&table_path)
        .unwrap()
        .write_all(generate_survey(12, 60, 42).as_bytes())
        .unwrap();

    let run = |tag: &str| {
        let codes_path = dir.path().join(format!("{tag}.codes.txt"));
        let hits_path = dir.path().join(format!("{tag}.hits.txt"));
        let table = pcl::read_table(&table_path, ABUND_EPSILON).unwrap();
        let built = encode_table(&table, &CodeParams::default());
        codes::write_codes(&built, &codes_path).unwrap();
        let back = codes::read_codes(&codes_path).unwrap();
        let matched = decode_table(&table, &back, ABUND_EPSILON);
        hits::write_hits(&matched, &hits_path).unwrap();
        (
            std::fs::read_to_string(&codes_path).unwrap(),
            std::fs::read_to_string(&hits_path).unwrap(),
        )
    };

    let (codes1, hits1) = run("first");
    let (codes2, hits2) = run("second");
    assert_eq!(codes1, codes2, "codes file must be byte-identical");
    assert_eq!(hits1, hits2, "hits report must be byte-identical");
}

// ── Tie-break pinning — row order decides, nothing else ─────────────

#[test]
fn rarity_ties_resolve_by_row_order() {
    // asv_x and asv_y are equally prevalent; the later row ranks higher
    let table = FeatureTable::from_rows(
        &["pond_01", "pond_02", "pond_03"],
        &[("asv_x", &[1.0, 1.0, 0.0]), ("asv_y", &[1.0, 0.0, 1.0])],
        0.5,
    )
    .unwrap();
    let built = encode_table(&table, &CodeParams::default());
    assert_eq!(
        built.get("pond_01").unwrap().as_deref(),
        Some(&["asv_y".to_string(), "asv_x".to_string()][..])
    );

    // swapping the rows swaps the construction order
    let swapped = FeatureTable::from_rows(
        &["pond_01", "pond_02", "pond_03"],
        &[("asv_y", &[1.0, 0.0, 1.0]), ("asv_x", &[1.0, 1.0, 0.0])],
        0.5,
    )
    .unwrap();
    let built = encode_table(&swapped, &CodeParams::default());
    assert_eq!(
        built.get("pond_01").unwrap().as_deref(),
        Some(&["asv_x".to_string(), "asv_y".to_string()][..])
    );
}

#[test]
fn presence_sets_stay_sorted_and_stable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.pcl");
    File::create(&path)
        .unwrap()
        .write_all(generate_survey(9, 30, 5).as_bytes())
        .unwrap();
    let table = pcl::read_table(&path, ABUND_EPSILON).unwrap();

    let run1 = table.flip().presence_sets();
    let run2 = table.flip().presence_sets();
    assert_eq!(run1, run2);
    for carriers in &run1 {
        assert!(
            carriers.windows(2).all(|w| w[0] < w[1]),
            "carrier sets must be strictly ascending"
        );
    }
}

// ── Synthetic survey generator ──────────────────────────────────────

/// Deterministic PCL text: `n_features` rows over `n_samples` columns,
/// roughly 40% zeros, values drawn from an LCG stream.
fn generate_survey(n_samples: usize, n_features: usize, seed: u64) -> String {
    let mut rng = seed;
    let mut out = String::from("#ASV");
    for s in 0..n_samples {
        let _ = write!(out, "\tpond_{s:02}");
    }
    out.push('\n');
    for f in 0..n_features {
        let _ = write!(out, "asv_{f:03}");
        for _ in 0..n_samples {
            rng = rng.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let draw = (rng >> 33) % 100;
            if draw < 40 {
                out.push_str("\t0.0");
            } else {
                let _ = write!(out, "\t{}.{}", draw / 10, draw % 10);
            }
        }
        out.push('\n');
    }
    out
}
