// SPDX-License-Identifier: AGPL-3.0-or-later
//! Validation binary: identification codes over the demo pond surveys.
//!
//! Baselines were worked out by hand on the two small tables in `demos/`:
//! the greedy builder's step-by-step intersections, the decode hit lists,
//! and the confusion tallies are all reproducible on paper. Exit codes:
//! 0 = all checks passed, 1 = at least one failed, 2 = demo data missing.

use std::path::Path;
use std::process;

use wetspring_otolith::config::{CodeParams, MetaMode};
use wetspring_otolith::decode::{decode_table, Confusion, SampleHits};
use wetspring_otolith::encode::{encode_table, SampleCodes};
use wetspring_otolith::io::{pcl, NA_TOKEN};
use wetspring_otolith::rank::Ranking;
use wetspring_otolith::table::{jaccard, FeatureTable};
use wetspring_otolith::validation::{data_dir, exit_skipped, Validator};

fn load(path: &Path, cutoff: f64) -> FeatureTable {
    match pcl::read_table(path, cutoff) {
        Ok(table) => table,
        Err(error) => {
            eprintln!("failed to load {}: {error}", path.display());
            process::exit(1);
        }
    }
}

fn code_line(codes: &SampleCodes, sample: &str) -> String {
    match codes.get(sample) {
        Some(Some(features)) => features.join("\t"),
        Some(None) => NA_TOKEN.to_string(),
        None => "<missing>".to_string(),
    }
}

fn hits_line(hits: &SampleHits, sample: &str) -> String {
    match hits.get(sample) {
        Some(Some(matched)) => matched.join("\t"),
        Some(None) => NA_TOKEN.to_string(),
        None => "<missing>".to_string(),
    }
}

fn null_count(codes: &SampleCodes) -> usize {
    codes.iter().filter(|(_, code)| code.is_none()).count()
}

#[allow(clippy::too_many_lines)]
fn main() {
    let mut v = Validator::new("validate_codes — demo pond surveys");

    let dir = data_dir("OTOLITH_DEMO_DIR", "demos");
    let baseline_path = dir.join("pond_baseline.pcl");
    let followup_path = dir.join("pond_followup.pcl");
    if !baseline_path.exists() || !followup_path.exists() {
        exit_skipped("demo tables not found (set OTOLITH_DEMO_DIR)");
    }

    let params = CodeParams::default();
    let baseline = load(&baseline_path, params.abund_nondetect);
    let followup = load(&followup_path, params.abund_nondetect);

    v.section("── load: demo tables ──");
    v.check_count("baseline samples", baseline.n_samples(), 4);
    v.check_count("baseline features", baseline.n_features(), 7);
    v.check_count("followup samples", followup.n_samples(), 4);

    v.section("── encode: baseline survey, rarity ranking ──");
    let codes = encode_table(&baseline, &params);
    v.check_count("samples coded", codes.len(), 4);
    v.check_count("null codes", null_count(&codes), 0);
    v.check_str("pond_A code", &code_line(&codes, "pond_A"), "asv_005");
    v.check_str("pond_B code", &code_line(&codes, "pond_B"), "asv_007\tasv_004");
    v.check_str("pond_C code", &code_line(&codes, "pond_C"), "asv_007\tasv_006");
    v.check_str("pond_D code", &code_line(&codes, "pond_D"), "asv_006\tasv_004");

    v.section("── encode: baseline survey, abundance-gap ranking ──");
    let gap_params = CodeParams {
        ranking: Ranking::AbundanceGap,
        ..CodeParams::default()
    };
    let gap_codes = encode_table(&baseline, &gap_params);
    v.check_str("pond_A gap code", &code_line(&gap_codes, "pond_A"), "asv_005");
    v.check_str(
        "pond_B gap code",
        &code_line(&gap_codes, "pond_B"),
        "asv_007\tasv_004",
    );
    // pond_D's 6.5 sits above pond_C's 6.0, so asv_006 has the widest gap
    // for pond_C and is tried first, reversing the rarity order
    v.check_str(
        "pond_C gap code",
        &code_line(&gap_codes, "pond_C"),
        "asv_006\tasv_007",
    );
    v.check_str(
        "pond_D gap code",
        &code_line(&gap_codes, "pond_D"),
        "asv_006\tasv_004",
    );

    v.section("── decode: codes against their own survey ──");
    let self_hits = decode_table(&baseline, &codes, params.abund_detect);
    let self_confusion = Confusion::classify(&self_hits);
    v.check_count("unique hits", self_confusion.unique_hit, 4);
    v.check_count("confusion total", self_confusion.total(), 4);

    v.section("── decode: codes against the followup survey ──");
    let hits = decode_table(&followup, &codes, params.abund_detect);
    let confusion = Confusion::classify(&hits);
    v.check_count("1|TP", confusion.unique_hit, 2);
    v.check_count("2|TP+FP", confusion.ambiguous_hit, 1);
    v.check_count("3|FN+FP", confusion.wrong_hit, 1);
    v.check_count("4|FN", confusion.no_hit, 0);
    v.check_count("5|NA", confusion.no_code, 0);
    v.check_count("confusion total", confusion.total(), 4);
    // pond_B's asv_004 died off; only pond_D still carries the pair
    v.check_str("pond_B hit list", &hits_line(&hits, "pond_B"), "pond_D");
    // pond_D picked up asv_007, so pond_C's code now matches both ponds
    v.check_str(
        "pond_C hit list",
        &hits_line(&hits, "pond_C"),
        "pond_C\tpond_D",
    );
    v.check_str("pond_A hit list", &hits_line(&hits, "pond_A"), "pond_A");

    v.section("── knockout: 0.3 cutoff strips the shared markers ──");
    let knockout_params = CodeParams {
        similarity_cutoff: Some(0.3),
        ..CodeParams::default()
    };
    let knocked = encode_table(&baseline, &knockout_params);
    v.check_count("codes surviving knockout", 4 - null_count(&knocked), 1);
    v.check_str("pond_A code", &code_line(&knocked, "pond_A"), "asv_005");

    v.section("── minimum length: pad past uniqueness ──");
    let padded_params = CodeParams {
        min_code_size: 3,
        ..CodeParams::default()
    };
    let padded = encode_table(&baseline, &padded_params);
    v.check_str(
        "pond_A padded code",
        &code_line(&padded, "pond_A"),
        "asv_005\tasv_003\tasv_002",
    );

    v.section("── meta mode: relab preset ──");
    let relab = match MetaMode::Relab.resolve(false) {
        Some(params) => params,
        None => {
            eprintln!("relab preset did not resolve");
            process::exit(1);
        }
    };
    let relab_table = load(&baseline_path, relab.abund_nondetect);
    let relab_codes = encode_table(&relab_table, &relab);
    v.check_str(
        "pond_A relab code",
        &code_line(&relab_codes, "pond_A"),
        "asv_005\tasv_001\tasv_003\tasv_002",
    );
    v.check_count("relab null codes", null_count(&relab_codes), 0);

    v.section("── degenerate surveys ──");
    let twins = match FeatureTable::from_rows(
        &["twin_1", "twin_2"],
        &[("asv_a", &[1.0, 1.0]), ("asv_b", &[2.0, 2.0])],
        0.5,
    ) {
        Ok(table) => table,
        Err(error) => {
            eprintln!("failed to build twin table: {error}");
            process::exit(1);
        }
    };
    let twin_codes = encode_table(&twins, &params);
    v.check_count("identical ponds yield null codes", null_count(&twin_codes), 2);

    v.section("── jaccard spot checks ──");
    v.check("identical sets", jaccard(&[1, 2, 3], &[1, 2, 3]), 1.0, 0.0);
    v.check("one of three shared", jaccard(&[0, 1], &[1, 2]), 1.0 / 3.0, 1e-12);
    v.check("disjoint sets", jaccard(&[0], &[1]), 0.0, 0.0);

    v.finish()
}
