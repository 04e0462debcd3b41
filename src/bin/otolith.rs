// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command-line front end — build codes from a survey table, or compare
//! previously built codes against one.
//!
//! Encode mode writes `<table>.codes.txt`; supplying `--codes` switches to
//! decode mode and writes `<table>.<codes>.hits.txt`. Progress goes to
//! stderr, data only to the output file.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wetspring_otolith::config::{CodeParams, MetaMode};
use wetspring_otolith::decode::decode_table;
use wetspring_otolith::encode::encode_table;
use wetspring_otolith::error::Result;
use wetspring_otolith::io::{codes, hits, pcl};

const USAGE: &str = "\
otolith — hitting-set identification codes for marker tables

USAGE:
    otolith TABLE [options]

ARGS:
    TABLE                      tab-separated PCL table (.gz ok): rows are
                               features, columns are samples, both labelled

OPTIONS:
    -c, --codes PATH           codes file from an earlier run; switches to
                               decode mode (codes are compared to TABLE)
    -d, --abund-detect F       values >= F count as confidently present
                               (default 1e-20)
    -n, --abund-nondetect F    values < F count as confidently absent
                               (default 1e-20; encode only)
    -j, --jaccard-cutoff F     a chosen feature knocks out remaining
                               candidates with carrier sets this similar [0-1]
    -m, --min-code-size N      extend codes past uniqueness to N features
                               (default 1)
    -r, --ranking NAME         rarity | abundance_gap (default rarity)
    -e, --meta-mode NAME       off | relab | rpkm: parameter presets for
                               metagenomic tables (default off)
    -o, --output PATH          output file (default derived from input names)
    -h, --help                 print this help
";

#[derive(Debug, Clone)]
struct Config {
    table: PathBuf,
    codes: Option<PathBuf>,
    params: CodeParams,
    meta_mode: MetaMode,
    output: Option<PathBuf>,
}

fn take<'a>(
    args: &'a [String],
    index: &mut usize,
    flag: &str,
) -> std::result::Result<&'a str, String> {
    *index += 1;
    args.get(*index)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn take_f64(args: &[String], index: &mut usize, flag: &str) -> std::result::Result<f64, String> {
    let value = take(args, index, flag)?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {flag}: '{value}'"))
}

impl Config {
    fn parse(args: &[String]) -> std::result::Result<Self, String> {
        let mut table: Option<PathBuf> = None;
        let mut codes_path: Option<PathBuf> = None;
        let mut params = CodeParams::default();
        let mut meta_mode = MetaMode::Off;
        let mut output: Option<PathBuf> = None;

        let mut index = 0_usize;
        while index < args.len() {
            match args[index].as_str() {
                "-c" | "--codes" => {
                    codes_path = Some(PathBuf::from(take(args, &mut index, "--codes")?));
                }
                "-d" | "--abund-detect" => {
                    params.abund_detect = take_f64(args, &mut index, "--abund-detect")?;
                }
                "-n" | "--abund-nondetect" => {
                    params.abund_nondetect = take_f64(args, &mut index, "--abund-nondetect")?;
                }
                "-j" | "--jaccard-cutoff" => {
                    params.similarity_cutoff =
                        Some(take_f64(args, &mut index, "--jaccard-cutoff")?);
                }
                "-m" | "--min-code-size" => {
                    let value = take(args, &mut index, "--min-code-size")?;
                    params.min_code_size = value
                        .parse()
                        .map_err(|_| format!("invalid value for --min-code-size: '{value}'"))?;
                }
                "-r" | "--ranking" => {
                    params.ranking = take(args, &mut index, "--ranking")?
                        .parse()
                        .map_err(|e| format!("{e}"))?;
                }
                "-e" | "--meta-mode" => {
                    meta_mode = take(args, &mut index, "--meta-mode")?
                        .parse()
                        .map_err(|e| format!("{e}"))?;
                }
                "-o" | "--output" => {
                    output = Some(PathBuf::from(take(args, &mut index, "--output")?));
                }
                other if table.is_none() && !other.starts_with('-') => {
                    table = Some(PathBuf::from(other));
                }
                other => return Err(format!("unknown argument: {other}")),
            }
            index += 1;
        }

        let table = table.ok_or_else(|| "missing required TABLE argument".to_owned())?;
        Ok(Self {
            table,
            codes: codes_path,
            params,
            meta_mode,
            output,
        })
    }
}

/// File name up to its first `.`, the way survey outputs are chained.
fn path_stem(path: &Path) -> String {
    path.file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .split('.')
        .next()
        .unwrap_or("")
        .to_string()
}

fn default_output(table: &Path, codes: Option<&Path>) -> PathBuf {
    let mut parts = vec![path_stem(table)];
    match codes {
        None => parts.push("codes.txt".to_string()),
        Some(codes) => {
            parts.push(path_stem(codes));
            parts.push("hits.txt".to_string());
        }
    }
    PathBuf::from(parts.join("."))
}

fn run(config: &Config) -> Result<()> {
    let decoding = config.codes.is_some();
    let params = config
        .meta_mode
        .resolve(decoding)
        .unwrap_or_else(|| config.params.clone());
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config.table, config.codes.as_deref()));

    eprintln!("loading table file: {}", config.table.display());
    let table = pcl::read_table(&config.table, params.abund_nondetect)?;

    match &config.codes {
        None => {
            eprintln!("encoding the table");
            eprintln!("performing requested feature ranking: {}", params.ranking);
            let sample_codes = encode_table(&table, &params);
            codes::write_codes(&sample_codes, &output)?;
            eprintln!("wrote codes to: {}", output.display());
        }
        Some(codes_path) => {
            eprintln!("decoding the table");
            let sample_codes = codes::read_codes(codes_path)?;
            let sample_hits = decode_table(&table, &sample_codes, params.abund_detect);
            hits::write_hits(&sample_hits, &output)?;
            eprintln!("wrote hits to: {}", output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }
    let config = match Config::parse(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("otolith: {message}");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("otolith: {error}");
            ExitCode::from(1)
        }
    }
}
