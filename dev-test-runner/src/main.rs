//! Golden-file runner: `fixtures/<case>/{config.json, schemas/, expected/}`.
//!
//! Each case is rendered in memory and compared against the checked-in `.hql`
//! files. Exits non-zero on any mismatch.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use jsonschema_hive::{pipeline, GenerationConfig};

fn main() -> Result<()> {
    let fixtures = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures"));

    let mut cases = std::fs::read_dir(&fixtures)
        .with_context(|| format!("reading {}", fixtures.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    cases.sort();

    let mut failures = 0usize;
    for case in &cases {
        failures += run_case(case)?;
    }
    if failures > 0 {
        eprintln!("{} {failures} mismatch(es)", "FAILED".red().bold());
        std::process::exit(1);
    }
    eprintln!("{} {} case(s)", "ok".green().bold(), cases.len());
    Ok(())
}

fn run_case(case: &Path) -> Result<usize> {
    let name = case.file_name().unwrap_or_default().to_string_lossy().to_string();
    let config_path = case.join("config.json");
    let mut config = if config_path.exists() {
        GenerationConfig::from_file(&config_path)?
    } else {
        GenerationConfig::default()
    };
    config.source_paths = vec![case.join("schemas").display().to_string()];
    config.target_directory = case.join("expected");

    let tables = pipeline::render(&config).with_context(|| format!("rendering case {name}"))?;
    let mut failures = 0;
    for table in tables {
        let label = format!("{name}/{}", table.table_id);
        let expected = match std::fs::read_to_string(&table.target) {
            Ok(expected) => expected,
            Err(error) => {
                eprintln!("{} {label}: no expected file {} ({error})", "✗".red(), table.target.display());
                failures += 1;
                continue;
            }
        };
        if expected == table.ddl {
            eprintln!("{} {label}", "✓".green());
            continue;
        }
        failures += 1;
        eprintln!("{} {label}", "✗".red());
        let first_diff = expected
            .lines()
            .zip(table.ddl.lines())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| expected.lines().count().min(table.ddl.lines().count()));
        eprintln!("    line {}:", first_diff + 1);
        eprintln!("    {} {}", "expected".yellow(), expected.lines().nth(first_diff).unwrap_or("<eof>"));
        eprintln!("    {} {}", "actual  ".yellow(), table.ddl.lines().nth(first_diff).unwrap_or("<eof>"));
    }
    Ok(failures)
}
