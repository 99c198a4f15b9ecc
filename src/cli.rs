//! Minimal CLI: JSON Schema tree → Hive `CREATE TABLE` files (or stdout)
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::GenerationConfig;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Hive table definitions (JsonSerDe over NDJSON) from JSON Schema documents
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// debug-level diagnostics (ignored when RUST_LOG is set)
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// write one .hql file per schema under the target directory
    Generate(GenerateOut),
    /// print every table definition to stdout
    Print(PrintOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON config file; flags below override its values
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// One or more schema sources. May be directories, files or quoted glob patterns
    #[arg(long, short, num_args = 1..)]
    input: Vec<String>,

    /// STRUCT nesting bound
    #[arg(long)]
    max_depth: Option<usize>,

    /// field names to leave out at every depth
    #[arg(long = "exclude", num_args = 1..)]
    exclusions: Vec<String>,

    /// generate tables one at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// debugging: print the resolved configuration and stop
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output root (mirrors the source tree)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct PrintOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// defaults < config file < flags
    fn resolve(&self) -> anyhow::Result<GenerationConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => GenerationConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GenerationConfig::default(),
        };
        if !self.input.is_empty() {
            config.source_paths = self.input.clone();
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        config.exclusions.extend(self.exclusions.iter().cloned());
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let mut config = target.input_settings.resolve()?;
                if let Some(out) = target.out.as_ref() {
                    config.target_directory = out.clone();
                }
                // debug path
                if target.input_settings.no_op {
                    eprintln!("{config:#?}");
                    return Ok(());
                }
                let report = crate::pipeline::run(&config).context("generating tables")?;
                for failure in &report.failures {
                    eprintln!("{} {failure}", "failed:".red().bold());
                }
                eprintln!(
                    "{} {} table(s) into {}",
                    "wrote".green().bold(),
                    report.written.len(),
                    config.target_directory.display(),
                );
                if !report.is_success() {
                    bail!("{} table(s) could not be written", report.failures.len());
                }
            }
            Command::Print(target) => {
                let config = target.input_settings.resolve()?;
                if target.input_settings.no_op {
                    eprintln!("{config:#?}");
                    return Ok(());
                }
                let tables = crate::pipeline::render(&config).context("generating tables")?;
                for table in tables {
                    println!("-- {}", table.location);
                    println!("{}", table.ddl);
                }
            }
        }
        Ok(())
    }
}
