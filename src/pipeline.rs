//! Batch driver: discover → load → generate every table → write.
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::discover::{discover, SourceFile};
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::schema::{Location, SchemaDocument, SchemaStore};

#[derive(Debug, Clone)]
pub struct RenderedTable {
    pub location: Location,
    pub table_id: String,
    pub target: PathBuf,
    pub ddl: String,
}

#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<PathBuf>,
    pub failures: Vec<Error>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generate every discovered table without touching the target directory.
pub fn render(config: &GenerationConfig) -> Result<Vec<RenderedTable>> {
    info!("Seeded with {} source paths", config.source_paths.len());
    let sources = discover(config)?;
    info!("Resolved {} schema files", sources.len());
    let store = SchemaStore::load(sources.iter().map(|source| &source.path));
    info!("Identified {} schema documents", store.len());
    if store.is_empty() {
        warn!("no schema documents could be loaded");
    }
    Ok(render_store(&store, &sources, config))
}

/// Tables for the store's `file` documents that came from `sources`, in store order.
///
/// Documents only pulled in through `$ref` get no table of their own.
pub fn render_store(
    store: &SchemaStore,
    sources: &[SourceFile],
    config: &GenerationConfig,
) -> Vec<RenderedTable> {
    let by_location = sources
        .iter()
        .map(|source| (Location::from_path(&source.path), source))
        .collect::<HashMap<_, _>>();
    let jobs = store
        .documents()
        .filter(|document| {
            if document.location().scheme() != "file" {
                debug!(location = %document.location(), "not a file schema, skipping");
                return false;
            }
            true
        })
        .filter_map(|document| match by_location.get(document.location()) {
            Some(source) => Some((document, *source)),
            None => {
                debug!(location = %document.location(), "referenced only, no table");
                None
            }
        })
        .collect::<Vec<_>>();

    let generator = Generator::new(store, config);
    let render_one = |&(document, source): &(&SchemaDocument, &SourceFile)| {
        match document.title() {
            Some(title) => info!(title, "Processing {}", source.relative().display()),
            None => info!("Processing {}", source.relative().display()),
        }
        let table_id = source.table_id();
        RenderedTable {
            location: document.location().clone(),
            ddl: generator.generate_table(document, &table_id),
            target: source.target(config),
            table_id,
        }
    };
    if config.parallel {
        jobs.par_iter().map(render_one).collect()
    } else {
        jobs.iter().map(render_one).collect()
    }
}

/// Render and write every table. A failed write only loses that table.
pub fn run(config: &GenerationConfig) -> Result<Report> {
    let tables = render(config)?;
    let mut report = Report::default();
    for table in tables {
        match write_atomic(&table.target, &table.ddl) {
            Ok(()) => {
                info!("Wrote {}", table.target.display());
                report.written.push(table.target);
            }
            Err(source) => report.failures.push(Error::Write {
                source_location: table.location.to_string(),
                target: table.target,
                source,
            }),
        }
    }
    Ok(report)
}

/// Write through a temp file in the target's directory, then rename over the target.
pub fn write_atomic(target: &Path, contents: &str) -> std::io::Result<()> {
    let parent = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;
    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(contents.as_bytes())?;
    file.persist(target).map_err(|error| error.error)?;
    Ok(())
}
