//! Generation settings, loadable from a JSON file and overridable from the CLI.
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_SOURCE_DIRECTORY: &str = "src/main/jsonschema";
pub const DEFAULT_TARGET_DIRECTORY: &str = "target/generated-resources/hive";
pub const DEFAULT_MAX_DEPTH: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GenerationConfig {
    /// directories, files or quoted glob patterns to scan for schemas
    pub source_paths: Vec<String>,
    /// output root; each table lands at a path mirroring its source
    pub target_directory: PathBuf,
    /// bound on STRUCT nesting; also what stops self-referential schemas
    pub max_depth: usize,
    /// field names skipped at every depth
    pub exclusions: IndexSet<String>,
    pub source_extension: String,
    pub target_extension: String,
    /// generate tables on the rayon pool
    pub parallel: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            source_paths: vec![DEFAULT_SOURCE_DIRECTORY.to_string()],
            target_directory: PathBuf::from(DEFAULT_TARGET_DIRECTORY),
            max_depth: DEFAULT_MAX_DEPTH,
            exclusions: IndexSet::new(),
            source_extension: "json".to_string(),
            target_extension: "hql".to_string(),
            parallel: true,
        }
    }
}

impl GenerationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        from_str_with_path(&source).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn is_excluded(&self, field_id: &str) -> bool {
        self.exclusions.contains(field_id)
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> std::result::Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}
