//! Source discovery: config source paths → the ordered list of schema files,
//! each paired with the root its output path is mirrored from.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// prefix dropped from `path` when naming the table and its output file
    pub root: PathBuf,
}

impl SourceFile {
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.root).unwrap_or(&self.path)
    }

    /// `objects/person.json` → `objects_person`
    pub fn table_id(&self) -> String {
        self.relative()
            .with_extension("")
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn target(&self, config: &GenerationConfig) -> PathBuf {
        config
            .target_directory
            .join(self.relative().with_extension(&config.target_extension))
    }
}

pub fn discover(config: &GenerationConfig) -> Result<Vec<SourceFile>> {
    let mut out = Vec::<SourceFile>::new();
    for raw in &config.source_paths {
        let pattern = raw.strip_prefix("file://").unwrap_or(raw);
        if pattern.contains("://") {
            warn!(source = pattern, "only file sources are scanned, skipping");
            continue;
        }
        if has_glob_chars(pattern) {
            let root = glob_root(pattern);
            let entries = glob::glob(pattern).map_err(|error| Error::Pattern {
                pattern: pattern.to_string(),
                message: error.to_string(),
            })?;
            let mut matched_any = false;
            for entry in entries {
                let path = entry.map_err(|error| Error::Pattern {
                    pattern: pattern.to_string(),
                    message: error.to_string(),
                })?;
                matched_any = true;
                if path.is_dir() {
                    walk(&path, &root, &config.source_extension, &mut out)?;
                } else {
                    out.push(SourceFile { path, root: root.clone() });
                }
            }
            if !matched_any {
                return Err(Error::NoMatches { pattern: pattern.to_string() });
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                walk(&path, &path, &config.source_extension, &mut out)?;
            } else if path.exists() {
                let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                out.push(SourceFile { path, root });
            } else {
                warn!(source = pattern, "source path does not exist, skipping");
            }
        }
    }

    let mut seen = HashSet::<PathBuf>::new();
    out.retain(|source| {
        let key = std::fs::canonicalize(&source.path).unwrap_or_else(|_| source.path.clone());
        seen.insert(key)
    });
    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn has_glob_chars(s: &str) -> bool {
    // Minimal glob detection for the `glob` crate syntax.
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Leading path components free of glob syntax.
fn glob_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in Path::new(pattern).components() {
        if has_glob_chars(&component.as_os_str().to_string_lossy()) {
            break;
        }
        root.push(component);
    }
    root
}

fn walk(dir: &Path, root: &Path, extension: &str, out: &mut Vec<SourceFile>) -> Result<()> {
    let io_error = |source| Error::Io { path: dir.to_path_buf(), source };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_error)?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk(&path, root, extension, out)?;
        } else if path.extension().is_some_and(|ext| ext == extension) {
            out.push(SourceFile { path, root: root.to_path_buf() });
        }
    }
    Ok(())
}
