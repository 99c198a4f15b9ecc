//! Library error type.
//!
//! Only conditions that stop a table (or the whole run) live here. Missing
//! types, dangling refs and unparsable schema documents are diagnostics.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // ————————————————————————————————————————————————————————————————————————
    // configuration
    // ————————————————————————————————————————————————————————————————————————
    #[error("invalid configuration ({path}): {message}")]
    Config { path: PathBuf, message: String },

    // ————————————————————————————————————————————————————————————————————————
    // discovery
    // ————————————————————————————————————————————————————————————————————————
    #[error("invalid source pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("glob pattern matched no files: {pattern}")]
    NoMatches { pattern: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ————————————————————————————————————————————————————————————————————————
    // output
    // ————————————————————————————————————————————————————————————————————————
    #[error("failed to write {target} (generated from {source_location}): {source}")]
    Write {
        source_location: String,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
