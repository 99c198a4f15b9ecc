use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Canonical address of a schema document; the store's index key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// absolute, normalized path (canonicalized when the file exists)
    File(PathBuf),
    /// any non-file URL; never fetched
    Remote(String),
}

impl Location {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Location::File(canonical_path(path.as_ref()))
    }

    /// Parse a location given as a `file://` URL, another URL, or a plain path.
    pub fn parse(text: &str) -> Self {
        if let Some(path) = text.strip_prefix("file://") {
            return Self::from_path(path);
        }
        if text.contains("://") {
            return Location::Remote(text.to_string());
        }
        Self::from_path(text)
    }

    pub fn scheme(&self) -> &str {
        match self {
            Location::File(_) => "file",
            Location::Remote(url) => url.split_once("://").map(|(scheme, _)| scheme).unwrap_or(""),
        }
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Location::File(path) => Some(path),
            Location::Remote(_) => None,
        }
    }

    /// Resolve the document part of a `$ref` (the text before `#`) against this location.
    pub fn join(&self, reference: &str) -> Location {
        if reference.is_empty() {
            return self.clone();
        }
        if reference.contains("://") {
            return Self::parse(reference);
        }
        match self {
            Location::File(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new("/"));
                Self::from_path(dir.join(reference))
            }
            Location::Remote(url) => Location::Remote(join_url(url, reference)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "file://{}", path.display()),
            Location::Remote(url) => f.write_str(url),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn canonical_path(path: &Path) -> PathBuf {
    if let Ok(path) = std::fs::canonicalize(path) {
        return path;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn join_url(base: &str, reference: &str) -> String {
    let authority = base.find("://").map(|i| i + 3).unwrap_or(0);
    if reference.starts_with('/') {
        let host_end = base[authority..]
            .find('/')
            .map(|i| authority + i)
            .unwrap_or(base.len());
        return format!("{}{reference}", &base[..host_end]);
    }
    match base[authority..].rfind('/') {
        Some(i) => format!("{}{reference}", &base[..authority + i + 1]),
        None => format!("{base}/{reference}"),
    }
}
