//! Filesystem layout of a corpus root.
//!
//! ```text
//! <root>/
//! ├── sources/<type>/<stem>.pdf|.html   # raw downloads
//! ├── extracted/<type>/<stem>.txt       # plain text or placeholder summary
//! ├── metadata/<type>/<stem>.json       # sidecars
//! ├── logs/                             # per-run log files and reports
//! ├── download_results.json
//! └── manifest.json
//! ```
//!
//! Items are keyed by `(resource type, filename stem)`.

use crate::models::ResourceType;
use std::io;
use std::path::{Path, PathBuf};

pub const TEXT_EXTENSION: &str = "txt";
pub const METADATA_EXTENSION: &str = "json";
/// Suffix of a download still in flight, appended to the full file name.
pub const PARTIAL_EXTENSION: &str = "part";

#[derive(Debug, Clone)]
pub struct CorpusLayout {
    root: PathBuf,
}

impl CorpusLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources_dir(&self, resource_type: ResourceType) -> PathBuf {
        self.root.join("sources").join(resource_type.as_str())
    }

    pub fn extracted_dir(&self, resource_type: ResourceType) -> PathBuf {
        self.root.join("extracted").join(resource_type.as_str())
    }

    pub fn metadata_dir(&self, resource_type: ResourceType) -> PathBuf {
        self.root.join("metadata").join(resource_type.as_str())
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn source_path(&self, resource_type: ResourceType, file_name: &str) -> PathBuf {
        self.sources_dir(resource_type).join(file_name)
    }

    pub fn extracted_path(&self, resource_type: ResourceType, stem: &str) -> PathBuf {
        self.extracted_dir(resource_type)
            .join(format!("{stem}.{TEXT_EXTENSION}"))
    }

    pub fn metadata_path(&self, resource_type: ResourceType, stem: &str) -> PathBuf {
        self.metadata_dir(resource_type)
            .join(format!("{stem}.{METADATA_EXTENSION}"))
    }

    /// Create the top-level directories plus the per-type ones for `types`.
    pub fn ensure_dirs(&self, types: &[ResourceType]) -> io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        for &t in types {
            std::fs::create_dir_all(self.sources_dir(t))?;
            std::fs::create_dir_all(self.extracted_dir(t))?;
            std::fs::create_dir_all(self.metadata_dir(t))?;
        }
        Ok(())
    }

    /// Whether any file under `sources/<type>/` has the stem `stem`.
    pub fn has_source(&self, resource_type: ResourceType, stem: &str) -> bool {
        let Ok(entries) = std::fs::read_dir(self.sources_dir(resource_type)) else {
            return false;
        };
        entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .any(|p| p.is_file() && !is_partial(&p) && file_stem(&p) == stem)
    }

    /// Render `path` relative to the root with `/` separators.
    ///
    /// Paths outside the root are rendered as given.
    pub fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }
}

/// Where a download to `dest` is written before it is complete:
/// `x.pdf` becomes `x.pdf.part`.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_EXTENSION);
    dest.with_file_name(name)
}

/// Whether `path` is an unfinished download left by an interrupted run.
pub fn is_partial(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == PARTIAL_EXTENSION)
}

/// The filename stem of `path`, or an empty string.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
