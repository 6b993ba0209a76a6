use crate::domain::ProjectCoordinate;
use crate::error::{ReleaseError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Tool-internal entries that are never staged from a package checkout
const INTERNAL_ENTRIES: &[&str] = &[".osc", "_meta"];

/// Local directory tree mirroring build-service checkouts.
///
/// Project `p` lives at `<root>/p` and its package `k` at `<root>/p/k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it is missing
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| ReleaseError::fs(&self.root, e))
    }

    pub fn project_dir(&self, project: &ProjectCoordinate) -> PathBuf {
        self.root.join(project.as_str())
    }

    pub fn package_dir(&self, project: &ProjectCoordinate, package: &str) -> PathBuf {
        self.project_dir(project).join(package)
    }

    pub fn has_checkout(&self, project: &ProjectCoordinate) -> bool {
        self.project_dir(project).exists()
    }
}

/// Top-level entries of a package checkout that belong in a commit, sorted
pub fn committable_entries(package_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(package_dir).map_err(|e| ReleaseError::fs(package_dir, e))? {
        let entry = entry.map_err(|e| ReleaseError::fs(package_dir, e))?;
        let name = entry.file_name();
        if INTERNAL_ENTRIES.iter().any(|internal| name == *internal) {
            continue;
        }
        entries.push(PathBuf::from(name));
    }
    entries.sort();
    Ok(entries)
}
