//! Selection and copying of build artifacts between package checkouts.

use crate::domain::VersionSpec;
use crate::error::{ReleaseError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Path-suffix predicate deciding which files count as build artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFilter {
    suffixes: Vec<String>,
    max_depth: Option<usize>,
}

impl ArtifactFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArtifactFilter {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            max_depth: None,
        }
    }

    /// Only look `depth` levels below the source root; 1 means direct children
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Spec file, sysconfig files and both tarball spellings
    pub fn rpm(spec: &VersionSpec, package: &str) -> Self {
        ArtifactFilter::new([
            "sysconfig".to_string(),
            format!("{}.spec", package),
            spec.rpm_tarball(package),
            spec.legacy_rpm_tarball(),
        ])
    }

    /// Source description and orig tarball written by `dpkg-buildpackage`
    pub fn debian(spec: &VersionSpec, package: &str) -> Self {
        let version = spec.debian_version();
        ArtifactFilter::new([
            format!("{}_{}.dsc", package, version),
            format!("{}_{}.tar.gz", package, version),
        ])
    }

    pub fn union(mut self, other: ArtifactFilter) -> Self {
        for suffix in other.suffixes {
            if !self.suffixes.contains(&suffix) {
                self.suffixes.push(suffix);
            }
        }
        self
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
    }

    /// Relative paths of every matching file under `src`, without copying.
    ///
    /// Hidden directories such as `.osc` and `.git` are never descended into.
    pub fn matching(&self, src: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        let mut walker = WalkDir::new(src).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        let walker = walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            debug!(path = %entry.path().display(), "checking artifact");
            if !self.matches(entry.path()) {
                debug!("skipping");
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|e| ReleaseError::fs(entry.path(), std::io::Error::other(e)))?;
            found.push(relative.to_path_buf());
        }

        Ok(found)
    }

    /// Copy every matching file under `src` to the same relative path under
    /// `dst`, overwriting what is there.
    ///
    /// Returns the relative paths that were copied.
    pub fn copy_relevant(&self, src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
        let copied = self.matching(src)?;

        for relative in &copied {
            let target = dst.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ReleaseError::fs(parent, e))?;
            }
            fs::copy(src.join(relative), &target).map_err(|e| ReleaseError::fs(&target, e))?;
        }

        Ok(copied)
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_filter_matches() {
        let spec = VersionSpec::parse("1.28.3").unwrap();
        let filter = ArtifactFilter::rpm(&spec, "cri-o");
        assert!(filter.matches(Path::new("pkg/cri-o.spec")));
        assert!(filter.matches(Path::new("crio-network.sysconfig")));
        assert!(filter.matches(Path::new("cri-o-1.28.3.tar.gz")));
        assert!(filter.matches(Path::new("v1.28.3.tar.gz")));
        assert!(!filter.matches(Path::new("cri-o-1.28.2.tar.gz")));
        assert!(!filter.matches(Path::new("README.md")));
    }

    #[test]
    fn test_debian_filter_matches() {
        let spec = VersionSpec::parse("1.28.3").unwrap();
        let filter = ArtifactFilter::debian(&spec, "cri-o");
        assert!(filter.matches(Path::new("cri-o_1.28.3~0.dsc")));
        assert!(filter.matches(Path::new("cri-o_1.28.3~0.tar.gz")));
        assert!(!filter.matches(Path::new("cri-o_1.28.3~0_amd64.deb")));
    }

    #[test]
    fn test_union_deduplicates() {
        let filter = ArtifactFilter::new([".spec", "sysconfig"])
            .union(ArtifactFilter::new(["sysconfig", ".dsc"]));
        assert_eq!(filter.suffixes(), &[".spec", "sysconfig", ".dsc"]);
    }
}
