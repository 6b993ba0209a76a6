//! Build-service (OBS) operations abstraction layer
//!
//! The [PackageService] trait is the remote primitive the project lifecycle
//! drives: listing projects, checking out working copies, copying project
//! metadata, branching packages and committing package contents.
//!
//! - [osc::OscService]: drives the `osc` command line client
//! - [mock::MockPackageService]: in-memory service for tests
//!
//! Checkouts are always performed relative to an explicit workspace
//! directory passed by the caller.

pub mod mock;
pub mod osc;

pub use mock::MockPackageService;
pub use osc::OscService;

use crate::domain::ProjectCoordinate;
use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Remote package-repository operations
pub trait PackageService: Send + Sync {
    /// List entries under `path` (`/` lists projects), keeping only those
    /// containing `filter` when given
    fn list(&self, path: &str, filter: Option<&str>) -> Result<Vec<String>>;

    /// Check out `project` into `workspace/<project>`; `meta_only` skips
    /// package sources
    fn checkout_project(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        meta_only: bool,
    ) -> Result<()>;

    /// Check out one package into `workspace/<project>/<package>`
    fn checkout_package(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        package: &str,
    ) -> Result<()>;

    /// Bring an existing package checkout up to date with the remote
    fn update(&self, package_dir: &Path) -> Result<()>;

    /// Fetch the project metadata document
    fn project_meta(&self, project: &ProjectCoordinate) -> Result<String>;

    /// Replace the project metadata document, creating the project if needed
    fn put_project_meta(&self, project: &ProjectCoordinate, meta: &str) -> Result<()>;

    /// Replace the project configuration (prjconf) document
    fn set_project_config(&self, project: &ProjectCoordinate, config: &str) -> Result<()>;

    /// Branch `package` of `old` into `new`
    fn branch_package(
        &self,
        old: &ProjectCoordinate,
        package: &str,
        new: &ProjectCoordinate,
    ) -> Result<()>;

    /// Create a new package inside the checked-out project directory
    fn create_package(&self, project_dir: &Path, name: &str) -> Result<()>;

    /// Stage `paths` (relative to `package_dir`) and commit them as one change
    fn stage_and_commit(&self, package_dir: &Path, paths: &[PathBuf], message: &str)
        -> Result<()>;

    /// Copy `old`'s metadata to `new`, renaming the embedded project name
    fn copy_project_metadata(
        &self,
        old: &ProjectCoordinate,
        new: &ProjectCoordinate,
    ) -> Result<()> {
        let meta = self.project_meta(old)?;
        self.put_project_meta(new, &rewrite_project_name(&meta, new))
    }
}

impl<T: PackageService + ?Sized> PackageService for &T {
    fn list(&self, path: &str, filter: Option<&str>) -> Result<Vec<String>> {
        (**self).list(path, filter)
    }

    fn checkout_project(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        meta_only: bool,
    ) -> Result<()> {
        (**self).checkout_project(workspace, project, meta_only)
    }

    fn checkout_package(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        package: &str,
    ) -> Result<()> {
        (**self).checkout_package(workspace, project, package)
    }

    fn update(&self, package_dir: &Path) -> Result<()> {
        (**self).update(package_dir)
    }

    fn project_meta(&self, project: &ProjectCoordinate) -> Result<String> {
        (**self).project_meta(project)
    }

    fn put_project_meta(&self, project: &ProjectCoordinate, meta: &str) -> Result<()> {
        (**self).put_project_meta(project, meta)
    }

    fn set_project_config(&self, project: &ProjectCoordinate, config: &str) -> Result<()> {
        (**self).set_project_config(project, config)
    }

    fn branch_package(
        &self,
        old: &ProjectCoordinate,
        package: &str,
        new: &ProjectCoordinate,
    ) -> Result<()> {
        (**self).branch_package(old, package, new)
    }

    fn create_package(&self, project_dir: &Path, name: &str) -> Result<()> {
        (**self).create_package(project_dir, name)
    }

    fn stage_and_commit(
        &self,
        package_dir: &Path,
        paths: &[PathBuf],
        message: &str,
    ) -> Result<()> {
        (**self).stage_and_commit(package_dir, paths, message)
    }
}

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"<project\s+name="[^"]*""#).expect("valid pattern"))
}

/// Point a project metadata document at `project`
pub fn rewrite_project_name(meta: &str, project: &ProjectCoordinate) -> String {
    let replacement = format!(r#"<project name="{}""#, project);
    project_name_pattern()
        .replace_all(meta, regex::NoExpand(&replacement))
        .into_owned()
}
