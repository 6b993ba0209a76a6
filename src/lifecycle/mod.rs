//! Project lifecycle on the build service
//!
//! Drives the sequence validate → create/branch project → copy package
//! contents → commit against a [PackageService]. Every step is safe to re-run:
//! checkouts and package creation are skipped when their directory already
//! exists in the [Workspace], so a run that failed half-way can simply be
//! started again.
//!
//! All failures are fatal except branching of auxiliary packages and
//! refreshing a package checkout, which are reported as warnings.

pub mod outcome;
pub mod workspace;

pub use outcome::{LifecycleReport, StepOutcome};
pub use workspace::Workspace;

use crate::artifacts::ArtifactFilter;
use crate::domain::{CoordinatePair, ProjectCoordinate, Tier, VersionSpec};
use crate::error::{ReleaseError, Result};
use crate::obs::PackageService;
use crate::warning::ReleaseWarning;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Drives project creation and branching for one primary package
pub struct ProjectLifecycle<S: PackageService> {
    service: S,
    workspace: Workspace,
    prefix: String,
    package: String,
    project_config: String,
    dry_run: bool,
}

impl<S: PackageService> ProjectLifecycle<S> {
    pub fn new(
        service: S,
        workspace: Workspace,
        prefix: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        ProjectLifecycle {
            service,
            workspace,
            prefix: prefix.into(),
            package: package.into(),
            project_config: String::new(),
            dry_run: false,
        }
    }

    /// Project configuration written to every new project
    pub fn with_project_config(mut self, config: impl Into<String>) -> Self {
        self.project_config = config.into();
        self
    }

    /// Only read from the build service and write locally.
    ///
    /// Metadata, project config, branches and commits are logged instead of
    /// sent.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn coordinates(&self, spec: &VersionSpec, tier: Tier) -> Result<CoordinatePair> {
        spec.coordinates_for(&self.prefix, tier)
    }

    /// Checkout directory of the primary package in `project`
    pub fn package_dir(&self, project: &ProjectCoordinate) -> PathBuf {
        self.workspace.package_dir(project, &self.package)
    }

    /// Fail with `ProjectNotFound` unless `old` exists on the build service
    pub fn validate(&self, old: &ProjectCoordinate) -> Result<()> {
        if self.project_exists(old)? {
            info!(project = %old, "project exists");
            Ok(())
        } else {
            Err(ReleaseError::ProjectNotFound(old.to_string()))
        }
    }

    fn project_exists(&self, project: &ProjectCoordinate) -> Result<bool> {
        let projects = self.service.list("/", Some(self.prefix.as_str()))?;
        debug!(?projects, "projects under prefix");
        Ok(projects.iter().any(|p| p == project.as_str()))
    }

    /// Create `new` from `old`: metadata, project config, package branches,
    /// local checkout and the primary package.
    ///
    /// In dry-run mode nothing is written to the build service. The local
    /// checkout is only made when `new` already exists there.
    pub fn create_or_branch_project(
        &self,
        old: &ProjectCoordinate,
        new: &ProjectCoordinate,
    ) -> Result<LifecycleReport> {
        let (branched, warnings) = if self.dry_run {
            let packages = self.branch_candidates(old)?;
            info!(
                %old,
                %new,
                ?packages,
                "dry run: skipping metadata, project config and branches"
            );
            (Vec::new(), Vec::new())
        } else {
            info!(%old, %new, "creating project");
            self.service.copy_project_metadata(old, new)?;
            self.service.set_project_config(new, &self.project_config)?;
            self.branch_packages(old, new).into_result()?
        };

        self.workspace.ensure()?;
        if self.dry_run && !self.workspace.has_checkout(new) && !self.project_exists(new)? {
            info!(project = %new, "dry run: project not created, skipping checkout");
            return Ok(LifecycleReport {
                branched,
                warnings,
                ..Default::default()
            });
        }
        self.checkout_if_absent(new, true)?;

        let created_package = if self.package_dir(new).exists() {
            debug!(package = %self.package, "package already present");
            false
        } else {
            self.service
                .create_package(&self.workspace.project_dir(new), &self.package)?;
            true
        };

        Ok(LifecycleReport {
            branched,
            created_package,
            warnings,
            ..Default::default()
        })
    }

    /// Branch every package of `old` except the primary one into `new`.
    ///
    /// The primary package is never branched so edits to the new release do
    /// not leak into the old one. A failing branch is recorded and the loop
    /// moves on; only failing to list `old` is fatal.
    pub fn branch_packages(
        &self,
        old: &ProjectCoordinate,
        new: &ProjectCoordinate,
    ) -> StepOutcome<Vec<String>> {
        let packages = match self.branch_candidates(old) {
            Ok(packages) => packages,
            Err(err) => return StepOutcome::FatalFailure(err),
        };

        let mut branched = Vec::new();
        let mut warnings = Vec::new();
        for package in &packages {
            match self.service.branch_package(old, package, new) {
                Ok(()) => {
                    debug!(%package, "branched");
                    branched.push(package.clone());
                }
                Err(err) => {
                    warn!(%package, error = %err, "failed to branch");
                    warnings.push(ReleaseWarning::BranchFailed {
                        package: package.clone(),
                        from: old.to_string(),
                        to: new.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        StepOutcome::from_parts(branched, warnings)
    }

    /// Packages of `old` other than the primary one
    fn branch_candidates(&self, old: &ProjectCoordinate) -> Result<Vec<String>> {
        let mut packages = self.service.list(old.as_str(), None)?;
        packages.retain(|p| *p != self.package);
        Ok(packages)
    }

    /// Copy the primary package's artifacts from `old` to `new` and commit.
    ///
    /// A dry run without a checkout of `new` lists what would be copied.
    pub fn copy_package_contents(
        &self,
        old: &ProjectCoordinate,
        new: &ProjectCoordinate,
        filter: &ArtifactFilter,
        message: &str,
    ) -> Result<LifecycleReport> {
        self.workspace.ensure()?;
        self.checkout_if_absent(old, false)?;
        self.package_checkout_if_absent(old)?;

        if self.dry_run && !self.workspace.has_checkout(new) {
            let copied = filter.matching(&self.package_dir(old))?;
            info!(%new, ?copied, "dry run: no checkout, skipping copy");
            return Ok(LifecycleReport {
                copied,
                ..Default::default()
            });
        }
        self.checkout_if_absent(new, false)?;

        let new_dir = self.package_dir(new);
        let mut warnings = Vec::new();
        warnings.extend(self.refresh(&new_dir));

        debug!(%old, %new, "copying package contents");
        let copied = filter.copy_relevant(&self.package_dir(old), &new_dir)?;
        let committed = self.commit_package_dir(&new_dir, message)?;

        Ok(LifecycleReport {
            copied,
            committed,
            warnings,
            ..Default::default()
        })
    }

    /// Make sure checkouts exist for the projects a run may branch from.
    ///
    /// A minor upgrade needs the previous and the new minor-tier project; the
    /// current minor-tier project is always needed as the parent of patch
    /// branches.
    pub fn populate_working_directories(&self, spec: &VersionSpec) -> Result<()> {
        self.workspace.ensure()?;

        if spec.is_minor_upgrade() {
            let pair = self.coordinates(spec, Tier::Minor)?;
            self.checkout_if_absent(&pair.old, false)?;
            self.checkout_if_absent(&pair.new, false)?;
        }

        let current = ProjectCoordinate::minor_tier(&self.prefix, spec.major(), spec.minor());
        self.checkout_if_absent(&current, false)
    }

    /// Validate the previous minor-tier project, then create the new one
    pub fn create_minor_project(&self, spec: &VersionSpec) -> Result<LifecycleReport> {
        let pair = self.coordinates(spec, Tier::Minor)?;
        self.validate(&pair.old)?;
        self.create_or_branch_project(&pair.old, &pair.new)
    }

    /// Branch the patch-tier project for `spec` out of its minor-tier parent
    /// and copy the packaging artifacts over.
    pub fn branch_patch_project(&self, spec: &VersionSpec) -> Result<LifecycleReport> {
        let pair = self.coordinates(spec, Tier::PatchBranch)?;
        self.validate(&pair.old)?;

        let created = self.create_or_branch_project(&pair.old, &pair.new)?;
        let filter = ArtifactFilter::rpm(spec, &self.package)
            .union(ArtifactFilter::debian(spec, &self.package));
        let copied =
            self.copy_package_contents(&pair.old, &pair.new, &filter, &spec.bump_message())?;

        Ok(created.merge(copied))
    }

    /// Refresh a package checkout, reporting failure as a warning
    pub fn refresh(&self, package_dir: &Path) -> Option<ReleaseWarning> {
        match self.service.update(package_dir) {
            Ok(()) => None,
            Err(err) => {
                warn!(path = %package_dir.display(), error = %err, "failed to update");
                Some(ReleaseWarning::UpdateFailed {
                    path: package_dir.to_path_buf(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Stage and commit every entry of a package checkout as one change.
    ///
    /// Returns the staged entries, or nothing in dry-run mode.
    pub fn commit_package_dir(&self, package_dir: &Path, message: &str) -> Result<Vec<PathBuf>> {
        let entries = workspace::committable_entries(package_dir)?;
        if self.dry_run {
            info!(path = %package_dir.display(), ?entries, "dry run: skipping commit");
            return Ok(Vec::new());
        }

        self.service.stage_and_commit(package_dir, &entries, message)?;
        info!(path = %package_dir.display(), message, "committed package");
        Ok(entries)
    }

    /// A project checked out metadata-only has no package sources yet
    fn package_checkout_if_absent(&self, project: &ProjectCoordinate) -> Result<()> {
        if self.package_dir(project).exists() {
            return Ok(());
        }
        self.service
            .checkout_package(self.workspace.root(), project, &self.package)
    }

    fn checkout_if_absent(&self, project: &ProjectCoordinate, meta_only: bool) -> Result<()> {
        if self.workspace.has_checkout(project) {
            debug!(%project, "checkout present");
            return Ok(());
        }
        self.service
            .checkout_project(self.workspace.root(), project, meta_only)
    }
}
