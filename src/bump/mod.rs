//! Version bumps in the RPM and Debian packaging repositories
//!
//! Both flows patch the version-bearing files of their packaging repository,
//! let the native tooling fetch or build the sources, stage the resulting
//! artifacts into the minor-tier OBS package checkout and commit everywhere.

pub mod deb;
pub mod relocate;
pub mod rpm;

pub use deb::bump_deb;
pub use relocate::Relocation;
pub use rpm::bump_rpm;

use crate::command::{CommandRunner, Invocation};
use crate::config::Config;
use crate::domain::{Tier, VersionSpec};
use crate::error::Result;
use crate::lifecycle::ProjectLifecycle;
use crate::obs::PackageService;
use crate::warning::ReleaseWarning;
use std::path::{Path, PathBuf};

/// Everything a bump flow needs besides its repositories
pub struct BumpContext<'a, C: CommandRunner, S: PackageService> {
    pub spec: &'a VersionSpec,
    pub config: &'a Config,
    pub runner: &'a C,
    pub lifecycle: &'a ProjectLifecycle<S>,
}

impl<'a, C: CommandRunner, S: PackageService> BumpContext<'a, C, S> {
    pub fn new(
        spec: &'a VersionSpec,
        config: &'a Config,
        runner: &'a C,
        lifecycle: &'a ProjectLifecycle<S>,
    ) -> Self {
        BumpContext {
            spec,
            config,
            runner,
            lifecycle,
        }
    }

    pub fn dry_run(&self) -> bool {
        self.lifecycle.is_dry_run()
    }

    /// OBS checkout of the primary package in the release's minor-tier project
    pub fn obs_package_dir(&self) -> Result<PathBuf> {
        let pair = self.lifecycle.coordinates(self.spec, Tier::Minor)?;
        Ok(self.lifecycle.package_dir(&pair.new))
    }

    fn run<I, S2>(&self, program: &str, args: I, cwd: &Path) -> Result<String>
    where
        I: IntoIterator<Item = S2>,
        S2: Into<String>,
    {
        self.runner
            .run(&Invocation::new(program).args(args).current_dir(cwd))
    }
}

/// What a bump flow changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BumpReport {
    /// Upstream commit the release tag resolved to
    pub upstream_commit: Option<String>,
    /// Files rewritten in the packaging repository
    pub patched: Vec<PathBuf>,
    /// Artifacts staged into the OBS package checkout
    pub artifacts: Vec<PathBuf>,
    /// Entries committed to OBS; empty on dry runs
    pub committed: Vec<PathBuf>,
    pub warnings: Vec<ReleaseWarning>,
}
