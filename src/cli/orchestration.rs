//! Main workflow orchestration logic
//!
//! Maps the actions requested on the command line onto the project lifecycle
//! and the bump flows. The binary only parses arguments and reports errors;
//! everything in between lives here so it can run against mocks.

use anyhow::{Context, Result};
use std::fmt;

use crate::bump::{self, BumpContext};
use crate::command::{CommandRunner, SystemRunner};
use crate::config::Config;
use crate::domain::VersionSpec;
use crate::git::{Git2Repository, Repository};
use crate::lifecycle::{ProjectLifecycle, Workspace};
use crate::obs::{OscService, PackageService};
use crate::ui;
use crate::warning::ReleaseWarning;

/// One step of a release run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Action {
    /// Check that the project being released from exists
    Validate,
    /// Create the new project from the previous one
    CreateProject,
    /// Check out the projects a run works in
    Populate,
    /// Bump the RPM spec repository and stage its sources
    BumpRpm,
    /// Bump the Debian packaging repository and stage the source package
    BumpDeb,
    /// Branch the patch project out of its minor project
    Branch,
}

impl Action {
    /// Whether the action creates or changes projects on the build service
    pub fn is_mutating(&self) -> bool {
        matches!(self, Action::CreateProject | Action::Branch)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Validate => "validate",
            Action::CreateProject => "create-project",
            Action::Populate => "populate",
            Action::BumpRpm => "bump-rpm",
            Action::BumpDeb => "bump-deb",
            Action::Branch => "branch",
        };
        f.write_str(name)
    }
}

/// Arguments for a release run
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseArgs {
    pub target_version: String,

    /// Run in the given order
    pub actions: Vec<Action>,

    /// Skip confirmation prompts
    pub force: bool,

    /// Read from the build service and write locally only
    pub dry_run: bool,
}

/// What one action did
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSummary {
    pub action: Action,
    pub lines: Vec<String>,
    pub warnings: Vec<ReleaseWarning>,
}

impl ActionSummary {
    fn new(action: Action, lines: Vec<String>, warnings: Vec<ReleaseWarning>) -> Self {
        ActionSummary {
            action,
            lines,
            warnings,
        }
    }
}

/// Source of the git repositories the bump flows work in
pub trait RepositorySource {
    type Repo: Repository;

    /// RPM spec repository
    fn rpm(&self) -> crate::Result<Self::Repo>;

    /// Upstream source repository, cloned when missing
    fn upstream(&self) -> crate::Result<Self::Repo>;

    /// Debian packaging repository, cloned when missing
    fn debian(&self) -> crate::Result<Self::Repo>;
}

/// Opens the repositories at the locations named by the configuration
pub struct GitRepositories<'a> {
    config: &'a Config,
}

impl<'a> GitRepositories<'a> {
    pub fn new(config: &'a Config) -> Self {
        GitRepositories { config }
    }
}

impl RepositorySource for GitRepositories<'_> {
    type Repo = Git2Repository;

    fn rpm(&self) -> crate::Result<Git2Repository> {
        Git2Repository::open(self.config.rpm_source_dir())
    }

    fn upstream(&self) -> crate::Result<Git2Repository> {
        Git2Repository::clone_or_open(
            self.config.upstream_repo_dir(),
            &self.config.upstream.repo_url,
        )
    }

    fn debian(&self) -> crate::Result<Git2Repository> {
        Git2Repository::clone_or_open(self.config.debian_repo_dir(), &self.config.debian.repo_url)
    }
}

/// Build the lifecycle for `config`'s package on top of `service`
pub fn lifecycle_for<S: PackageService>(
    config: &Config,
    service: S,
    dry_run: bool,
) -> ProjectLifecycle<S> {
    ProjectLifecycle::new(
        service,
        Workspace::new(&config.workspace.root),
        config.package.project_prefix.clone(),
        config.package.name.clone(),
    )
    .with_project_config(config.package.project_config.clone())
    .with_dry_run(dry_run)
}

/// A release of one version, ready to run actions
pub struct Release<'a, S: PackageService, C: CommandRunner, G: RepositorySource> {
    spec: VersionSpec,
    config: &'a Config,
    lifecycle: ProjectLifecycle<S>,
    runner: C,
    repos: G,
}

impl<'a, S, C, G> Release<'a, S, C, G>
where
    S: PackageService,
    C: CommandRunner,
    G: RepositorySource,
{
    pub fn new(
        spec: VersionSpec,
        config: &'a Config,
        lifecycle: ProjectLifecycle<S>,
        runner: C,
        repos: G,
    ) -> Self {
        Release {
            spec,
            config,
            lifecycle,
            runner,
            repos,
        }
    }

    pub fn spec(&self) -> &VersionSpec {
        &self.spec
    }

    /// Run a single action
    pub fn run(&self, action: Action) -> Result<ActionSummary> {
        let spec = &self.spec;
        match action {
            Action::Validate => {
                let pair = self.lifecycle.coordinates(spec, spec.default_tier())?;
                self.lifecycle.validate(&pair.old)?;
                Ok(ActionSummary::new(
                    action,
                    vec![format!("Found {}", pair.old)],
                    Vec::new(),
                ))
            }
            Action::CreateProject => {
                let pair = self.lifecycle.coordinates(spec, spec.default_tier())?;
                self.lifecycle.validate(&pair.old)?;
                let report = self.lifecycle.create_or_branch_project(&pair.old, &pair.new)?;
                let verb = if self.lifecycle.is_dry_run() {
                    "Would create"
                } else {
                    "Created"
                };
                let mut lines = vec![format!("{} {} from {}", verb, pair.new, pair.old)];
                lines.extend(ui::lifecycle_summary(&report));
                Ok(ActionSummary::new(action, lines, report.warnings))
            }
            Action::Populate => {
                self.lifecycle.populate_working_directories(spec)?;
                Ok(ActionSummary::new(
                    action,
                    vec![format!(
                        "Checkouts ready in {}",
                        self.lifecycle.workspace().root().display()
                    )],
                    Vec::new(),
                ))
            }
            Action::BumpRpm => {
                let rpm = self.repos.rpm().context("cannot open RPM repository")?;
                let upstream = self
                    .repos
                    .upstream()
                    .context("cannot open upstream repository")?;
                let report = bump::bump_rpm(&self.context(), &rpm, &upstream)?;
                Ok(ActionSummary::new(
                    action,
                    ui::bump_summary(&report),
                    report.warnings,
                ))
            }
            Action::BumpDeb => {
                let debian = self
                    .repos
                    .debian()
                    .context("cannot open Debian repository")?;
                let upstream = self
                    .repos
                    .upstream()
                    .context("cannot open upstream repository")?;
                let report = bump::bump_deb(&self.context(), &debian, &upstream)?;
                Ok(ActionSummary::new(
                    action,
                    ui::bump_summary(&report),
                    report.warnings,
                ))
            }
            Action::Branch => {
                let report = self.lifecycle.branch_patch_project(spec)?;
                Ok(ActionSummary::new(
                    action,
                    ui::lifecycle_summary(&report),
                    report.warnings,
                ))
            }
        }
    }

    fn context(&self) -> BumpContext<'_, C, S> {
        BumpContext::new(&self.spec, self.config, &self.runner, &self.lifecycle)
    }
}

/// Run every requested action against the real tools.
///
/// Mutating actions are confirmed interactively unless `force` is set;
/// declining stops the run without error.
///
/// # Returns
/// Summaries of the actions that ran, in order
pub fn run_release(args: &ReleaseArgs, config: &Config) -> Result<Vec<ActionSummary>> {
    let spec = VersionSpec::parse(&args.target_version)
        .with_context(|| format!("invalid target version '{}'", args.target_version))?;

    let runner = SystemRunner::new();
    let service = OscService::with_program(&runner, config.tools.osc.clone());
    let lifecycle = lifecycle_for(config, service, args.dry_run);
    let release = Release::new(spec, config, lifecycle, &runner, GitRepositories::new(config));

    if args.dry_run {
        ui::display_status("Dry run: nothing will be sent to the build service or committed");
    }

    let mut summaries = Vec::new();
    for &action in &args.actions {
        if action.is_mutating()
            && !args.force
            && !ui::confirm_action(&format!("Run {} for {}?", action, release.spec()))?
        {
            println!("Operation cancelled by user.");
            break;
        }

        ui::display_status(&format!("Running {}...", action));
        let summary = release
            .run(action)
            .with_context(|| format!("{} failed", action))?;
        ui::display_report(&format!("{} done", action), &summary.lines, &summary.warnings);
        summaries.push(summary);
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_action_names_match_cli_values() {
        for action in Action::value_variants() {
            let value = action.to_possible_value().unwrap();
            assert_eq!(value.get_name(), action.to_string());
        }
    }

    #[test]
    fn test_mutating_actions() {
        assert!(Action::CreateProject.is_mutating());
        assert!(Action::Branch.is_mutating());
        assert!(!Action::Validate.is_mutating());
        assert!(!Action::BumpRpm.is_mutating());
    }
}
