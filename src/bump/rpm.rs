use crate::artifacts::ArtifactFilter;
use crate::bump::{BumpContext, BumpReport};
use crate::command::CommandRunner;
use crate::domain::{BranchKind, VersionSpec};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::obs::PackageService;
use crate::patcher::{apply_replacements, ReplacementSet};
use crate::warning::ReleaseWarning;
use std::path::Path;
use tracing::{debug, info};

/// Spec file lines every release rewrites
pub fn spec_replacements(spec: &VersionSpec, commit: &str) -> ReplacementSet {
    ReplacementSet::new()
        .replace("Version: ", format!("Version:                {}", spec))
        .replace("Release: ", "Release:        0%{?dist}")
        .replace("%global commit0 ", format!("%global commit0 {}", commit))
}

/// Tag line only present in older spec files
pub fn legacy_spec_replacements(spec: &VersionSpec) -> ReplacementSet {
    ReplacementSet::new().replace(
        "%define built_tag ",
        format!("%define built_tag {}", spec.tag()),
    )
}

/// Bump the RPM spec repository to the release and stage its sources in OBS.
///
/// The spec repository must already have a branch for the release's minor
/// version; a new minor version needs that branch created by hand.
pub fn bump_rpm<R, U, C, S>(
    ctx: &BumpContext<'_, C, S>,
    rpm_repo: &R,
    upstream: &U,
) -> Result<BumpReport>
where
    R: Repository,
    U: Repository,
    C: CommandRunner,
    S: PackageService,
{
    let spec = ctx.spec;
    let tools = &ctx.config.tools;
    let rpm_dir = rpm_repo.workdir();
    let spec_file = ctx.config.spec_file();
    let spec_path = rpm_dir.join(&spec_file);
    let message = spec.bump_message();

    rpm_repo.checkout(&spec.branch_name(BranchKind::Rpm))?;
    let commit = upstream.rev_parse(&spec.tag())?;
    info!(tag = %spec.tag(), %commit, "resolved release commit");

    apply_replacements(&spec_path, &spec_replacements(spec, &commit))?;

    let mut warnings = Vec::new();
    match apply_replacements(&spec_path, &legacy_spec_replacements(spec)) {
        Ok(_) => {}
        Err(ReleaseError::IncompletePatch { path, missing }) => {
            debug!(?missing, "failed to replace legacy line");
            warnings.extend(
                missing
                    .into_iter()
                    .map(|key| ReleaseWarning::OptionalLineMissing {
                        path: path.clone(),
                        key,
                    }),
            );
        }
        Err(err) => return Err(err),
    }

    ctx.run(&tools.spectool, ["-g", spec_file.as_str()], rpm_dir)?;
    ctx.run(
        &tools.bumpspec,
        ["-c", message.as_str(), spec_file.as_str()],
        rpm_dir,
    )?;

    let obs_dir = ctx.obs_package_dir()?;
    let artifacts =
        ArtifactFilter::rpm(spec, &ctx.config.package.name).copy_relevant(rpm_dir, &obs_dir)?;

    let mut report = BumpReport {
        upstream_commit: Some(commit),
        patched: vec![spec_path.clone()],
        artifacts,
        warnings,
        ..Default::default()
    };

    if ctx.dry_run() {
        info!("dry run: skipping commits");
        return Ok(report);
    }

    rpm_repo.add(&spec_path)?;
    upload_sources(ctx, rpm_dir)?;
    rpm_repo.commit(&message)?;

    report.warnings.extend(ctx.lifecycle.refresh(&obs_dir));
    report.committed = ctx.lifecycle.commit_package_dir(&obs_dir, &message)?;
    Ok(report)
}

/// Upload the release tarball to the lookaside cache, trying the legacy
/// tarball name when the current one is not there.
fn upload_sources<C, S>(ctx: &BumpContext<'_, C, S>, rpm_dir: &Path) -> Result<()>
where
    C: CommandRunner,
    S: PackageService,
{
    let fedpkg = &ctx.config.tools.fedpkg;
    let tarball = ctx.spec.rpm_tarball(&ctx.config.package.name);

    match ctx.run(fedpkg, ["new-sources", tarball.as_str()], rpm_dir) {
        Ok(_) => Ok(()),
        Err(err) => {
            debug!(error = %err, "retrying with legacy tarball");
            let legacy = ctx.spec.legacy_rpm_tarball();
            ctx.run(fedpkg, ["new-sources", legacy.as_str()], rpm_dir)
                .map(|_| ())
        }
    }
}
