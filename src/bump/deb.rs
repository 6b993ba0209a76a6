use crate::artifacts::ArtifactFilter;
use crate::bump::{BumpContext, BumpReport, Relocation};
use crate::command::CommandRunner;
use crate::domain::BranchKind;
use crate::error::Result;
use crate::git::Repository;
use crate::obs::PackageService;
use crate::patcher::{apply_replacements, replace_in_file, ReplacementSet};
use tracing::{info, warn};

/// Bump the Debian packaging repository, build the source package against
/// the upstream release tag and stage it in OBS.
///
/// The upstream checkout is returned to its default branch afterwards, also
/// when the bump fails.
pub fn bump_deb<D, U, C, S>(
    ctx: &BumpContext<'_, C, S>,
    debian: &D,
    upstream: &U,
) -> Result<BumpReport>
where
    D: Repository,
    U: Repository,
    C: CommandRunner,
    S: PackageService,
{
    debian.checkout(&ctx.spec.branch_name(BranchKind::Debian))?;
    upstream.checkout(&ctx.spec.tag())?;

    let result = build(ctx, debian, upstream);
    let restored = upstream.checkout(&ctx.config.upstream.default_branch);

    match (result, restored) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), restored) => {
            if let Err(restore_err) = restored {
                warn!(error = %restore_err, "failed to restore upstream branch");
            }
            Err(err)
        }
    }
}

fn build<D, U, C, S>(
    ctx: &BumpContext<'_, C, S>,
    debian: &D,
    upstream: &U,
) -> Result<BumpReport>
where
    D: Repository,
    U: Repository,
    C: CommandRunner,
    S: PackageService,
{
    let spec = ctx.spec;
    let tools = &ctx.config.tools;
    let message = spec.bump_message();
    let packaging = debian.workdir().join("debian");
    let changelog = packaging.join("changelog");
    let rules = packaging.join("rules");

    ctx.run(
        &tools.dch,
        [
            "--newversion".to_string(),
            spec.debian_version(),
            "-M".to_string(),
            "-m".to_string(),
            message.clone(),
        ],
        debian.workdir(),
    )?;
    replace_in_file(&changelog, "UNRELEASED", "stable")?;
    apply_replacements(
        &rules,
        &ReplacementSet::new().replace("UPSTREAM_TAG", format!("UPSTREAM_TAG={}", spec.tag())),
    )?;

    if !ctx.dry_run() {
        debian.add(&rules)?;
        debian.add(&changelog)?;
        debian.commit(&message)?;
    }

    let relocated = upstream.workdir().join("debian");
    let relocation = Relocation::acquire(&packaging, &relocated)?;
    let built = ctx.run(
        &tools.dpkg_buildpackage,
        ["-us", "-uc", "-d"],
        upstream.workdir(),
    );
    let released = relocation.release();
    if let Err(err) = built {
        if let Err(restore_err) = released {
            warn!(
                error = %restore_err,
                path = %relocated.display(),
                "failed to return debian directory, move it back to {}",
                packaging.display()
            );
        }
        return Err(err);
    }
    released?;
    info!(version = %spec.debian_version(), "built source package");

    let obs_dir = ctx.obs_package_dir()?;
    let artifacts = ArtifactFilter::debian(spec, &ctx.config.package.name)
        .with_max_depth(1)
        .copy_relevant(&ctx.config.upstream_parent_dir(), &obs_dir)?;
    let committed = ctx.lifecycle.commit_package_dir(&obs_dir, &message)?;

    Ok(BumpReport {
        upstream_commit: None,
        patched: vec![changelog, rules],
        artifacts,
        committed,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Invocation, MockRunner};
    use crate::config::Config;
    use crate::domain::VersionSpec;
    use crate::error::ReleaseError;
    use crate::git::MockRepository;
    use crate::lifecycle::{ProjectLifecycle, Workspace};
    use crate::obs::MockPackageService;
    use std::fs;
    use std::io::{self, Write};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
        debian: MockRepository,
        upstream: MockRepository,
        parent: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("cri-o-upstream");
        let upstream_dir = parent.join("cri-o");
        fs::create_dir_all(&upstream_dir).unwrap();

        let debian_dir = dir.path().join("debian").join("cri-o");
        let packaging = debian_dir.join("debian");
        fs::create_dir_all(&packaging).unwrap();
        fs::write(
            packaging.join("changelog"),
            "cri-o (1.28.3~0) UNRELEASED; urgency=medium\n",
        )
        .unwrap();
        fs::write(packaging.join("rules"), "export UPSTREAM_TAG\n").unwrap();

        let mut config = Config::default();
        config.workspace.root = dir.path().join("work");
        config.package.project_prefix = "prefix".to_string();
        config.upstream.repo_dir = Some(upstream_dir.clone());

        let mut debian = MockRepository::new(&debian_dir);
        debian.add_ref("debian-1.28", "d1");
        let mut upstream = MockRepository::new(&upstream_dir);
        upstream.add_ref("v1.28.3", "abc123");
        upstream.add_ref("main", "m1");

        Fixture {
            _dir: dir,
            config,
            debian,
            upstream,
            parent,
        }
    }

    fn lifecycle<'a>(
        service: &'a MockPackageService,
        config: &Config,
        dry_run: bool,
    ) -> ProjectLifecycle<&'a MockPackageService> {
        ProjectLifecycle::new(
            service,
            Workspace::new(&config.workspace.root),
            config.package.project_prefix.clone(),
            config.package.name.clone(),
        )
        .with_dry_run(dry_run)
    }

    #[test]
    fn test_bump_deb_builds_and_stages() {
        let fx = fixture();
        fs::write(fx.parent.join("cri-o_1.28.3~0.dsc"), "").unwrap();
        fs::write(fx.parent.join("cri-o_1.28.3~0.tar.gz"), "").unwrap();
        fs::write(fx.parent.join("cri-o_1.28.3~0_amd64.buildinfo"), "").unwrap();

        let spec = VersionSpec::parse("1.28.3").unwrap();
        let service = MockPackageService::new();
        let runner = MockRunner::new();
        let lc = lifecycle(&service, &fx.config, false);
        let ctx = BumpContext::new(&spec, &fx.config, &runner, &lc);

        let report = bump_deb(&ctx, &fx.debian, &fx.upstream).unwrap();

        let packaging = fx.debian.workdir().join("debian");
        let changelog = fs::read_to_string(packaging.join("changelog")).unwrap();
        assert!(changelog.contains(") stable;"));
        let rules = fs::read_to_string(packaging.join("rules")).unwrap();
        assert_eq!(rules, "UPSTREAM_TAG=v1.28.3\n");
        assert!(!fx.upstream.workdir().join("debian").exists());

        assert!(runner.ran("dch --newversion 1.28.3~0 -M -m bump to v1.28.3"));
        assert!(runner.ran("dpkg-buildpackage -us -uc -d"));
        let build = runner
            .invocations()
            .into_iter()
            .find(|i| i.command_line().starts_with("dpkg-buildpackage"))
            .unwrap();
        assert_eq!(build.cwd.as_deref(), Some(fx.upstream.workdir()));

        assert_eq!(fx.debian.commits(), vec!["bump to v1.28.3"]);
        assert_eq!(fx.upstream.checkouts(), vec!["v1.28.3", "main"]);
        assert_eq!(report.artifacts.len(), 2);
        assert_eq!(service.commits().len(), 1);
    }

    #[test]
    fn test_build_failure_restores_everything() {
        let fx = fixture();
        let spec = VersionSpec::parse("1.28.3").unwrap();
        let service = MockPackageService::new();
        let runner = MockRunner::new();
        runner.fail("dpkg-buildpackage", "missing build deps");
        let lc = lifecycle(&service, &fx.config, false);
        let ctx = BumpContext::new(&spec, &fx.config, &runner, &lc);

        let err = bump_deb(&ctx, &fx.debian, &fx.upstream).unwrap_err();
        assert!(matches!(err, ReleaseError::ExternalCommandFailed { .. }));
        assert!(fx.debian.workdir().join("debian").join("rules").exists());
        assert!(!fx.upstream.workdir().join("debian").exists());
        assert_eq!(fx.upstream.head().as_deref(), Some("main"));
        assert!(service.commits().is_empty());
    }

    /// Fails the build after putting something where `debian/` has to go back
    struct ReoccupyingRunner {
        path: PathBuf,
    }

    impl CommandRunner for ReoccupyingRunner {
        fn run(&self, invocation: &Invocation) -> Result<String> {
            if invocation.program == "dpkg-buildpackage" {
                fs::create_dir_all(&self.path).unwrap();
                fs::write(self.path.join("control"), "").unwrap();
                return Err(ReleaseError::ExternalCommandFailed {
                    command: invocation.command_line(),
                    status: "exit status: 2".to_string(),
                    stderr: "missing build deps".to_string(),
                });
            }
            Ok(String::new())
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_restore_after_failed_build_is_logged() {
        let fx = fixture();
        let spec = VersionSpec::parse("1.28.3").unwrap();
        let service = MockPackageService::new();
        let packaging = fx.debian.workdir().join("debian");
        let runner = ReoccupyingRunner {
            path: packaging.clone(),
        };
        let lc = lifecycle(&service, &fx.config, false);
        let ctx = BumpContext::new(&spec, &fx.config, &runner, &lc);

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();
        let err = tracing::subscriber::with_default(subscriber, || {
            bump_deb(&ctx, &fx.debian, &fx.upstream).unwrap_err()
        });

        assert!(matches!(err, ReleaseError::ExternalCommandFailed { .. }));
        let stranded = fx.upstream.workdir().join("debian");
        assert!(stranded.join("rules").exists());
        assert_eq!(fx.upstream.head().as_deref(), Some("main"));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("failed to return debian directory"));
        assert!(output.contains(&stranded.display().to_string()));
    }

    #[test]
    fn test_changelog_without_unreleased_fails() {
        let fx = fixture();
        fs::write(
            fx.debian.workdir().join("debian").join("changelog"),
            "cri-o (1.28.3~0) stable; urgency=medium\n",
        )
        .unwrap();
        let spec = VersionSpec::parse("1.28.3").unwrap();
        let service = MockPackageService::new();
        let runner = MockRunner::new();
        let lc = lifecycle(&service, &fx.config, false);
        let ctx = BumpContext::new(&spec, &fx.config, &runner, &lc);

        let err = bump_deb(&ctx, &fx.debian, &fx.upstream).unwrap_err();
        assert!(matches!(err, ReleaseError::IncompletePatch { .. }));
        assert!(!runner.ran("dpkg-buildpackage"));
        assert_eq!(fx.upstream.head().as_deref(), Some("main"));
    }

    #[test]
    fn test_dry_run_skips_commits() {
        let fx = fixture();
        fs::write(fx.parent.join("cri-o_1.28.3~0.dsc"), "").unwrap();
        let spec = VersionSpec::parse("1.28.3").unwrap();
        let service = MockPackageService::new();
        let runner = MockRunner::new();
        let lc = lifecycle(&service, &fx.config, true);
        let ctx = BumpContext::new(&spec, &fx.config, &runner, &lc);

        let report = bump_deb(&ctx, &fx.debian, &fx.upstream).unwrap();
        assert!(fx.debian.commits().is_empty());
        assert_eq!(report.artifacts, vec![PathBuf::from("cri-o_1.28.3~0.dsc")]);
        assert!(report.committed.is_empty());
        assert!(service.commits().is_empty());
    }
}
