use crate::command::{CommandRunner, Invocation};
use crate::domain::ProjectCoordinate;
use crate::error::Result;
use crate::obs::PackageService;
use std::path::{Path, PathBuf};
use tracing::debug;

/// [PackageService] backed by the `osc` command line client
pub struct OscService<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> OscService<R> {
    pub fn new(runner: R) -> Self {
        Self::with_program(runner, "osc")
    }

    /// Use a different `osc` binary
    pub fn with_program(runner: R, program: impl Into<String>) -> Self {
        OscService {
            runner,
            program: program.into(),
        }
    }

    fn osc(&self) -> Invocation {
        Invocation::new(&self.program)
    }
}

impl<R: CommandRunner> PackageService for OscService<R> {
    fn list(&self, path: &str, filter: Option<&str>) -> Result<Vec<String>> {
        let output = self.runner.run(&self.osc().args(["ls", path]))?;
        let entries = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| filter.map_or(true, |f| line.contains(f)))
            .map(str::to_string)
            .collect();
        Ok(entries)
    }

    fn checkout_project(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        meta_only: bool,
    ) -> Result<()> {
        let mut invocation = self.osc().args(["co", project.as_str()]);
        if meta_only {
            invocation = invocation.arg("-M");
        }
        let output = self.runner.run(&invocation.current_dir(workspace))?;
        debug!(%project, output = %output, "osc co");
        Ok(())
    }

    fn checkout_package(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        package: &str,
    ) -> Result<()> {
        self.runner.run(
            &self
                .osc()
                .args(["co", project.as_str(), package])
                .current_dir(workspace),
        )?;
        Ok(())
    }

    fn update(&self, package_dir: &Path) -> Result<()> {
        self.runner
            .run(&self.osc().arg("update").current_dir(package_dir))?;
        Ok(())
    }

    fn project_meta(&self, project: &ProjectCoordinate) -> Result<String> {
        self.runner
            .run(&self.osc().args(["meta", "prj", project.as_str()]))
    }

    fn put_project_meta(&self, project: &ProjectCoordinate, meta: &str) -> Result<()> {
        let output = self.runner.run(
            &self
                .osc()
                .args(["meta", "prj", project.as_str(), "-F", "-"])
                .stdin(meta),
        )?;
        debug!(%project, output = %output, "osc meta prj");
        Ok(())
    }

    fn set_project_config(&self, project: &ProjectCoordinate, config: &str) -> Result<()> {
        let output = self.runner.run(
            &self
                .osc()
                .args(["meta", "prjconf", "-F", "-", project.as_str()])
                .stdin(config),
        )?;
        debug!(%project, output = %output, "osc meta prjconf");
        Ok(())
    }

    fn branch_package(
        &self,
        old: &ProjectCoordinate,
        package: &str,
        new: &ProjectCoordinate,
    ) -> Result<()> {
        let output = self.runner.run(&self.osc().args([
            "branch",
            old.as_str(),
            package,
            new.as_str(),
        ]))?;
        debug!(package, output = %output, "osc branch");
        Ok(())
    }

    fn create_package(&self, project_dir: &Path, name: &str) -> Result<()> {
        self.runner
            .run(&self.osc().args(["mkpac", name]).current_dir(project_dir))?;
        Ok(())
    }

    fn stage_and_commit(
        &self,
        package_dir: &Path,
        paths: &[PathBuf],
        message: &str,
    ) -> Result<()> {
        if !paths.is_empty() {
            let files = paths.iter().map(|p| p.to_string_lossy().into_owned());
            self.runner
                .run(&self.osc().arg("add").args(files).current_dir(package_dir))?;
        }
        self.runner.run(
            &self
                .osc()
                .args(["commit", "-m", message])
                .current_dir(package_dir),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MockRunner;

    fn project(name: &str) -> ProjectCoordinate {
        ProjectCoordinate::from(name)
    }

    #[test]
    fn test_list_filters_output() {
        let runner = MockRunner::new();
        runner.respond("osc ls /", "home:me\nprefix:1.27\nprefix:1.28\n\n");
        let osc = OscService::new(&runner);

        let projects = osc.list("/", Some("prefix")).unwrap();
        assert_eq!(projects, vec!["prefix:1.27", "prefix:1.28"]);
        assert_eq!(osc.list("/", None).unwrap().len(), 3);
    }

    #[test]
    fn test_meta_checkout_flag_and_directory() {
        let runner = MockRunner::new();
        let osc = OscService::new(&runner);

        osc.checkout_project(Path::new("/work"), &project("prefix:1.28"), true)
            .unwrap();

        let invocation = &runner.invocations()[0];
        assert_eq!(invocation.command_line(), "osc co prefix:1.28 -M");
        assert_eq!(invocation.cwd.as_deref(), Some(Path::new("/work")));
    }

    #[test]
    fn test_metadata_copy_pipes_rewritten_document() {
        let runner = MockRunner::new();
        runner.respond("osc meta prj prefix:1.27", r#"<project name="prefix:1.27"/>"#);
        let osc = OscService::new(&runner);

        osc.copy_project_metadata(&project("prefix:1.27"), &project("prefix:1.28"))
            .unwrap();

        let put = &runner.invocations()[1];
        assert_eq!(put.command_line(), "osc meta prj prefix:1.28 -F -");
        assert_eq!(put.stdin.as_deref(), Some(r#"<project name="prefix:1.28"/>"#));
    }

    #[test]
    fn test_stage_and_commit_adds_then_commits() {
        let runner = MockRunner::new();
        let osc = OscService::with_program(&runner, "osc-test");

        osc.stage_and_commit(
            Path::new("/work/p/cri-o"),
            &[PathBuf::from("cri-o.spec"), PathBuf::from("v1.28.3.tar.gz")],
            "bump to v1.28.3",
        )
        .unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "osc-test add cri-o.spec v1.28.3.tar.gz".to_string(),
                "osc-test commit -m bump to v1.28.3".to_string(),
            ]
        );
    }

    #[test]
    fn test_branch_failure_propagates() {
        let runner = MockRunner::new();
        runner.fail("osc branch", "package not found");
        let osc = OscService::new(&runner);

        let err = osc
            .branch_package(&project("a"), "conmon", &project("b"))
            .unwrap_err();
        assert!(err.is_external());
    }
}
