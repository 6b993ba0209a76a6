use crate::domain::ProjectCoordinate;
use crate::error::{ReleaseError, Result};
use crate::obs::PackageService;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A call received by [MockPackageService]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    List(String),
    CheckoutProject { project: String, meta_only: bool },
    CheckoutPackage { project: String, package: String },
    Update(PathBuf),
    ProjectMeta(String),
    PutProjectMeta(String),
    SetProjectConfig(String),
    Branch { old: String, package: String, new: String },
    CreatePackage { project_dir: PathBuf, name: String },
    StageAndCommit { package_dir: PathBuf, paths: Vec<PathBuf>, message: String },
}

#[derive(Default)]
struct State {
    projects: BTreeMap<String, Vec<String>>,
    metas: HashMap<String, String>,
    configs: HashMap<String, String>,
    calls: Vec<ServiceCall>,
}

/// In-memory build service for testing without `osc`
///
/// Checkouts create the matching directories on disk so idempotency checks
/// in the lifecycle behave as they would against a real workspace.
#[derive(Default)]
pub struct MockPackageService {
    state: Mutex<State>,
    failing_branches: HashSet<String>,
    failing_updates: bool,
}

fn external_failure(command: String, stderr: &str) -> ReleaseError {
    ReleaseError::ExternalCommandFailed {
        command,
        status: "exit status: 1".to_string(),
        stderr: stderr.to_string(),
    }
}

impl MockPackageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project with its packages
    pub fn add_project(&mut self, project: impl Into<String>, packages: &[&str]) {
        let project = project.into();
        let state = self.state.get_mut().unwrap_or_else(|p| p.into_inner());
        state.metas.insert(
            project.clone(),
            format!("<project name=\"{}\">\n  <title/>\n</project>\n", project),
        );
        state
            .projects
            .insert(project, packages.iter().map(|p| p.to_string()).collect());
    }

    /// Make branching `package` fail
    pub fn fail_branch(&mut self, package: impl Into<String>) {
        self.failing_branches.insert(package.into());
    }

    /// Make every `update` fail
    pub fn fail_updates(&mut self) {
        self.failing_updates = true;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, call: ServiceCall) {
        self.lock().calls.push(call);
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    /// Packages branched so far, as `(old, package, new)`
    pub fn branches(&self) -> Vec<(String, String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::Branch { old, package, new } => Some((old, package, new)),
                _ => None,
            })
            .collect()
    }

    pub fn commits(&self) -> Vec<(PathBuf, Vec<PathBuf>, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServiceCall::StageAndCommit {
                    package_dir,
                    paths,
                    message,
                } => Some((package_dir, paths, message)),
                _ => None,
            })
            .collect()
    }

    pub fn project_exists(&self, project: &str) -> bool {
        self.lock().projects.contains_key(project)
    }

    pub fn meta_of(&self, project: &str) -> Option<String> {
        self.lock().metas.get(project).cloned()
    }

    pub fn config_of(&self, project: &str) -> Option<String> {
        self.lock().configs.get(project).cloned()
    }

    pub fn packages_of(&self, project: &str) -> Vec<String> {
        self.lock().projects.get(project).cloned().unwrap_or_default()
    }

    fn require_project(&self, project: &str) -> Result<Vec<String>> {
        self.lock()
            .projects
            .get(project)
            .cloned()
            .ok_or_else(|| external_failure(format!("osc co {}", project), "project not found"))
    }
}

fn mkdir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| ReleaseError::fs(path, e))
}

impl PackageService for MockPackageService {
    fn list(&self, path: &str, filter: Option<&str>) -> Result<Vec<String>> {
        self.record(ServiceCall::List(path.to_string()));
        let state = self.lock();
        let entries: Vec<String> = if path == "/" {
            state.projects.keys().cloned().collect()
        } else {
            state
                .projects
                .get(path)
                .cloned()
                .ok_or_else(|| external_failure(format!("osc ls {}", path), "not found"))?
        };
        Ok(entries
            .into_iter()
            .filter(|entry| filter.map_or(true, |f| entry.contains(f)))
            .collect())
    }

    fn checkout_project(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        meta_only: bool,
    ) -> Result<()> {
        self.record(ServiceCall::CheckoutProject {
            project: project.to_string(),
            meta_only,
        });
        let packages = self.require_project(project.as_str())?;
        let project_dir = workspace.join(project.as_str());
        mkdir(&project_dir.join(".osc"))?;
        if !meta_only {
            for package in packages {
                mkdir(&project_dir.join(package).join(".osc"))?;
            }
        }
        Ok(())
    }

    fn checkout_package(
        &self,
        workspace: &Path,
        project: &ProjectCoordinate,
        package: &str,
    ) -> Result<()> {
        self.record(ServiceCall::CheckoutPackage {
            project: project.to_string(),
            package: package.to_string(),
        });
        self.require_project(project.as_str())?;
        mkdir(&workspace.join(project.as_str()).join(package).join(".osc"))
    }

    fn update(&self, package_dir: &Path) -> Result<()> {
        self.record(ServiceCall::Update(package_dir.to_path_buf()));
        if self.failing_updates {
            return Err(external_failure("osc update".to_string(), "package does not exist"));
        }
        Ok(())
    }

    fn project_meta(&self, project: &ProjectCoordinate) -> Result<String> {
        self.record(ServiceCall::ProjectMeta(project.to_string()));
        self.meta_of(project.as_str()).ok_or_else(|| {
            external_failure(format!("osc meta prj {}", project), "unknown project")
        })
    }

    fn put_project_meta(&self, project: &ProjectCoordinate, meta: &str) -> Result<()> {
        self.record(ServiceCall::PutProjectMeta(project.to_string()));
        let mut state = self.lock();
        state.metas.insert(project.to_string(), meta.to_string());
        state.projects.entry(project.to_string()).or_default();
        Ok(())
    }

    fn set_project_config(&self, project: &ProjectCoordinate, config: &str) -> Result<()> {
        self.record(ServiceCall::SetProjectConfig(project.to_string()));
        self.lock()
            .configs
            .insert(project.to_string(), config.to_string());
        Ok(())
    }

    fn branch_package(
        &self,
        old: &ProjectCoordinate,
        package: &str,
        new: &ProjectCoordinate,
    ) -> Result<()> {
        self.record(ServiceCall::Branch {
            old: old.to_string(),
            package: package.to_string(),
            new: new.to_string(),
        });
        if self.failing_branches.contains(package) {
            return Err(external_failure(
                format!("osc branch {} {} {}", old, package, new),
                "branch failed",
            ));
        }
        let mut state = self.lock();
        let packages = state.projects.entry(new.to_string()).or_default();
        if !packages.iter().any(|p| p == package) {
            packages.push(package.to_string());
        }
        Ok(())
    }

    fn create_package(&self, project_dir: &Path, name: &str) -> Result<()> {
        self.record(ServiceCall::CreatePackage {
            project_dir: project_dir.to_path_buf(),
            name: name.to_string(),
        });
        mkdir(&project_dir.join(name))
    }

    fn stage_and_commit(
        &self,
        package_dir: &Path,
        paths: &[PathBuf],
        message: &str,
    ) -> Result<()> {
        self.record(ServiceCall::StageAndCommit {
            package_dir: package_dir.to_path_buf(),
            paths: paths.to_vec(),
            message: message.to_string(),
        });
        Ok(())
    }
}
