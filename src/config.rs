use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "obs-release.toml";

/// Represents the complete configuration for obs-release.
///
/// Names the package being released, where its build-service projects live,
/// where local checkouts go and which packaging tools to invoke.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub rpm: RpmConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub debian: DebianConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_package_name() -> String {
    "cri-o".to_string()
}

fn default_project_prefix() -> String {
    "devel:kubic:libcontainers:stable:cri-o".to_string()
}

/// Returns the project configuration written to each new project.
fn default_project_config() -> String {
    r#"
Release: <CI_CNT>.<B_CNT>%%{?dist}
%if "%_repository" == "CentOS_8" || "%_repository" == "CentOS_8_Stream"
ExpandFlags: module:go-toolset-rhel8
%endif
%if "%_repository" == "CentOS_8_Stream"
Prefer: centos-stream-release
%endif
Prefer: golang-github-cpuguy83-go-md2man
"#
    .to_string()
}

/// The package being released and its build-service naming.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackageConfig {
    #[serde(default = "default_package_name")]
    pub name: String,

    /// Projects are named `<project_prefix>:MAJOR.MINOR[:MAJOR.MINOR.PATCH]`
    #[serde(default = "default_project_prefix")]
    pub project_prefix: String,

    #[serde(default = "default_project_config")]
    pub project_config: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            name: default_package_name(),
            project_prefix: default_project_prefix(),
            project_config: default_project_config(),
        }
    }
}

fn default_workspace_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("obs-release")
}

/// Location of the local checkout tree.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            root: default_workspace_root(),
        }
    }
}

/// RPM spec repository settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct RpmConfig {
    /// Existing clone of the spec repository; defaults to `<root>/fedora/<package>`
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
}

fn default_upstream_url() -> String {
    "https://github.com/cri-o/cri-o.git".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

/// Upstream source repository settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub repo_url: String,

    /// Defaults to `<root>/<package>-upstream/<package>`
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,

    /// Branch the upstream clone is returned to after use
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            repo_url: default_upstream_url(),
            repo_dir: None,
            default_branch: default_branch(),
        }
    }
}

fn default_debian_url() -> String {
    "https://gitlab.com/rhcontainerbot/cri-o.git".to_string()
}

/// Debian packaging repository settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DebianConfig {
    #[serde(default = "default_debian_url")]
    pub repo_url: String,

    /// Defaults to `<root>/debian/<package>`
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,
}

impl Default for DebianConfig {
    fn default() -> Self {
        DebianConfig {
            repo_url: default_debian_url(),
            repo_dir: None,
        }
    }
}

fn tool(name: &str) -> String {
    name.to_string()
}

fn default_osc() -> String {
    tool("osc")
}
fn default_spectool() -> String {
    tool("spectool")
}
fn default_bumpspec() -> String {
    tool("rpmdev-bumpspec")
}
fn default_fedpkg() -> String {
    tool("fedpkg")
}
fn default_dch() -> String {
    tool("dch")
}
fn default_dpkg_buildpackage() -> String {
    tool("dpkg-buildpackage")
}

/// Program names of the external packaging tools.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_osc")]
    pub osc: String,
    #[serde(default = "default_spectool")]
    pub spectool: String,
    #[serde(default = "default_bumpspec")]
    pub bumpspec: String,
    #[serde(default = "default_fedpkg")]
    pub fedpkg: String,
    #[serde(default = "default_dch")]
    pub dch: String,
    #[serde(default = "default_dpkg_buildpackage")]
    pub dpkg_buildpackage: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            osc: default_osc(),
            spectool: default_spectool(),
            bumpspec: default_bumpspec(),
            fedpkg: default_fedpkg(),
            dch: default_dch(),
            dpkg_buildpackage: default_dpkg_buildpackage(),
        }
    }
}

impl Config {
    /// Spec file name inside the RPM repository, e.g. `cri-o.spec`
    pub fn spec_file(&self) -> String {
        format!("{}.spec", self.package.name)
    }

    pub fn rpm_source_dir(&self) -> PathBuf {
        self.rpm.source_dir.clone().unwrap_or_else(|| {
            self.workspace
                .root
                .join("fedora")
                .join(&self.package.name)
        })
    }

    pub fn upstream_repo_dir(&self) -> PathBuf {
        self.upstream.repo_dir.clone().unwrap_or_else(|| {
            self.workspace
                .root
                .join(format!("{}-upstream", self.package.name))
                .join(&self.package.name)
        })
    }

    /// Directory `dpkg-buildpackage` writes its artifacts to
    pub fn upstream_parent_dir(&self) -> PathBuf {
        let repo = self.upstream_repo_dir();
        repo.parent().map(Path::to_path_buf).unwrap_or(repo)
    }

    pub fn debian_repo_dir(&self) -> PathBuf {
        self.debian.repo_dir.clone().unwrap_or_else(|| {
            self.workspace
                .root
                .join("debian")
                .join(&self.package.name)
        })
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.package.name.trim().is_empty() {
            return Err(ReleaseError::config("package.name must not be empty"));
        }
        if self.package.project_prefix.trim().is_empty() {
            return Err(ReleaseError::config(
                "package.project_prefix must not be empty",
            ));
        }
        if self.package.name.contains('/') {
            return Err(ReleaseError::config(format!(
                "package.name '{}' must not contain '/'",
                self.package.name
            )));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `obs-release.toml` in current directory
/// 3. `obs-release.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        Some(PathBuf::from(path))
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        Some(PathBuf::from(CONFIG_FILE_NAME))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    };

    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(&path).map_err(|e| ReleaseError::fs(&path, e))?;
            toml::from_str(&contents).map_err(|e| {
                ReleaseError::config(format!("cannot parse {}: {}", path.display(), e))
            })?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_derive_from_root() {
        let mut config = Config::default();
        config.workspace.root = PathBuf::from("/work");

        assert_eq!(config.spec_file(), "cri-o.spec");
        assert_eq!(config.rpm_source_dir(), PathBuf::from("/work/fedora/cri-o"));
        assert_eq!(
            config.upstream_repo_dir(),
            PathBuf::from("/work/cri-o-upstream/cri-o")
        );
        assert_eq!(
            config.upstream_parent_dir(),
            PathBuf::from("/work/cri-o-upstream")
        );
        assert_eq!(config.debian_repo_dir(), PathBuf::from("/work/debian/cri-o"));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        config.rpm.source_dir = Some(PathBuf::from("/src/rpm"));
        config.debian.repo_dir = Some(PathBuf::from("/src/deb"));
        assert_eq!(config.rpm_source_dir(), PathBuf::from("/src/rpm"));
        assert_eq!(config.debian_repo_dir(), PathBuf::from("/src/deb"));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let mut config = Config::default();
        config.package.project_prefix = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_project_config_mentions_release() {
        assert!(Config::default()
            .package
            .project_config
            .contains("Release: <CI_CNT>.<B_CNT>"));
    }
}
