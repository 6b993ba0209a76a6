// tests/config_test.rs
use obs_release::config::{load_config, Config, CONFIG_FILE_NAME};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.package.name, "cri-o");
    assert_eq!(
        config.package.project_prefix,
        "devel:kubic:libcontainers:stable:cri-o"
    );
    assert_eq!(config.upstream.default_branch, "main");
    assert_eq!(config.tools.osc, "osc");
    assert_eq!(config.tools.bumpspec, "rpmdev-bumpspec");
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[package]
name = "conmon"
project_prefix = "home:me:conmon"

[workspace]
root = "/srv/obs"

[tools]
osc = "/usr/local/bin/osc"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.package.name, "conmon");
    assert_eq!(config.package.project_prefix, "home:me:conmon");
    assert_eq!(config.workspace.root, PathBuf::from("/srv/obs"));
    assert_eq!(config.tools.osc, "/usr/local/bin/osc");
    // Unset keys keep their defaults
    assert_eq!(config.tools.dch, "dch");
    assert!(config.package.project_config.contains("Release:"));
    assert_eq!(
        config.rpm_source_dir(),
        PathBuf::from("/srv/obs/fedora/conmon")
    );
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[package\nname = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("cannot parse"));
}

#[test]
fn test_empty_package_name_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[package]\nname = \"\"\n")
        .unwrap();
    temp_file.flush().unwrap();

    assert!(load_config(Some(temp_file.path().to_str().unwrap())).is_err());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    assert!(load_config(Some("/nonexistent/obs-release.toml")).is_err());
}

#[test]
#[serial]
fn test_config_discovered_in_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[upstream]\ndefault_branch = \"master\"\n",
    )
    .unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    std::env::set_current_dir(original).unwrap();

    assert_eq!(result.unwrap().upstream.default_branch, "master");
}
