use obs_release::patcher::{apply_replacements, replace_in_file, ReplacementSet};
use obs_release::ReleaseError;
use std::fs;

fn spec_set() -> ReplacementSet {
    ReplacementSet::new()
        .replace("Version: ", "Version:                1.28.3")
        .replace("Release: ", "Release:        0%{?dist}")
}

#[test]
fn test_patches_spec_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cri-o.spec");
    fs::write(&path, "Name: cri-o\nVersion: 1.28.2\nRelease: 4%{?dist}\n").unwrap();

    let summary = apply_replacements(&path, &spec_set()).unwrap();

    assert_eq!(summary.replaced.len(), 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Name: cri-o\nVersion:                1.28.3\nRelease:        0%{?dist}\n"
    );
}

#[test]
fn test_missing_key_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cri-o.spec");
    let original = "Name: cri-o\nVersion: 1.28.2\n";
    fs::write(&path, original).unwrap();

    let err = apply_replacements(&path, &spec_set()).unwrap_err();

    match err {
        ReleaseError::IncompletePatch { path: p, missing } => {
            assert_eq!(p, path);
            assert_eq!(missing, vec!["Release: ".to_string()]);
        }
        other => panic!("expected IncompletePatch, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_preserves_crlf_and_missing_final_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules");
    fs::write(&path, "#!/usr/bin/make -f\r\nexport UPSTREAM_TAG").unwrap();

    let set = ReplacementSet::new().replace("UPSTREAM_TAG", "UPSTREAM_TAG=v1.28.3");
    apply_replacements(&path, &set).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "#!/usr/bin/make -f\r\nUPSTREAM_TAG=v1.28.3"
    );
}

#[test]
fn test_empty_set_does_not_touch_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cri-o.spec");
    fs::write(&path, "Version: 1\n").unwrap();
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    let summary = apply_replacements(&path, &ReplacementSet::new()).unwrap();
    assert!(summary.replaced.is_empty());
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[test]
fn test_missing_file_is_filesystem_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = apply_replacements(&dir.path().join("absent.spec"), &spec_set()).unwrap_err();
    assert!(matches!(err, ReleaseError::Filesystem { .. }));
}

#[test]
fn test_changelog_release_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("changelog");
    fs::write(&path, "cri-o (1.28.3~0) UNRELEASED; urgency=medium\n").unwrap();

    assert_eq!(replace_in_file(&path, "UNRELEASED", "stable").unwrap(), 1);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "cri-o (1.28.3~0) stable; urgency=medium\n"
    );
    assert!(matches!(
        replace_in_file(&path, "UNRELEASED", "stable"),
        Err(ReleaseError::IncompletePatch { .. })
    ));
}
