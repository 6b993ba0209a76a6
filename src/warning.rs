use std::fmt;
use std::path::PathBuf;

/// Non-fatal problems hit while promoting a release.
/// These are reported to the user but never abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// An auxiliary package could not be branched into the new project
    BranchFailed {
        package: String,
        from: String,
        to: String,
        reason: String,
    },
    /// A package checkout could not be refreshed; it may not exist remotely yet
    UpdateFailed { path: PathBuf, reason: String },
    /// An optional line was absent from a file being patched
    OptionalLineMissing { path: PathBuf, key: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::BranchFailed {
                package,
                from,
                to,
                reason,
            } => write!(
                f,
                "Failed to branch '{}' from {} into {}: {}",
                package, from, to, reason
            ),
            ReleaseWarning::UpdateFailed { path, reason } => write!(
                f,
                "Failed to update {}, package may not exist yet: {}",
                path.display(),
                reason
            ),
            ReleaseWarning::OptionalLineMissing { path, key } => {
                write!(f, "Optional line '{}' not found in {}", key, path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_failed_display() {
        let warning = ReleaseWarning::BranchFailed {
            package: "conmon".to_string(),
            from: "prefix:1.27".to_string(),
            to: "prefix:1.28".to_string(),
            reason: "exists".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.contains("conmon"));
        assert!(msg.contains("prefix:1.27"));
        assert!(msg.contains("prefix:1.28"));
    }

    #[test]
    fn test_optional_line_display() {
        let warning = ReleaseWarning::OptionalLineMissing {
            path: PathBuf::from("cri-o.spec"),
            key: "%define built_tag ".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Optional line '%define built_tag ' not found in cri-o.spec"
        );
    }
}
