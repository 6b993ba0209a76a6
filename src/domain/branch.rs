/// Packaging repository whose branch naming a version maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// RPM spec repository, branches named `MAJOR.MINOR`
    Rpm,
    /// Debian packaging repository, branches named `debian-MAJOR.MINOR`
    Debian,
}

impl BranchKind {
    /// Format the branch name for a version line
    pub fn format(&self, major: u64, minor: u64) -> String {
        match self {
            BranchKind::Rpm => format!("{}.{}", major, minor),
            BranchKind::Debian => format!("debian-{}.{}", major, minor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpec;

    #[test]
    fn test_rpm_branch() {
        let spec = VersionSpec::parse("1.28.3").unwrap();
        assert_eq!(spec.branch_name(BranchKind::Rpm), "1.28");
    }

    #[test]
    fn test_debian_branch() {
        let spec = VersionSpec::parse("1.28.3").unwrap();
        assert_eq!(spec.branch_name(BranchKind::Debian), "debian-1.28");
    }

    #[test]
    fn test_branch_ignores_patch() {
        let first = VersionSpec::parse("2.4.0").unwrap();
        let later = VersionSpec::parse("2.4.9").unwrap();
        assert_eq!(
            first.branch_name(BranchKind::Debian),
            later.branch_name(BranchKind::Debian)
        );
    }
}
