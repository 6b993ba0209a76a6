use std::fmt;

/// Identifier of a build-service project, e.g. `prefix:1.28` or
/// `prefix:1.28:1.28.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectCoordinate(String);

impl ProjectCoordinate {
    /// `prefix:MAJOR.MINOR`
    pub fn minor_tier(prefix: &str, major: u64, minor: u64) -> Self {
        ProjectCoordinate(format!("{}:{}.{}", prefix, major, minor))
    }

    /// `prefix:MAJOR.MINOR:MAJOR.MINOR.PATCH`
    pub fn patch_tier(prefix: &str, major: u64, minor: u64, patch: u64) -> Self {
        ProjectCoordinate(format!(
            "{}:{}.{}:{}.{}.{}",
            prefix, major, minor, major, minor, patch
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectCoordinate {
    fn from(value: &str) -> Self {
        ProjectCoordinate(value.to_string())
    }
}

impl AsRef<str> for ProjectCoordinate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which pair of projects a lifecycle step operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Previous minor-tier project to the current one
    Minor,
    /// Previous patch-tier project to the current one
    Patch,
    /// Current minor-tier parent to the current patch-tier project
    PatchBranch,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Minor => "minor",
            Tier::Patch => "patch",
            Tier::PatchBranch => "patch-branch",
        };
        f.write_str(name)
    }
}

/// Source and destination projects of one lifecycle step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatePair {
    pub old: ProjectCoordinate,
    pub new: ProjectCoordinate,
}
