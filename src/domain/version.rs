use crate::domain::branch::BranchKind;
use crate::domain::coordinate::{CoordinatePair, ProjectCoordinate, Tier};
use crate::error::{ReleaseError, Result};
use std::fmt;

/// The release a run is promoting, parsed from the caller's version string.
///
/// Only plain `MAJOR.MINOR.PATCH` versions with a non-zero major and minor
/// are accepted. Project coordinates are not stored; every step asks for the
/// tier it needs through [`VersionSpec::coordinates_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    version: semver::Version,
}

impl VersionSpec {
    /// Parse a version string such as `1.28.3`
    pub fn parse(version: &str) -> Result<Self> {
        let parsed = semver::Version::parse(version.trim()).map_err(|e| {
            ReleaseError::invalid_version(format!("'{}' is not a semantic version: {}", version, e))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseError::invalid_version(format!(
                "'{}' carries pre-release or build metadata",
                version
            )));
        }
        if parsed.major == 0 {
            return Err(ReleaseError::invalid_version(
                "0 major version not supported",
            ));
        }
        if parsed.minor == 0 {
            return Err(ReleaseError::invalid_version(
                "0 minor version not supported",
            ));
        }

        Ok(VersionSpec { version: parsed })
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    /// A `.0` release opens a new minor-tier project
    pub fn is_minor_upgrade(&self) -> bool {
        self.version.patch == 0
    }

    /// Tier that describes this release on its own
    pub fn default_tier(&self) -> Tier {
        if self.is_minor_upgrade() {
            Tier::Minor
        } else {
            Tier::Patch
        }
    }

    /// Compute the old/new project pair for `tier`.
    ///
    /// Pure: calling it repeatedly with different tiers during one run never
    /// affects later calls.
    ///
    /// # Errors
    /// `InvalidVersion` when a patch-level tier is requested for a `.0` release.
    pub fn coordinates_for(&self, prefix: &str, tier: Tier) -> Result<CoordinatePair> {
        let (major, minor, patch) = (self.major(), self.minor(), self.patch());

        let pair = match tier {
            Tier::Minor => CoordinatePair {
                old: ProjectCoordinate::minor_tier(prefix, major, minor - 1),
                new: ProjectCoordinate::minor_tier(prefix, major, minor),
            },
            Tier::Patch => {
                let previous = self.previous_patch(tier)?;
                CoordinatePair {
                    old: ProjectCoordinate::patch_tier(prefix, major, minor, previous),
                    new: ProjectCoordinate::patch_tier(prefix, major, minor, patch),
                }
            }
            Tier::PatchBranch => {
                self.previous_patch(tier)?;
                CoordinatePair {
                    old: ProjectCoordinate::minor_tier(prefix, major, minor),
                    new: ProjectCoordinate::patch_tier(prefix, major, minor, patch),
                }
            }
        };

        Ok(pair)
    }

    fn previous_patch(&self, tier: Tier) -> Result<u64> {
        self.patch().checked_sub(1).ok_or_else(|| {
            ReleaseError::invalid_version(format!(
                "{} tier requires a patch release, got {}",
                tier, self
            ))
        })
    }

    /// Upstream tag for this release, e.g. `v1.28.3`
    pub fn tag(&self) -> String {
        format!("v{}", self)
    }

    pub fn branch_name(&self, kind: BranchKind) -> String {
        kind.format(self.major(), self.minor())
    }

    /// Source tarball produced by `spectool`, e.g. `cri-o-1.28.3.tar.gz`
    pub fn rpm_tarball(&self, package: &str) -> String {
        format!("{}-{}.tar.gz", package, self)
    }

    /// Tarball name used by older spec files, e.g. `v1.28.3.tar.gz`
    pub fn legacy_rpm_tarball(&self) -> String {
        format!("{}.tar.gz", self.tag())
    }

    /// Debian package version, e.g. `1.28.3~0`
    pub fn debian_version(&self) -> String {
        format!("{}~0", self)
    }

    /// Commit message used for every bump in this run
    pub fn bump_message(&self) -> String {
        format!("bump to {}", self.tag())
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
