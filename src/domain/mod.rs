//! Domain logic - pure version and project naming rules, no I/O

pub mod branch;
pub mod coordinate;
pub mod version;

pub use branch::BranchKind;
pub use coordinate::{CoordinatePair, ProjectCoordinate, Tier};
pub use version::VersionSpec;
