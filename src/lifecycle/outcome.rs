use crate::error::{ReleaseError, Result};
use crate::warning::ReleaseWarning;
use std::path::PathBuf;

/// Result of one lifecycle step.
///
/// Soft failures carry the step's value along with what went wrong, so the
/// caller can continue; fatal failures end the run.
#[derive(Debug)]
pub enum StepOutcome<T> {
    Completed(T),
    SoftFailure(T, Vec<ReleaseWarning>),
    FatalFailure(ReleaseError),
}

impl<T> StepOutcome<T> {
    /// Build from a value and the warnings gathered while producing it
    pub fn from_parts(value: T, warnings: Vec<ReleaseWarning>) -> Self {
        if warnings.is_empty() {
            StepOutcome::Completed(value)
        } else {
            StepOutcome::SoftFailure(value, warnings)
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StepOutcome::FatalFailure(_))
    }

    /// Keep going past soft failures, stop on fatal ones
    pub fn into_result(self) -> Result<(T, Vec<ReleaseWarning>)> {
        match self {
            StepOutcome::Completed(value) => Ok((value, Vec::new())),
            StepOutcome::SoftFailure(value, warnings) => Ok((value, warnings)),
            StepOutcome::FatalFailure(err) => Err(err),
        }
    }
}

/// What a lifecycle operation did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleReport {
    /// Packages branched into the new project
    pub branched: Vec<String>,
    /// Whether the primary package had to be created
    pub created_package: bool,
    /// Artifacts copied between package checkouts, relative paths
    pub copied: Vec<PathBuf>,
    /// Entries staged for the package commit; empty when nothing was committed
    pub committed: Vec<PathBuf>,
    pub warnings: Vec<ReleaseWarning>,
}

impl LifecycleReport {
    pub fn merge(mut self, other: LifecycleReport) -> Self {
        self.branched.extend(other.branched);
        self.created_package |= other.created_package;
        self.copied.extend(other.copied);
        self.committed.extend(other.committed);
        self.warnings.extend(other.warnings);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning() -> ReleaseWarning {
        ReleaseWarning::UpdateFailed {
            path: PathBuf::from("pkg"),
            reason: "offline".to_string(),
        }
    }

    #[test]
    fn test_from_parts() {
        assert!(matches!(
            StepOutcome::from_parts(1, Vec::new()),
            StepOutcome::Completed(1)
        ));
        assert!(matches!(
            StepOutcome::from_parts(1, vec![warning()]),
            StepOutcome::SoftFailure(1, _)
        ));
    }

    #[test]
    fn test_soft_failure_continues() {
        let (value, warnings) = StepOutcome::SoftFailure("x", vec![warning()])
            .into_result()
            .unwrap();
        assert_eq!(value, "x");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_fatal_failure_stops() {
        let outcome: StepOutcome<()> =
            StepOutcome::FatalFailure(ReleaseError::ProjectNotFound("p".into()));
        assert!(outcome.is_fatal());
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_report_merge() {
        let first = LifecycleReport {
            branched: vec!["conmon".into()],
            ..Default::default()
        };
        let second = LifecycleReport {
            created_package: true,
            warnings: vec![warning()],
            ..Default::default()
        };
        let merged = first.merge(second);
        assert_eq!(merged.branched, vec!["conmon".to_string()]);
        assert!(merged.created_package);
        assert_eq!(merged.warnings.len(), 1);
    }
}
