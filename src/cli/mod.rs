pub mod orchestration;

pub use orchestration::{run_release, Action, ActionSummary, Release, ReleaseArgs};
