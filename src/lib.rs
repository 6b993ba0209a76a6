pub mod artifacts;
pub mod bump;
pub mod cli;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod lifecycle;
pub mod logging;
pub mod obs;
pub mod patcher;
pub mod ui;
pub mod warning;

pub use error::{ReleaseError, Result};
