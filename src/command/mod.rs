//! External process abstraction
//!
//! Every packaging tool (`osc`, `spectool`, `dch`, ...) is launched through
//! the [CommandRunner] trait so flows can be exercised without the tools
//! installed.
//!
//! - [system::SystemRunner]: spawns real processes with `std::process`
//! - [mock::MockRunner]: records invocations and replays scripted output
//!
//! Invocations always carry their working directory explicitly; nothing in
//! this crate changes the process-wide current directory.

pub mod mock;
pub mod system;

pub use mock::MockRunner;
pub use system::SystemRunner;

use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// A program to run along with its arguments, directory and stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// `program arg1 arg2`, used for logs and error messages
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Runs external commands to completion
pub trait CommandRunner: Send + Sync {
    /// Run the invocation and return its trimmed stdout.
    ///
    /// # Errors
    /// `ExternalCommandFailed` when the program cannot be spawned or exits
    /// with a non-zero status.
    fn run(&self, invocation: &Invocation) -> Result<String>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        (**self).run(invocation)
    }
}
