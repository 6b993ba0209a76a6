use crate::command::{CommandRunner, Invocation};
use crate::error::{ReleaseError, Result};
use std::sync::{Mutex, MutexGuard};

enum Scripted {
    Output(String),
    Failure(String),
}

/// Mock runner for testing without spawning processes
///
/// Unscripted invocations succeed with empty output. Scripts are matched by
/// command-line prefix, most recently added first.
#[derive(Default)]
pub struct MockRunner {
    scripts: Mutex<Vec<(String, Scripted)>>,
    invocations: Mutex<Vec<Invocation>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `output` to commands starting with `prefix`
    pub fn respond(&self, prefix: impl Into<String>, output: impl Into<String>) {
        lock(&self.scripts).push((prefix.into(), Scripted::Output(output.into())));
    }

    /// Fail commands starting with `prefix` with `stderr`
    pub fn fail(&self, prefix: impl Into<String>, stderr: impl Into<String>) {
        lock(&self.scripts).push((prefix.into(), Scripted::Failure(stderr.into())));
    }

    /// Everything run so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.invocations).clone()
    }

    /// Command lines run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        lock(&self.invocations)
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Whether some command line started with `prefix`
    pub fn ran(&self, prefix: &str) -> bool {
        self.command_lines().iter().any(|line| line.starts_with(prefix))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        let line = invocation.command_line();
        lock(&self.invocations).push(invocation.clone());

        let scripts = lock(&self.scripts);
        match scripts.iter().rev().find(|(prefix, _)| line.starts_with(prefix.as_str())) {
            Some((_, Scripted::Output(output))) => Ok(output.clone()),
            Some((_, Scripted::Failure(stderr))) => Err(ReleaseError::ExternalCommandFailed {
                command: line,
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}
