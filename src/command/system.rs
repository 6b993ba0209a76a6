use crate::command::{CommandRunner, Invocation};
use crate::error::{ReleaseError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs invocations as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        debug!(command = %invocation, cwd = ?invocation.cwd, "running");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let spawn_failed = |e: std::io::Error| ReleaseError::ExternalCommandFailed {
            command: invocation.command_line(),
            status: "not started".to_string(),
            stderr: e.to_string(),
        };

        let mut child = cmd.spawn().map_err(spawn_failed)?;
        if let Some(input) = &invocation.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).map_err(spawn_failed)?;
            }
        }

        let output = child.wait_with_output().map_err(spawn_failed)?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();

        if !output.status.success() {
            return Err(ReleaseError::ExternalCommandFailed {
                command: invocation.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(command = %invocation, output = %stdout, "finished");
        Ok(stdout)
    }
}
