//! Streamed Command Execution
//!
//! Spawns an external process with a fixed working directory, feeds every
//! stdout/stderr line to an optional callback as it arrives, and maps a
//! non-zero exit into an error carrying the tail of stderr. The generator
//! reports per-module progress on its output streams, so lines must reach
//! the caller while the process is still running, not after it exits.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;

/// Lines of stderr kept for diagnostics when a process fails.
const STDERR_TAIL_LINES: usize = 10;

/// Callback invoked with each line an external process writes to stdout or
/// stderr. Shared across the two reader threads.
pub type LineHandler<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Errors from resolving or running external commands.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The named tool could not be found on `PATH` or at the given path.
    #[error("cannot find executable '{0}'")]
    ExecutableNotFound(String),

    /// The process could not be started at all.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Reading the process output streams failed.
    #[error("failed to read output of '{command}': {source}")]
    Stream {
        /// The command line being read.
        command: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("'{command}' failed with {status}{}", stderr_excerpt(.stderr_tail))]
    Failed {
        /// The command line that failed.
        command: String,
        /// The exit status reported by the OS.
        status: ExitStatus,
        /// The last few lines the process wrote to stderr.
        stderr_tail: Vec<String>,
    },
}

fn stderr_excerpt(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!(": {}", lines.join(" | "))
    }
}

fn display_command(program: &Path, args: &[String]) -> String {
    let mut out = program.display().to_string();
    for arg in args {
        out.push(' ');
        out.push_str(arg);
    }
    out
}

/// Runs external commands inside one working directory.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    work_dir: PathBuf,
}

impl CommandRunner {
    /// A runner whose child processes all start in `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// The working directory children run in.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run `program` to completion, streaming its output line-by-line to
    /// `on_line`. Returns `Ok(())` only for a successful exit status.
    pub fn run(
        &self,
        program: &Path,
        args: &[String],
        on_line: Option<LineHandler<'_>>,
    ) -> Result<(), ExecError> {
        let command = display_command(program, args);
        debug!(command = %command, "spawn");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained concurrently; reading one to EOF while the
        // other fills its pipe buffer would deadlock the child.
        let (stdout_read, stderr_read) = std::thread::scope(|scope| {
            let out_thread = scope.spawn(move || -> io::Result<()> {
                if let Some(stdout) = stdout {
                    for line in BufReader::new(stdout).lines() {
                        let line = line?;
                        debug!(stream = "stdout", line = %line);
                        if let Some(handler) = on_line {
                            handler(&line);
                        }
                    }
                }
                Ok(())
            });

            let err_thread = scope.spawn(move || -> io::Result<Vec<String>> {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                if let Some(stderr) = stderr {
                    for line in BufReader::new(stderr).lines() {
                        let line = line?;
                        debug!(stream = "stderr", line = %line);
                        if let Some(handler) = on_line {
                            handler(&line);
                        }
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
                Ok(tail.into())
            });

            (
                out_thread.join().expect("stdout reader panicked"),
                err_thread.join().expect("stderr reader panicked"),
            )
        });

        let status = child.wait().map_err(|source| ExecError::Stream {
            command: command.clone(),
            source,
        })?;

        stdout_read.map_err(|source| ExecError::Stream {
            command: command.clone(),
            source,
        })?;
        let stderr_tail = stderr_read.map_err(|source| ExecError::Stream {
            command: command.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::Failed {
                command,
                status,
                stderr_tail,
            })
        }
    }
}
