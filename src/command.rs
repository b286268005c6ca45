use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::CommandError;

/// Runs external tools with argument arrays (never through a shell)
/// and gives up on any call that outlives `timeout`
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        CommandRunner { timeout }
    }

    /// Run `program args..` and capture its stdout
    pub fn output(&self, program: &str, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| CommandError::Io {
            program: program.to_string(),
            source: std::io::Error::other("stdout not captured"),
        })?;

        // Drain stdout on a separate thread so a large offering can't fill the pipe
        // while we wait on the child
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });

        let status = self.wait(program, &mut child)?;

        let data = reader
            .join()
            .map_err(|_| CommandError::Io {
                program: program.to_string(),
                source: std::io::Error::other("stdout reader panicked"),
            })?
            .map_err(|source| CommandError::Io {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status,
            });
        }

        Ok(data)
    }

    /// Run `program args..`, optionally feeding `input` on stdin, discarding output.
    /// Stdout is not captured: wl-copy forks a server that would keep the pipe open.
    pub fn run(
        &self,
        program: &str,
        args: &[&str],
        input: Option<&[u8]>,
    ) -> Result<(), CommandError> {
        let stdin = if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Feed stdin from a helper thread so a child that stops reading can't
        // hold us past the deadline. Killing the child breaks the pipe and
        // ends the writer.
        let writer = match (input, child.stdin.take()) {
            (Some(data), Some(mut pipe)) => {
                let data = data.to_vec();
                Some(thread::spawn(move || pipe.write_all(&data)))
            }
            _ => None,
        };

        let status = self.wait(program, &mut child)?;

        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| CommandError::Io {
                    program: program.to_string(),
                    source: std::io::Error::other("stdin writer panicked"),
                })?
                .map_err(|source| CommandError::Io {
                    program: program.to_string(),
                    source,
                })?;
        }

        if !status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status,
            });
        }

        Ok(())
    }

    /// Check that `program args..` can be run and exits successfully
    pub fn probe(&self, program: &str, args: &[&str]) -> bool {
        self.run(program, args, None).is_ok()
    }

    fn wait(&self, program: &str, child: &mut Child) -> Result<ExitStatus, CommandError> {
        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => Ok(status),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(CommandError::TimedOut {
                    program: program.to_string(),
                    timeout: self.timeout,
                })
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(CommandError::Io {
                    program: program.to_string(),
                    source,
                })
            }
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        CommandRunner::new(Duration::from_secs(2))
    }
}
