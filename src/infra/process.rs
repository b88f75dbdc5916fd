//! Rebuild process execution
//!
//! Spawns the rebuild step with tokio, forwards its output streams and
//! reports the exit code once both streams are drained and the process has
//! exited.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;

use crate::core::command::RebuildCommand;
use crate::core::runner::{CompletionCallback, ProcessRunner};
use crate::error::RunnerError;

/// Where a child output stream goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forward {
    Stdout,
    Stderr,
    Discard,
}

/// Output forwarding for the child's stdout and stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputForwarding {
    pub stdout: Forward,
    pub stderr: Forward,
}

impl Default for OutputForwarding {
    fn default() -> Self {
        Self {
            stdout: Forward::Stdout,
            stderr: Forward::Stderr,
        }
    }
}

impl OutputForwarding {
    /// Forwarding for the CLI output modes
    ///
    /// JSON mode keeps our stdout for NDJSON, so child stdout moves to
    /// stderr. Quiet mode drops child stdout.
    pub fn for_output(quiet: bool, json: bool) -> Self {
        let stdout = if json {
            Forward::Stderr
        } else if quiet {
            Forward::Discard
        } else {
            Forward::Stdout
        };
        Self {
            stdout,
            stderr: Forward::Stderr,
        }
    }
}

/// Runs rebuild commands as tokio child processes
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    forwarding: OutputForwarding,
}

impl TokioProcessRunner {
    pub fn new(forwarding: OutputForwarding) -> Self {
        Self { forwarding }
    }

    fn command(command: &RebuildCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn launch(
        &mut self,
        command: &RebuildCommand,
        on_exit: CompletionCallback,
    ) -> Result<(), RunnerError> {
        let mut child = Self::command(command)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        tracing::debug!("Spawned {} (pid {:?})", command.program, child.id());

        let stdout = child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward(out, self.forwarding.stdout)));
        let stderr = child
            .stderr
            .take()
            .map(|err| tokio::spawn(forward(err, self.forwarding.stderr)));

        let program = command.program.clone();
        tokio::spawn(async move {
            let status = child.wait().await;

            for copier in [stdout, stderr].into_iter().flatten() {
                if let Err(e) = copier.await {
                    tracing::debug!("Output forwarding task failed: {e}");
                }
            }

            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::warn!("Failed to wait for {program}: {e}");
                    None
                }
            };
            on_exit(code);
        });

        Ok(())
    }
}

async fn forward<S>(mut stream: S, target: Forward)
where
    S: AsyncRead + Unpin,
{
    let result = match target {
        Forward::Stdout => copy_to(&mut stream, tokio::io::stdout()).await,
        Forward::Stderr => copy_to(&mut stream, tokio::io::stderr()).await,
        Forward::Discard => copy_to(&mut stream, tokio::io::sink()).await,
    };
    if let Err(e) = result {
        tracing::debug!("Stopped forwarding child output: {e}");
    }
}

async fn copy_to<S, W>(stream: &mut S, mut writer: W) -> std::io::Result<u64>
where
    S: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    use tokio::io::AsyncWriteExt;

    let copied = tokio::io::copy(stream, &mut writer).await?;
    writer.flush().await?;
    Ok(copied)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::oneshot;

    fn sh(script: &str, cwd: &std::path::Path) -> RebuildCommand {
        RebuildCommand::new("sh", cwd).arg("-c").arg(script)
    }

    async fn run(command: &RebuildCommand) -> Option<i32> {
        let (tx, rx) = oneshot::channel();
        let mut runner = TokioProcessRunner::new(OutputForwarding {
            stdout: Forward::Discard,
            stderr: Forward::Discard,
        });

        runner
            .launch(
                command,
                Box::new(move |code| {
                    let _ = tx.send(code);
                }),
            )
            .unwrap();

        tokio::time::timeout(Duration::from_secs(10), rx)
            .await
            .expect("process did not finish")
            .expect("callback dropped")
    }

    #[tokio::test]
    async fn test_success_exit_code() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(&sh("exit 0", dir.path())).await, Some(0));
    }

    #[tokio::test]
    async fn test_failure_exit_code() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(&sh("echo broken >&2; exit 2", dir.path())).await, Some(2));
    }

    #[tokio::test]
    async fn test_signal_has_no_exit_code() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run(&sh("kill -9 $$", dir.path())).await, None);
    }

    #[tokio::test]
    async fn test_env_and_cwd_are_applied() {
        let dir = TempDir::new().unwrap();
        let command = sh("printf '%s' \"$NODE_ENV\" > mode.txt", dir.path())
            .env("NODE_ENV", "development");

        assert_eq!(run(&command).await, Some(0));
        let written = std::fs::read_to_string(dir.path().join("mode.txt")).unwrap();
        assert_eq!(written, "development");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let mut runner = TokioProcessRunner::default();
        let command = RebuildCommand::new("restyle-no-such-program-xyz", dir.path());

        let result = runner.launch(&command, Box::new(|_| panic!("must not be called")));
        assert!(matches!(result, Err(RunnerError::Spawn { .. })));
    }

    #[test]
    fn test_forwarding_for_output_modes() {
        assert_eq!(OutputForwarding::for_output(false, false), OutputForwarding::default());
        assert_eq!(
            OutputForwarding::for_output(false, true).stdout,
            Forward::Stderr
        );
        assert_eq!(
            OutputForwarding::for_output(true, false).stdout,
            Forward::Discard
        );
    }
}
