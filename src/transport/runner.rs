//! Process execution for transport backends

use crate::error::Result;
use crate::transport::request::Invocation;
use crate::transport::response::RawResponse;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::debug;

/// Runs rendered invocations on the host and reports which programs exist
///
/// The production implementation is [`SystemRunner`]; tests substitute a
/// scripted runner so no real curl or PowerShell is needed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns true if `program` can be launched on this host
    fn exists(&self, program: &str) -> bool;

    /// Runs the invocation to completion and captures its output
    async fn run(&self, invocation: &Invocation) -> Result<RawResponse>;
}

/// Runs programs directly on the local host, without an intermediate shell
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// File names `program` may have on disk
fn executable_names(program: &str) -> Vec<String> {
    let mut names = vec![program.to_string()];
    if cfg!(windows) {
        let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.CMD;.BAT;.COM".to_string());
        names.extend(
            exts.split(';')
                .filter(|ext| !ext.is_empty())
                .map(|ext| format!("{program}{}", ext.to_ascii_lowercase())),
        );
    }
    names
}

async fn feed_stdin(stdin: &mut ChildStdin, input: &str) -> std::io::Result<()> {
    stdin.write_all(input.as_bytes()).await?;
    stdin.shutdown().await
}

#[async_trait]
impl CommandRunner for SystemRunner {
    fn exists(&self, program: &str) -> bool {
        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        let names = executable_names(program);
        std::env::split_paths(&paths).any(|dir| names.iter().any(|name| dir.join(name).is_file()))
    }

    async fn run(&self, invocation: &Invocation) -> Result<RawResponse> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;

        if let Some(input) = &invocation.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                // A child that exits without draining stdin still has output to report
                match feed_stdin(&mut stdin, input).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                        debug!("{} closed stdin before reading it all", invocation.program);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let output = child.wait_with_output().await?;
        let exit_status = output.status.code().unwrap_or(-1);
        debug!("{} exited with status {exit_status}", invocation.program);

        Ok(RawResponse {
            exit_status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_does_not_exist() {
        assert!(!SystemRunner::new().exists("definitely-not-a-real-archer-tool"));
    }

    #[test]
    fn test_executable_names_include_bare_name() {
        assert_eq!(executable_names("curl")[0], "curl");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_kept_when_child_ignores_stdin() {
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("echo 'curl: (3) URL using bad/illegal format or missing URL' >&2; exit 3")
            .with_stdin("x".repeat(1 << 20));

        let raw = SystemRunner::new().run(&inv).await.expect("child ran");

        assert_eq!(raw.exit_status, 3);
        assert!(raw.stderr.contains("curl: (3) URL using bad/illegal format"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_io_error() {
        let inv = Invocation::new("definitely-not-a-real-archer-tool");
        let result = SystemRunner::new().run(&inv).await;
        assert!(matches!(result, Err(crate::error::ArcherError::IoError(_))));
    }
}
