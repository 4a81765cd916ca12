//! External tool invocation
//!
//! Every toolchain call (`xcrun`, `xcodebuild`, `adb`, `gradlew`) goes through
//! [`run_tool`] so failures carry the command line and the tail of its output.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use devrun_core::prelude::*;

/// Number of output lines kept in a [`Error::ToolFailed`] message
const ERROR_TAIL_LINES: usize = 20;

/// Captured output of a successful tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args...` to completion, optionally in `cwd`.
///
/// A missing binary maps to [`Error::ToolNotFound`], a non-zero exit to
/// [`Error::ToolFailed`].
pub async fn run_tool<P, I, S>(program: P, args: I, cwd: Option<&Path>) -> Result<ToolOutput>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let cmd_line = command_line(program, &args);

    debug!("Running: {}", cmd_line);

    let mut command = Command::new(program);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::tool_not_found(program.to_string_lossy())
        } else {
            Error::tool_failed(cmd_line.clone(), None, e.to_string())
        }
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        // xcodebuild and gradle report most errors on stdout
        let source = if stderr.trim().is_empty() { &stdout } else { &stderr };
        return Err(Error::tool_failed(
            cmd_line,
            output.status.code(),
            tail(source, ERROR_TAIL_LINES),
        ));
    }

    trace!("{} stdout: {}", cmd_line, stdout);
    Ok(ToolOutput { stdout, stderr })
}

fn command_line(program: &OsStr, args: &[OsString]) -> String {
    let mut line = program.to_string_lossy().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Last `n` non-empty lines of `output`
fn tail(output: &str, n: usize) -> String {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_tool_captures_stdout() {
        let output = run_tool("sh", ["-c", "echo hello"], None).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_tool_uses_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();

        let output = run_tool("sh", ["-c", "ls"], Some(dir.path())).await.unwrap();
        assert!(output.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_run_tool_failure_carries_stderr() {
        let err = run_tool("sh", ["-c", "echo broken >&2; exit 2"], None)
            .await
            .unwrap_err();

        match err {
            Error::ToolFailed {
                command,
                code,
                stderr,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_tool_failure_falls_back_to_stdout() {
        let err = run_tool("sh", ["-c", "echo '** BUILD FAILED **'; exit 65"], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("BUILD FAILED"));
    }

    #[tokio::test]
    async fn test_run_tool_missing_binary() {
        let err = run_tool("devrun-missing-tool", ["--help"], None).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "devrun-missing-tool"));
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        let output = "a\n\nb\nc\nd\n";
        assert_eq!(tail(output, 2), "c\nd");
        assert_eq!(tail(output, 10), "a\nb\nc\nd");
    }
}
