// Helper functions for extractor implementations

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::errors::ExtractError;

lazy_static::lazy_static! {
    static ref ERROR_LINE_RE: Regex = Regex::new(r"(?m)^ERROR:\s*(.+?)\s*$").unwrap();
}

/// Run command with timeout, draining stdout and stderr concurrently
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, ExtractError> {
    let started = Instant::now();
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::ToolNotFound(program.to_string())
            } else {
                ExtractError::ExecutionError(format!("Failed to start {}: {}", program, e))
            }
        })?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        ExtractError::ExecutionError(format!("Failed to capture stdout from {}", program))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        ExtractError::ExecutionError(format!("Failed to capture stderr from {}", program))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status_res) => {
            let status = status_res.map_err(|e| {
                ExtractError::ExecutionError(format!("Failed to wait for {}: {}", program, e))
            })?;
            let stdout = join_pipe(stdout_task, "stdout").await?;
            let stderr = join_pipe(stderr_task, "stderr").await?;
            debug!(
                "[run] {} exited with {} after {:?} ({} bytes stdout)",
                program,
                status,
                started.elapsed(),
                stdout.len()
            );
            Ok(Output { status, stdout, stderr })
        }
        Err(_) => {
            warn!("[run] {} timed out after {}s, killing", program, timeout_secs);
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ExtractError::Timeout(timeout_secs))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
    name: &str,
) -> Result<Vec<u8>, ExtractError> {
    task.await
        .map_err(|e| ExtractError::ExecutionError(format!("{} task failed: {}", name, e)))?
        .map_err(|e| ExtractError::ExecutionError(format!("Failed to read {}: {}", name, e)))
}

/// Pick the meaningful message out of engine stderr.
///
/// Returns the `ERROR:` lines when present, otherwise the last non-empty line.
pub fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = ERROR_LINE_RE
        .captures_iter(stderr)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    if !errors.is_empty() {
        return errors.join("; ");
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("extraction engine exited with an error")
        .to_string()
}

/// Expand a leading `~/` against the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn is_youtube_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_prefers_error_lines() {
        let stderr = "WARNING: [youtube] falling back\n\
                      ERROR: [youtube] abc123: Private video\n";
        assert_eq!(summarize_stderr(stderr), "[youtube] abc123: Private video");
    }

    #[test]
    fn test_summarize_joins_multiple_errors() {
        let stderr = "ERROR: first\nnoise\nERROR: second\n";
        assert_eq!(summarize_stderr(stderr), "first; second");
    }

    #[test]
    fn test_summarize_falls_back_to_last_line() {
        assert_eq!(summarize_stderr("Traceback\n  boom  \n\n"), "boom");
        assert_eq!(summarize_stderr(""), "extraction engine exited with an error");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/etc/cookies.txt"), PathBuf::from("/etc/cookies.txt"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/cookies.txt"), home.join("cookies.txt"));
        }
    }

    #[test]
    fn test_youtube_detection() {
        assert!(is_youtube_url("https://www.YouTube.com/watch?v=x"));
        assert!(is_youtube_url("https://youtu.be/x"));
        assert!(!is_youtube_url("https://vimeo.com/1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output() {
        let out = run_output_with_timeout("sh", &["-c".to_string(), "echo hi; echo err >&2".to_string()], 5)
            .await
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hi");
        assert_eq!(String::from_utf8_lossy(&out.stderr).trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let err = run_output_with_timeout("sh", &["-c".to_string(), "sleep 5".to_string()], 1)
            .await
            .unwrap_err();
        assert_eq!(err, ExtractError::Timeout(1));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let err = run_output_with_timeout("definitely-not-a-real-binary-xyz", &[], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::ToolNotFound(_)));
    }
}
