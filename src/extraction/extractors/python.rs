// Python InfoExtractor - uses `python3 -m yt_dlp`
//
// Matches the library the service was first built against and picks up
// pip-installed yt-dlp updates without a separate binary.

use std::process::Command as StdCommand;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::traits::{decode_info_json, ExtractorConfig, InfoExtractor};
use crate::extraction::errors::ExtractError;
use crate::extraction::models::RawExtractionResult;
use crate::extraction::utils::{run_output_with_timeout, summarize_stderr};

/// Python-based info extractor using yt_dlp module
pub struct PythonInfoExtractor {
    python_cmd: String,
    available: bool,
}

impl PythonInfoExtractor {
    /// Locate the interpreter and check for the module once
    pub fn new(override_cmd: Option<&str>) -> Self {
        let python_cmd = override_cmd
            .map(|c| c.to_string())
            .unwrap_or_else(Self::find_python);
        let available = Self::has_ytdlp_module(&python_cmd);
        Self {
            python_cmd,
            available,
        }
    }

    /// Find Python interpreter
    fn find_python() -> String {
        let candidates = ["python3", "/usr/local/bin/python3", "/usr/bin/python3", "python"];

        for cmd in candidates {
            if let Ok(output) = StdCommand::new(cmd).arg("--version").output() {
                if output.status.success() {
                    return cmd.to_string();
                }
            }
        }

        "python3".to_string()
    }

    /// Check if yt_dlp module is installed
    fn has_ytdlp_module(python_cmd: &str) -> bool {
        let code = "import yt_dlp; print(yt_dlp.version.__version__)";
        match StdCommand::new(python_cmd).args(["-c", code]).output() {
            Ok(out) if out.status.success() => {
                debug!(
                    "[PythonExtractor] yt_dlp {} via {}",
                    String::from_utf8_lossy(&out.stdout).trim(),
                    python_cmd
                );
                true
            }
            Ok(_) | Err(_) => false,
        }
    }

    fn build_args(url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "yt_dlp".to_string()];
        args.extend(config.engine_args(url));
        args
    }

    pub fn command(&self) -> &str {
        &self.python_cmd
    }
}

#[async_trait]
impl InfoExtractor for PythonInfoExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<Option<RawExtractionResult>, ExtractError> {
        if !self.available {
            return Err(ExtractError::ToolNotFound(
                "Python yt_dlp module not installed".to_string(),
            ));
        }

        let args = Self::build_args(url, config);
        info!("[PythonExtractor] Running: {} {}", self.python_cmd, args.join(" "));

        let output = run_output_with_timeout(&self.python_cmd, &args, config.timeout_seconds).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("[PythonExtractor] yt_dlp failed: {}", stderr.trim());
            return Err(ExtractError::from(summarize_stderr(&stderr)));
        }

        decode_info_json(output.stdout).await
    }
}
