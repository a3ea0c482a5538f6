// CLI InfoExtractor - uses native `yt-dlp` binary
//
// Faster start-up than module mode and no Python dependency on the host.

use std::path::Path;
use std::process::Command as StdCommand;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::traits::{decode_info_json, ExtractorConfig, InfoExtractor};
use crate::extraction::errors::ExtractError;
use crate::extraction::models::RawExtractionResult;
use crate::extraction::utils::{run_output_with_timeout, summarize_stderr};

/// CLI-based info extractor using yt-dlp binary
pub struct CliInfoExtractor {
    ytdlp_path: String,
    available: bool,
}

impl CliInfoExtractor {
    /// Locate the binary and probe it once
    pub fn new(override_path: Option<&str>) -> Self {
        let ytdlp_path = override_path
            .map(|p| p.to_string())
            .unwrap_or_else(Self::find_ytdlp);
        let available = Self::probe(&ytdlp_path);
        Self {
            ytdlp_path,
            available,
        }
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
            "/opt/homebrew/bin/yt-dlp",
        ];

        for path in common_paths {
            if Path::new(path).exists() {
                return path.to_string();
            }
        }

        // Resolved through PATH at spawn time
        "yt-dlp".to_string()
    }

    fn probe(path: &str) -> bool {
        match StdCommand::new(path).arg("--version").output() {
            Ok(out) if out.status.success() => {
                debug!(
                    "[CliExtractor] {} version {}",
                    path,
                    String::from_utf8_lossy(&out.stdout).trim()
                );
                true
            }
            Ok(_) | Err(_) => false,
        }
    }

    pub fn path(&self) -> &str {
        &self.ytdlp_path
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
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
                "yt-dlp binary not found".to_string(),
            ));
        }

        let args = config.engine_args(url);
        info!("[CliExtractor] Running: {} {}", self.ytdlp_path, args.join(" "));

        let output = run_output_with_timeout(&self.ytdlp_path, &args, config.timeout_seconds).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("[CliExtractor] {} failed: {}", self.ytdlp_path, stderr.trim());
            return Err(ExtractError::from(summarize_stderr(&stderr)));
        }

        decode_info_json(output.stdout).await
    }
}
